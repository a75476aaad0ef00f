//! Plain-text tables of spectral results.
use std::io::{self, Write};
use super::conf::{Conf, OutputFormat, Selector, TransOp};
use super::scale::{Entry, SpectralResult};

/// Formats `x` right-aligned in `fmt.width` columns.  Nonzero magnitudes
/// at or above `10^exp_digits`, or below `10^−exp_digits`, switch to
/// scientific notation.
pub fn format_number(x: f64, fmt: &OutputFormat) -> String {
    let mag = x.abs();
    let sci = x != 0.0 && x.is_finite()
        && (mag >= 10f64.powi(fmt.exp_digits)
            || mag < 10f64.powi(-fmt.exp_digits));
    let s = if sci {
        format!("{:.*e}", fmt.precision, x)
    } else {
        format!("{:.*}", fmt.precision, x)
    };
    format!("{:>width$}", s, width = fmt.width)
}

/// Value as printed under datum `d`, i.e. in units of `10^d`.
pub fn apply_datum(x: f64, datum: i32) -> f64 {
    if datum == 0 { x } else { x / 10f64.powi(datum) }
}

fn datum_note(datum: i32) -> String {
    if datum == 0 {
        String::new()
    } else {
        format!(" (in units of 10^{})", datum)
    }
}

fn rate_label(s: &Selector) -> String {
    match s.op {
        TransOp::E2 => format!("B(E2; {}_{} -> {}_{})",
                               s.l_i, s.n_i, s.l_f, s.n_f),
        TransOp::E0 => format!("rho2(E0; {}_{} -> {}_{})",
                               s.l_i, s.n_i, s.l_f, s.n_f),
    }
}

fn amplitude_label(s: &Selector) -> String {
    match s.op {
        TransOp::E2 => format!("<{}_{}||E2||{}_{}>",
                               s.l_f, s.n_f, s.l_i, s.n_i),
        TransOp::E0 => format!("<{}_{}|E0|{}_{}>",
                               s.l_f, s.n_f, s.l_i, s.n_i),
    }
}

pub fn write_eigenvalues<W: Write>(w: &mut W, conf: &Conf,
                                   r: &SpectralResult) -> io::Result<()> {
    writeln!(w, "eigenvalues{}:", datum_note(conf.datum))?;
    for (l, vals) in r.ls.iter().zip(&r.eigenvalues) {
        write!(w, "  L = {:>2}:", l)?;
        for &x in vals.iter().take(conf.eig_ln) {
            write!(w, " {}", format_number(apply_datum(x, conf.datum),
                                           &conf.output))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_entries<W, F>(w: &mut W, conf: &Conf, title: &str,
                       entries: &[Entry], label: F)
                       -> io::Result<()>
    where W: Write, F: Fn(&Selector) -> String
{
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(w, "{}{}:", title, datum_note(conf.datum))?;
    for e in entries.iter().take(conf.rat_ln) {
        writeln!(w, "  {:<24} {}", label(&e.selector),
                 format_number(apply_datum(e.value, conf.datum),
                               &conf.output))?;
    }
    Ok(())
}

pub fn write_rates<W: Write>(w: &mut W, conf: &Conf, r: &SpectralResult)
                             -> io::Result<()> {
    write_entries(w, conf, "rates", &r.rates, rate_label)
}

pub fn write_amplitudes<W: Write>(w: &mut W, conf: &Conf,
                                  r: &SpectralResult) -> io::Result<()> {
    write_entries(w, conf, "amplitudes", &r.amplitudes, amplitude_label)
}

pub fn write_warnings<W: Write>(w: &mut W, r: &SpectralResult)
                                -> io::Result<()> {
    for msg in &r.warnings {
        writeln!(w, "# warning: {}", msg)?;
    }
    Ok(())
}

/// Everything above, followed by the recorded shift and scales.
pub fn write_result<W: Write>(w: &mut W, conf: &Conf, r: &SpectralResult)
                              -> io::Result<()> {
    write_eigenvalues(w, conf, r)?;
    write_rates(w, conf, r)?;
    write_amplitudes(w, conf, r)?;
    writeln!(w, "shift: {}", r.shift)?;
    if r.eig_scale != 1.0 {
        writeln!(w, "eig_scale: {}", r.eig_scale)?;
    }
    if r.rat_scale != 1.0 {
        writeln!(w, "rat_scale: {}", r.rat_scale)?;
    }
    write_warnings(w, r)
}
