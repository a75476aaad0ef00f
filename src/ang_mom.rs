//! Angular momentum coupling.
//!
//! Angular momenta are passed doubled (`tj = 2 j`) so that half-integers
//! are represented exactly.
use fnv::FnvHashMap;
use wigner_symbols::{ClebschGordan, Wigner3jm};
use super::error::{Error, Result};

/// Returns `(-1)^φ`
#[inline]
pub fn phase(phi: i32) -> f64 {
    if phi % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

fn tri_ok(ta: i32, tb: i32, tc: i32) -> bool {
    (ta - tb).abs() <= tc && tc <= ta + tb && (ta + tb + tc) % 2 == 0
}

fn proj_ok(tj: i32, tm: i32) -> bool {
    tj >= 0 && tm.abs() <= tj && (tj + tm) % 2 == 0
}

/// Whether a 3-jm symbol is allowed by the selection rules.
pub fn w3jm_allowed(w: &Wigner3jm) -> bool {
    w.tm1 + w.tm2 + w.tm3 == 0
        && proj_ok(w.tj1, w.tm1)
        && proj_ok(w.tj2, w.tm2)
        && proj_ok(w.tj3, w.tm3)
        && tri_ok(w.tj1, w.tj2, w.tj3)
}

/// Whether a Clebsch–Gordan coefficient is allowed by the selection rules.
pub fn cg_allowed(c: &ClebschGordan) -> bool {
    w3jm_allowed(&Wigner3jm {
        tj1: c.tj1,
        tm1: c.tm1,
        tj2: c.tj2,
        tm2: c.tm2,
        tj3: c.tj12,
        tm3: -c.tm12,
    })
}

fn w3jm_value(w: Wigner3jm) -> f64 {
    if w3jm_allowed(&w) {
        f64::from(w.value())
    } else {
        0.0
    }
}

fn cg_value(c: ClebschGordan) -> f64 {
    if cg_allowed(&c) {
        f64::from(c.value())
    } else {
        0.0
    }
}

type CgKey = (i32, i32, i32, i32, i32, i32);

/// Memoizing context for Clebsch–Gordan coefficients.
#[derive(Clone, Debug, Default)]
pub struct Wigner3jmCtx(FnvHashMap<CgKey, f64>);

impl Wigner3jmCtx {
    pub fn cg(&mut self, c: ClebschGordan) -> f64 {
        let key = (c.tj1, c.tm1, c.tj2, c.tm2, c.tj12, c.tm12);
        *self.0.entry(key).or_insert_with(|| cg_value(c))
    }
}

/// Converts an angular momentum given as `f64` into its doubled integer
/// form, requiring it to be a multiple of 1/2.
fn twice(name: &str, j: f64) -> Result<i32> {
    let t = 2.0 * j;
    if !t.is_finite() || t.fract() != 0.0 || t.abs() > 1e6 {
        return Err(Error::Type {
            name: name.to_owned(),
            value: j.to_string(),
        });
    }
    Ok(t as i32)
}

/// Wigner 3j symbol `(j1 j2 j3; m1 m2 m3)` for integer or half-integer
/// arguments.  Arguments violating the selection rules give zero.
pub fn wigner_3j(j1: f64, j2: f64, j3: f64, m1: f64, m2: f64, m3: f64)
                 -> Result<f64> {
    Ok(w3jm_value(Wigner3jm {
        tj1: twice("j1", j1)?,
        tm1: twice("m1", m1)?,
        tj2: twice("j2", j2)?,
        tm2: twice("m2", m2)?,
        tj3: twice("j3", j3)?,
        tm3: twice("m3", m3)?,
    }))
}

/// SO(3) Clebsch–Gordan coefficient `⟨l1 m1 l2 m2|l m⟩`.  Only integer
/// angular momenta occur in the collective model; anything else is a
/// validation error.
pub fn cg_so3(l1: f64, m1: f64, l2: f64, m2: f64, l: f64, m: f64)
              -> Result<f64> {
    let check = |name: &str, x: f64| -> Result<i32> {
        let t = twice(name, x)?;
        if t % 2 != 0 {
            return Err(Error::Type {
                name: name.to_owned(),
                value: x.to_string(),
            });
        }
        Ok(t)
    };
    Ok(cg_value(ClebschGordan {
        tj1: check("l1", l1)?,
        tm1: check("m1", m1)?,
        tj2: check("l2", l2)?,
        tm2: check("m2", m2)?,
        tj12: check("l", l)?,
        tm12: check("m", m)?,
    }))
}
