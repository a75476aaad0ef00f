//! Spectra, transition rates and transition amplitudes.
use std::io::{self, Write};
use fnv::FnvHashMap;
use nalgebra::{DMatrix, DVector};
use super::conf::{self, Conf, EigFit, RatFit, Selector, TransOp};
use super::error::{Error, Result};
use super::linalg::sym_eigen;
use super::op_sum::{monopole, quadrupole, OperatorSum};
use super::show;
use super::so5cg;
use super::xspace::{Truncation, XSpace};

/// Selectors and fit references, validated once before any matrix work.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    pub rates: Vec<Selector>,
    pub amplitudes: Vec<Selector>,
    pub eig_fit: Option<EigFit>,
    pub rat_fit: Option<RatFit>,
}

impl Schedule {
    pub fn from_conf(conf: &Conf) -> Result<Self> {
        conf.validate()?;
        Ok(Self {
            rates: conf.rat_lst.clone(),
            amplitudes: conf.amp_lst.clone(),
            eig_fit: conf.eig_fit,
            rat_fit: conf.rat_fit,
        })
    }
}

/// A rate or amplitude together with its selector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Entry {
    pub selector: Selector,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SpectralResult {
    /// Angular momenta with a non-empty block, ascending.
    pub ls: Vec<i32>,
    /// Shifted (and possibly fitted) eigenvalues, parallel to `ls`.
    pub eigenvalues: Vec<Vec<f64>>,
    pub rates: Vec<Entry>,
    pub amplitudes: Vec<Entry>,
    /// `−E_min`, added to every raw eigenvalue before `eig_scale` is
    /// applied: `raw = eigenvalue / eig_scale − shift`.
    pub shift: f64,
    pub eig_scale: f64,
    pub rat_scale: f64,
    pub warnings: Vec<String>,
    /// Eigenvectors (as columns) parallel to `ls`.
    #[serde(skip)]
    pub eigenvectors: Vec<DMatrix<f64>>,
}

impl SpectralResult {
    fn block(&self, l: i32) -> Option<usize> {
        self.ls.iter().position(|&x| x == l)
    }

    /// Eigenvalue of the `n`-th state (1-based) of angular momentum `L`.
    pub fn energy(&self, l: i32, n: i32) -> Option<f64> {
        let k = self.block(l)?;
        if n < 1 {
            return None;
        }
        self.eigenvalues[k].get((n - 1) as usize).cloned()
    }

    fn state(&self, l: i32, n: i32) -> Option<DVector<f64>> {
        let k = self.block(l)?;
        let vecs = &self.eigenvectors[k];
        if n < 1 || n as usize > vecs.ncols() {
            return None;
        }
        Some(vecs.column((n - 1) as usize).into_owned())
    }

    pub fn rate(&self, selector: &Selector) -> Option<f64> {
        self.rates.iter().find(|e| e.selector == *selector).map(|e| e.value)
    }

    pub fn amplitude(&self, selector: &Selector) -> Option<f64> {
        self.amplitudes.iter().find(|e| e.selector == *selector)
            .map(|e| e.value)
    }

    fn warn(&mut self, msg: String) {
        warn!("{}", msg);
        self.warnings.push(msg);
    }
}

/// Transition matrices between `L` blocks, built on demand.
struct Transitions<'a> {
    space: XSpace<'a>,
    quadrupole: OperatorSum,
    monopole: OperatorSum,
    cache: FnvHashMap<(TransOp, i32, i32), DMatrix<f64>>,
}

impl<'a> Transitions<'a> {
    fn new(space: XSpace<'a>) -> Self {
        Self {
            space,
            quadrupole: quadrupole(),
            monopole: monopole(),
            cache: Default::default(),
        }
    }

    /// Signed element `⟨ψ_f‖Q‖ψ_i⟩` (E2, Rose convention) or
    /// `⟨ψ_f|β²|ψ_i⟩` (E0), or `None` if a state lies outside the
    /// computed blocks.
    fn amplitude(&mut self, r: &SpectralResult, s: &Selector)
                 -> Result<Option<f64>> {
        let (f, i) = match (r.state(s.l_f, s.n_f), r.state(s.l_i, s.n_i)) {
            (Some(f), Some(i)) => (f, i),
            _ => return Ok(None),
        };
        let key = (s.op, s.l_f, s.l_i);
        if !self.cache.contains_key(&key) {
            let m = match s.op {
                TransOp::E2 => {
                    self.space.rep_between(&self.quadrupole, s.l_f, s.l_i)?
                }
                TransOp::E0 => self.space.rep(&self.monopole, s.l_f)?,
            };
            self.cache.insert(key, m);
        }
        Ok(Some(f.dot(&(&self.cache[&key] * i))))
    }

    fn rate(&mut self, r: &SpectralResult, s: &Selector)
            -> Result<Option<f64>> {
        Ok(self.amplitude(r, s)?.map(|x| match s.op {
            TransOp::E2 => {
                (2 * s.l_f + 1) as f64 / (2 * s.l_i + 1) as f64 * x * x
            }
            TransOp::E0 => x * x,
        }))
    }
}

fn describe(s: &Selector) -> String {
    format!("{:?}({}_{} -> {}_{})", s.op, s.l_i, s.n_i, s.l_f, s.n_f)
}

fn run(
    conf: &Conf,
    h: &OperatorSum,
    a: f64,
    lambda: f64,
    trunc: &Truncation,
    fit: bool,
) -> Result<SpectralResult> {
    let schedule = Schedule::from_conf(conf)?;
    trunc.validate()?;
    let store = so5cg::shared(&conf.cg_path);
    let space = XSpace::from_truncation(&store, conf.basis_type, a, lambda,
                                        trunc)?;
    let mut r = SpectralResult {
        ls: Vec::new(),
        eigenvalues: Vec::new(),
        rates: Vec::new(),
        amplitudes: Vec::new(),
        shift: 0.0,
        eig_scale: 1.0,
        rat_scale: 1.0,
        warnings: Vec::new(),
        eigenvectors: Vec::new(),
    };

    for l in trunc.ls() {
        let dim = space.dim(l);
        if dim == 0 {
            debug!("L = {}: empty block", l);
            continue;
        }
        debug!("L = {}: diagonalizing {}×{} block", l, dim, dim);
        let eig = sym_eigen(&space.rep(h, l)?)?;
        r.ls.push(l);
        r.eigenvalues.push(eig.values);
        r.eigenvectors.push(eig.vectors);
    }

    let e_min = r.eigenvalues.iter()
        .filter_map(|vals| vals.first().cloned())
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |y| y.min(x))));
    match e_min {
        Some(e_min) => {
            r.shift = -e_min;
            for vals in &mut r.eigenvalues {
                for x in vals.iter_mut() {
                    *x -= e_min;
                }
            }
        }
        None => r.warn("truncated space is empty".to_owned()),
    }

    let mut trans = Transitions::new(space);
    for s in &schedule.rates {
        match trans.rate(&r, s)? {
            Some(value) => r.rates.push(Entry { selector: *s, value }),
            None => r.warn(format!("rate {} outside computed states",
                                   describe(s))),
        }
    }
    for s in &schedule.amplitudes {
        match trans.amplitude(&r, s)? {
            Some(value) => r.amplitudes.push(Entry { selector: *s, value }),
            None => r.warn(format!("amplitude {} outside computed states",
                                   describe(s))),
        }
    }

    if !fit {
        return Ok(r);
    }
    if let Some(f) = schedule.eig_fit {
        match r.energy(f.l, f.n) {
            Some(e) if e != 0.0 => r.eig_scale = f.energy / e,
            _ => r.warn(format!("eig_fit reference {}_{} is absent or zero; \
                                 energies left unscaled", f.l, f.n)),
        }
        let scale = r.eig_scale;
        for vals in &mut r.eigenvalues {
            for x in vals.iter_mut() {
                *x *= scale;
            }
        }
    }
    if let Some(f) = schedule.rat_fit {
        let s = f.selector();
        match trans.rate(&r, &s)? {
            Some(b) if b != 0.0 && f.rate / b > 0.0 => {
                r.rat_scale = f.rate / b;
            }
            _ => r.warn(format!("rat_fit reference {} is absent or zero; \
                                 rates left unscaled", describe(&s))),
        }
        let scale = r.rat_scale;
        let amp_scale = scale.sqrt();
        for e in &mut r.rates {
            e.value *= scale;
        }
        for e in &mut r.amplitudes {
            e.value *= amp_scale;
        }
    }
    Ok(r)
}

/// Diagonalizes `h` per `L`, shifts the spectrum to a zero ground state
/// and evaluates the configured rates and amplitudes.
pub fn scale_with(
    conf: &Conf,
    h: &OperatorSum,
    a: f64,
    lambda: f64,
    trunc: &Truncation,
) -> Result<SpectralResult> {
    run(conf, h, a, lambda, trunc, false)
}

/// Like [`scale_with`](fn.scale_with.html), then applies the configured
/// fits and writes the tables to `sink`.
pub fn adapt_with<W: Write>(
    conf: &Conf,
    h: &OperatorSum,
    a: f64,
    lambda: f64,
    trunc: &Truncation,
    sink: &mut W,
) -> Result<SpectralResult> {
    let r = run(conf, h, a, lambda, trunc, true)?;
    show::write_result(sink, conf, &r).map_err(|err| Error::Io {
        path: "<output>".into(),
        err,
    })?;
    Ok(r)
}

/// `scale_with` on a snapshot of the process-wide registers.
pub fn acm_scale(h: &OperatorSum, a: f64, lambda: f64, trunc: &Truncation)
                 -> Result<SpectralResult> {
    scale_with(&conf::current(), h, a, lambda, trunc)
}

/// `adapt_with` on a snapshot of the process-wide registers, printing to
/// standard output.
pub fn acm_adapt(h: &OperatorSum, a: f64, lambda: f64, trunc: &Truncation)
                 -> Result<SpectralResult> {
    let stdout = io::stdout();
    let mut sink = stdout.lock();
    adapt_with(&conf::current(), h, a, lambda, trunc, &mut sink)
}
