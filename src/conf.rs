//! Configuration registers of the spectral analysis.
//!
//! All options live in a [`Conf`](struct.Conf.html) record, which the
//! `*_with` entry points take explicitly.  The process-wide registers
//! below are a thin layer over one such record: setters take effect for
//! the next analysis call and every call works on a snapshot.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use super::error::{Error, Result};
use super::guards::{require_int, require_nonnegint, require_posint,
                    Quantity};
use super::spherical::BasisType;

/// Transition operator of a selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TransOp {
    /// Electric quadrupole, `β SpHarm_112` (code 0).
    E2,
    /// Electric monopole, `β²` (code 1).
    E0,
}

impl Default for TransOp {
    fn default() -> Self {
        TransOp::E2
    }
}

impl TransOp {
    pub fn code(self) -> i64 {
        match self {
            TransOp::E2 => 0,
            TransOp::E0 => 1,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(TransOp::E2),
            1 => Ok(TransOp::E0),
            _ => Err(Error::value("op", code, "must be 0 (E2) or 1 (E0)")),
        }
    }
}

impl ::std::convert::TryFrom<i64> for TransOp {
    type Error = Error;
    fn try_from(code: i64) -> Result<Self> {
        TransOp::from_code(code)
    }
}

impl From<TransOp> for i64 {
    fn from(op: TransOp) -> i64 {
        op.code()
    }
}

/// Transition `(L_i, n_i) → (L_f, n_f)` under `op`; `n` counts states of
/// a given `L` from 1 upwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub l_f: i32,
    pub l_i: i32,
    pub n_f: i32,
    pub n_i: i32,
    #[serde(default)]
    pub op: TransOp,
}

impl Selector {
    pub fn new<T: Quantity>(l_f: T, l_i: T, n_f: T, n_i: T, op: T)
                            -> Result<Self> {
        let s = Self {
            l_f: require_nonnegint("L_f", l_f)?,
            l_i: require_nonnegint("L_i", l_i)?,
            n_f: require_posint("n_f", n_f)?,
            n_i: require_posint("n_i", n_i)?,
            op: TransOp::from_code(require_int("op", op)?)?,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<()> {
        require_nonnegint("L_f", self.l_f)?;
        require_nonnegint("L_i", self.l_i)?;
        require_posint("n_f", self.n_f)?;
        require_posint("n_i", self.n_i)?;
        if self.op == TransOp::E0 && self.l_f != self.l_i {
            return Err(Error::value(
                "L_f", format!("{} (L_i = {})", self.l_f, self.l_i),
                "monopole transitions need L_f = L_i"));
        }
        Ok(())
    }
}

/// Reference state whose energy fixes the energy scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EigFit {
    pub energy: f64,
    pub l: i32,
    pub n: i32,
}

/// Reference E2 transition whose rate fixes the transition scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatFit {
    pub rate: f64,
    pub l_f: i32,
    pub l_i: i32,
    pub n_f: i32,
    pub n_i: i32,
}

impl RatFit {
    pub fn selector(&self) -> Selector {
        Selector {
            l_f: self.l_f,
            l_i: self.l_i,
            n_f: self.n_f,
            n_i: self.n_i,
            op: TransOp::E2,
        }
    }
}

/// Layout of printed numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputFormat {
    pub precision: usize,
    pub width: usize,
    pub exp_digits: i32,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self { precision: 4, width: 10, exp_digits: 4 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Conf {
    pub basis_type: BasisType,
    /// Number of eigenvalues printed per `L`.
    pub eig_ln: usize,
    /// Number of rate and amplitude rows printed.
    pub rat_ln: usize,
    pub eig_fit: Option<EigFit>,
    pub rat_fit: Option<RatFit>,
    pub rat_lst: Vec<Selector>,
    pub amp_lst: Vec<Selector>,
    pub output: OutputFormat,
    pub datum: i32,
    pub cg_path: PathBuf,
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            basis_type: BasisType::Fixed,
            eig_ln: 6,
            rat_ln: 6,
            eig_fit: None,
            rat_fit: None,
            rat_lst: vec![Selector {
                l_f: 2,
                l_i: 0,
                n_f: 1,
                n_i: 1,
                op: TransOp::E2,
            }],
            amp_lst: Vec::new(),
            output: Default::default(),
            datum: 0,
            cg_path: "so5cg-data".into(),
        }
    }
}

impl Conf {
    pub fn validate(&self) -> Result<()> {
        for s in self.rat_lst.iter().chain(&self.amp_lst) {
            s.validate()?;
        }
        if let Some(f) = self.eig_fit {
            require_nonnegint("eig_fit.L", f.l)?;
            require_posint("eig_fit.n", f.n)?;
        }
        if let Some(f) = self.rat_fit {
            f.selector().validate()?;
        }
        if self.output.width == 0 {
            return Err(Error::value("output.width", 0, "must be positive"));
        }
        require_posint("output.exp_digits", self.output.exp_digits)?;
        check_datum(self.datum)?;
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let conf: Self = serde_yaml::from_str(s)
            .map_err(|e| Error::Config(e.to_string()))?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Config(msg) => {
                Error::Config(format!("{}: {}", path.display(), msg))
            }
            e => e,
        })
    }

    pub fn listln(&self) -> (usize, usize) {
        (self.eig_ln, self.rat_ln)
    }
}

lazy_static! {
    static ref CONF: RwLock<Conf> = RwLock::new(Conf::default());
}

fn read() -> RwLockReadGuard<'static, Conf> {
    CONF.read().unwrap_or_else(|e| e.into_inner())
}

fn write() -> RwLockWriteGuard<'static, Conf> {
    CONF.write().unwrap_or_else(|e| e.into_inner())
}

/// Snapshot of the process-wide registers.
pub fn current() -> Conf {
    read().clone()
}

/// Replaces all registers after validating `conf`.
pub fn replace(conf: Conf) -> Result<()> {
    conf.validate()?;
    *write() = conf;
    Ok(())
}

/// Restores the defaults.
pub fn reset() {
    *write() = Conf::default();
}

pub fn basis_type() -> BasisType {
    read().basis_type
}

pub fn set_basis_type<T: Quantity>(code: T) -> Result<()> {
    let b = BasisType::from_code(require_int("basis_type", code)?)?;
    write().basis_type = b;
    Ok(())
}

pub fn listln() -> (usize, usize) {
    read().listln()
}

pub fn set_listln<T: Quantity>(eig_ln: T, rat_ln: T) -> Result<()> {
    let e = require_nonnegint("eig_ln", eig_ln)? as usize;
    let r = require_nonnegint("rat_ln", rat_ln)? as usize;
    let mut conf = write();
    conf.eig_ln = e;
    conf.rat_ln = r;
    Ok(())
}

pub fn eig_fit() -> Option<EigFit> {
    read().eig_fit
}

pub fn set_eig_fit<T: Quantity>(energy: f64, l: T, n: T) -> Result<()> {
    let fit = EigFit {
        energy,
        l: require_nonnegint("L", l)?,
        n: require_posint("n", n)?,
    };
    write().eig_fit = Some(fit);
    Ok(())
}

pub fn clear_eig_fit() {
    write().eig_fit = None;
}

pub fn rat_fit() -> Option<RatFit> {
    read().rat_fit
}

pub fn set_rat_fit<T: Quantity>(rate: f64, l_f: T, l_i: T, n_f: T, n_i: T)
                                -> Result<()> {
    let fit = RatFit {
        rate,
        l_f: require_nonnegint("L_f", l_f)?,
        l_i: require_nonnegint("L_i", l_i)?,
        n_f: require_posint("n_f", n_f)?,
        n_i: require_posint("n_i", n_i)?,
    };
    write().rat_fit = Some(fit);
    Ok(())
}

pub fn clear_rat_fit() {
    write().rat_fit = None;
}

pub fn rat_lst() -> Vec<Selector> {
    read().rat_lst.clone()
}

pub fn set_rat_lst(lst: Vec<Selector>) -> Result<()> {
    for s in &lst {
        s.validate()?;
    }
    write().rat_lst = lst;
    Ok(())
}

pub fn add_rat_lst(s: Selector) -> Result<()> {
    s.validate()?;
    write().rat_lst.push(s);
    Ok(())
}

pub fn amp_lst() -> Vec<Selector> {
    read().amp_lst.clone()
}

pub fn set_amp_lst(lst: Vec<Selector>) -> Result<()> {
    for s in &lst {
        s.validate()?;
    }
    write().amp_lst = lst;
    Ok(())
}

pub fn add_amp_lst(s: Selector) -> Result<()> {
    s.validate()?;
    write().amp_lst.push(s);
    Ok(())
}

pub fn output() -> OutputFormat {
    read().output
}

pub fn set_output<T: Quantity>(precision: T, width: T, exp_digits: T)
                               -> Result<()> {
    let output = OutputFormat {
        precision: require_nonnegint("precision", precision)? as usize,
        width: require_posint("width", width)? as usize,
        exp_digits: require_posint("exp_digits", exp_digits)?,
    };
    write().output = output;
    Ok(())
}

pub fn datum() -> i32 {
    read().datum
}

fn check_datum<T: Into<i64>>(d: T) -> Result<i32> {
    let d = d.into();
    if d.abs() > 300 {
        return Err(Error::value("datum", d, "out of range"));
    }
    Ok(d as i32)
}

pub fn set_datum<T: Quantity>(datum: T) -> Result<()> {
    let d = check_datum(require_int("datum", datum)?)?;
    write().datum = d;
    Ok(())
}

pub fn cg_path() -> PathBuf {
    read().cg_path.clone()
}

pub fn set_cg_path<P: Into<PathBuf>>(path: P) {
    write().cg_path = path.into();
}
