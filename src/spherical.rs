//! Spherical (γ, Ω) part of the collective model: SO(5)⊃SO(3) labels,
//! spherical harmonic operators and their matrices.
//!
//! States `|v α L M⟩` are labeled by seniority `v`, multiplicity index `α`
//! and angular momentum `L`.  Harmonic operators `SpHarm_{v α L}` are the
//! `M = 0` components of the SO(5) spherical harmonics, so products of
//! them are evaluated in the M scheme, whereas transitions use the
//! SO(3)-reduced (Rose convention) matrix elements.
use std::cmp::{max, min};
use std::sync::Mutex;
use fnv::FnvHashMap;
use nalgebra::DMatrix;
use num::{BigInt, BigRational};
use num::rational::Ratio;
use wigner_symbols::ClebschGordan;
use super::ang_mom::Wigner3jmCtx;
use super::error::{Error, Result};
use super::guards::{require_nonnegint, require_posint};
use super::so5cg::{So5CgKey, So5CgStore};
use super::special::{signed_sqrt, zonal_triple_avg};
use super::utils::triangle;

/// Multiplicity of angular momentum `L` within seniority `v`.
pub fn so5_mult(v: i32, l: i32) -> i32 {
    if v < 0 || l < 0 {
        return 0;
    }
    (0 ..= v / 3)
        .filter(|&k| {
            let lp = v - 3 * k;
            lp <= l && l <= 2 * lp && l != 2 * lp - 1
        })
        .count() as i32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
pub struct SphLabel {
    pub v: i32,
    pub alpha: i32,
    pub l: i32,
}

/// Labels `(v, α, L)` with `v_min ≤ v ≤ v_max` and `L_min ≤ L ≤ L_max`,
/// ordered lexicographically.
pub fn lbs_so5r3_rng(v_min: i32, v_max: i32, l_min: i32, l_max: i32)
                     -> Vec<SphLabel> {
    let mut labels = Vec::new();
    for v in max(v_min, 0) ..= v_max {
        let mult_max = (max(l_min, 0) ..= l_max)
            .map(|l| so5_mult(v, l))
            .max()
            .unwrap_or(0);
        for alpha in 1 ..= mult_max {
            for l in max(l_min, 0) ..= l_max {
                if alpha <= so5_mult(v, l) {
                    labels.push(SphLabel { v, alpha, l });
                }
            }
        }
    }
    labels
}

/// Labels at a single angular momentum.
pub fn lbs_so5r3(v_min: i32, v_max: i32, l: i32) -> Vec<SphLabel> {
    lbs_so5r3_rng(v_min, v_max, l, l)
}

pub fn dim_so5r3_rng(v_min: i32, v_max: i32, l_min: i32, l_max: i32)
                     -> usize {
    let mut n = 0;
    for v in max(v_min, 0) ..= v_max {
        for l in max(l_min, 0) ..= l_max {
            n += so5_mult(v, l) as usize;
        }
    }
    n
}

pub fn dim_so5r3(v_min: i32, v_max: i32, l: i32) -> usize {
    dim_so5r3_rng(v_min, v_max, l, l)
}

/// Elementary spherical operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SphOp {
    Id,
    /// `M = 0` component of the SO(5) spherical harmonic `SpHarm_{v α L}`.
    Harm { v: i32, alpha: i32, l: i32 },
    /// SO(5) Casimir, eigenvalue `v (v + 3)`.
    Lambda,
    /// SO(3) Casimir, eigenvalue `L (L + 1)`.
    SqL,
}

/// `SpHarm_112`, proportional to the quadrupole shape variable.
pub const SPHARM_112: SphOp = SphOp::Harm { v: 1, alpha: 1, l: 2 };

/// `SpHarm_310 = 3 cos 3γ`
pub const SPHARM_310: SphOp = SphOp::Harm { v: 3, alpha: 1, l: 0 };

impl SphOp {
    /// SO(3) tensor rank.
    pub fn rank(self) -> i32 {
        match self {
            SphOp::Harm { l, .. } => l,
            _ => 0,
        }
    }

    pub fn validate(self) -> Result<()> {
        if let SphOp::Harm { v, alpha, l } = self {
            require_nonnegint("v", v)?;
            require_posint("alpha", alpha)?;
            require_nonnegint("L", l)?;
            if alpha > so5_mult(v, l) {
                return Err(Error::value(
                    "alpha", format!("{} (v = {}, L = {})", alpha, v, l),
                    "exceeds the multiplicity of L in seniority v"));
            }
        }
        Ok(())
    }
}

lazy_static! {
    static ref SO5_REDUCED: Mutex<FnvHashMap<(i32, i32, i32), f64>> =
        Default::default();
}

/// SO(5)-reduced matrix element `⟨v_f|||SpHarm_{v2}|||v_i⟩`.
pub fn so5_reduced(v_f: i32, v2: i32, v_i: i32) -> f64 {
    if v_f < 0 || v2 < 0 || v_i < 0
        || (v_f + v2 + v_i) % 2 != 0 || !triangle(v_i, v2, v_f)
    {
        return 0.0;
    }
    let key = (v_f, v2, v_i);
    let mut memo = SO5_REDUCED.lock().unwrap_or_else(|e| e.into_inner());
    *memo.entry(key).or_insert_with(|| {
        // dimension of the SO(5) irrep of seniority v
        let dim = |v: i32| {
            let v = v as i64;
            BigRational::from_integer(
                BigInt::from((v + 1) * (v + 2) * (2 * v + 3) / 6))
        };
        let sq = Ratio::new(BigInt::from(2 * v2 as i64 + 3), BigInt::from(3))
            * dim(v_i) * dim(v2)
            * zonal_triple_avg(v_i as u32, v2 as u32, v_f as u32);
        signed_sqrt(1, &sq)
    })
}

/// Evaluation context: the CG store plus a memo of SO(3) coefficients.
struct Ctx<'a> {
    store: &'a So5CgStore,
    w3jm: Wigner3jmCtx,
}

impl<'a> Ctx<'a> {
    fn new(store: &'a So5CgStore) -> Self {
        Self { store, w3jm: Default::default() }
    }

    /// `⟨f‖SpHarm_{v2 α2 L2}‖i⟩` in the Rose convention.
    fn rose(&mut self, f: SphLabel, (v2, a2, l2): (i32, i32, i32),
            i: SphLabel) -> Result<f64> {
        let c = self.store.get(&So5CgKey {
            v1: i.v, a1: i.alpha, l1: i.l,
            v2, a2, l2,
            v3: f.v, a3: f.alpha, l3: f.l,
        })?;
        if c == 0.0 {
            return Ok(0.0);
        }
        Ok(c * so5_reduced(f.v, v2, i.v))
    }

    /// Element between states of projection `m`.
    fn element(&mut self, op: SphOp, f: SphLabel, i: SphLabel, m: i32)
               -> Result<f64> {
        Ok(match op {
            SphOp::Id => if f == i { 1.0 } else { 0.0 },
            SphOp::Lambda => {
                if f == i { (f.v * (f.v + 3)) as f64 } else { 0.0 }
            }
            SphOp::SqL => {
                if f == i { (f.l * (f.l + 1)) as f64 } else { 0.0 }
            }
            SphOp::Harm { v, alpha, l } => {
                let c = self.w3jm.cg(ClebschGordan {
                    tj1: 2 * i.l,
                    tm1: 2 * m,
                    tj2: 2 * l,
                    tm2: 0,
                    tj12: 2 * f.l,
                    tm12: 2 * m,
                });
                if c == 0.0 {
                    0.0
                } else {
                    c * self.rose(f, (v, alpha, l), i)?
                }
            }
        })
    }

    fn matrix(&mut self, op: SphOp, rows: &[SphLabel], cols: &[SphLabel],
              m: i32) -> Result<DMatrix<f64>> {
        let mut mat = DMatrix::zeros(rows.len(), cols.len());
        for (c, &i) in cols.iter().enumerate() {
            for (r, &f) in rows.iter().enumerate() {
                mat[(r, c)] = self.element(op, f, i, m)?;
            }
        }
        Ok(mat)
    }

    fn rose_matrix(&mut self, op: SphOp, rows: &[SphLabel],
                   cols: &[SphLabel]) -> Result<DMatrix<f64>> {
        let mut mat = DMatrix::zeros(rows.len(), cols.len());
        if let SphOp::Harm { v, alpha, l } = op {
            for (c, &i) in cols.iter().enumerate() {
                for (r, &f) in rows.iter().enumerate() {
                    mat[(r, c)] = self.rose(f, (v, alpha, l), i)?;
                }
            }
        }
        Ok(mat)
    }

    /// Product `ops[0] … ops[n−1]` on `labels`, all at projection `m`.
    fn product(&mut self, ops: &[SphOp], labels: &[SphLabel], m: i32)
               -> Result<DMatrix<f64>> {
        let n = labels.len();
        let mut acc = DMatrix::identity(n, n);
        for &op in ops.iter().rev() {
            if op == SphOp::Id {
                continue;
            }
            acc = self.matrix(op, labels, labels, m)? * acc;
        }
        Ok(acc)
    }

    /// Product in the M scheme at projection `m`, with intermediate
    /// states of every `L ≥ m` permitted by the seniority range.
    fn m_scheme(&mut self, ops: &[SphOp], v_min: i32, v_max: i32, m: i32)
                -> Result<(Vec<SphLabel>, DMatrix<f64>)> {
        let labels = lbs_so5r3_rng(v_min, v_max, m, max(2 * v_max, m));
        let mat = self.product(ops, &labels, m)?;
        Ok((labels, mat))
    }
}

fn validate_ops(ops: &[SphOp]) -> Result<()> {
    for &op in ops {
        op.validate()?;
    }
    Ok(())
}

/// Blocks of fixed `L` exist only for products of SO(3) scalars.
pub fn require_scalar(ops: &[SphOp]) -> Result<()> {
    if let Some(op) = ops.iter().find(|op| op.rank() != 0) {
        return Err(Error::value(
            "spherical factor", format!("{:?}", op),
            "has nonzero angular momentum and does not conserve L"));
    }
    Ok(())
}

fn validate_v(v_min: i32, v_max: i32) -> Result<()> {
    require_nonnegint("v_min", v_min)?;
    require_nonnegint("v_max", v_max)?;
    Ok(())
}

fn index_of(labels: &[SphLabel]) -> FnvHashMap<SphLabel, usize> {
    labels.iter().enumerate().map(|(k, &s)| (s, k)).collect()
}

/// Matrix of the product `ops[0] … ops[n−1]` on the truncated spherical
/// space `v_min ..= v_max`, `L_min ..= L_max`, indexed by
/// [`lbs_so5r3_rng`](fn.lbs_so5r3_rng.html).  Elements between
/// different `L` are taken at `M = min(L_f, L_i)`.
pub fn rep_so5r3_prod_rem(
    store: &So5CgStore,
    ops: &[SphOp],
    v_min: i32,
    v_max: i32,
    l_min: i32,
    l_max: i32,
) -> Result<DMatrix<f64>> {
    validate_v(v_min, v_max)?;
    require_nonnegint("L_min", l_min)?;
    require_nonnegint("L_max", l_max)?;
    validate_ops(ops)?;
    require_scalar(ops)?;
    let labels = lbs_so5r3_rng(v_min, v_max, l_min, l_max);
    let n = labels.len();
    let mut ctx = Ctx::new(store);
    let mut schemes = FnvHashMap::default();
    let mut out = DMatrix::zeros(n, n);
    for (c, &i) in labels.iter().enumerate() {
        for (r, &f) in labels.iter().enumerate() {
            let m = min(f.l, i.l);
            if !schemes.contains_key(&m) {
                let (inter, mat) = ctx.m_scheme(ops, v_min, v_max, m)?;
                schemes.insert(m, (index_of(&inter), mat));
            }
            let (index, mat) = &schemes[&m];
            out[(r, c)] = mat[(index[&f], index[&i])];
        }
    }
    Ok(out)
}

/// M-scheme matrix of the product from angular momentum `L_i` (columns)
/// to `L_f` (rows) at `M = min(L_f, L_i)`.
pub fn rep_so5r3_between(
    store: &So5CgStore,
    ops: &[SphOp],
    v_min: i32,
    v_max: i32,
    l_f: i32,
    l_i: i32,
) -> Result<DMatrix<f64>> {
    validate_v(v_min, v_max)?;
    require_nonnegint("L_f", l_f)?;
    require_nonnegint("L_i", l_i)?;
    validate_ops(ops)?;
    let rows = lbs_so5r3(v_min, v_max, l_f);
    let cols = lbs_so5r3(v_min, v_max, l_i);
    if rows.is_empty() || cols.is_empty() {
        return Ok(DMatrix::zeros(rows.len(), cols.len()));
    }
    let mut ctx = Ctx::new(store);
    let (inter, mat) = ctx.m_scheme(ops, v_min, v_max, min(l_f, l_i))?;
    let index = index_of(&inter);
    Ok(DMatrix::from_fn(rows.len(), cols.len(), |r, c| {
        mat[(index[&rows[r]], index[&cols[c]])]
    }))
}

/// Block of the product at a single angular momentum.
pub fn rep_so5r3_prod(
    store: &So5CgStore,
    ops: &[SphOp],
    v_min: i32,
    v_max: i32,
    l: i32,
) -> Result<DMatrix<f64>> {
    validate_ops(ops)?;
    require_scalar(ops)?;
    rep_so5r3_between(store, ops, v_min, v_max, l, l)
}

/// SO(3)-reduced matrix `⟨L_f‖ops‖L_i⟩` (Rose convention) of a product
/// with at most one factor of nonzero rank.
pub fn rep_so5r3_reduced(
    store: &So5CgStore,
    ops: &[SphOp],
    v_min: i32,
    v_max: i32,
    l_f: i32,
    l_i: i32,
) -> Result<DMatrix<f64>> {
    validate_v(v_min, v_max)?;
    require_nonnegint("L_f", l_f)?;
    require_nonnegint("L_i", l_i)?;
    validate_ops(ops)?;
    let tensors: Vec<usize> = ops.iter().enumerate()
        .filter(|&(_, op)| op.rank() != 0)
        .map(|(k, _)| k)
        .collect();
    let rows = lbs_so5r3(v_min, v_max, l_f);
    let cols = lbs_so5r3(v_min, v_max, l_i);
    let mut ctx = Ctx::new(store);
    match tensors.len() {
        0 => {
            if l_f != l_i {
                return Ok(DMatrix::zeros(rows.len(), cols.len()));
            }
            // scalars keep L, so the product closes on the L block
            ctx.product(ops, &rows, l_f)
        }
        1 => {
            let k = tensors[0];
            let left = ctx.product(&ops[.. k], &rows, l_f)?;
            let mid = ctx.rose_matrix(ops[k], &rows, &cols)?;
            let right = ctx.product(&ops[k + 1 ..], &cols, l_i)?;
            Ok(left * mid * right)
        }
        _ => Err(Error::value("ops", format!("{:?}", ops),
                              "reduced matrix needs at most one tensor \
                               factor of nonzero rank")),
    }
}

/// Rule attaching a radial basis `λ + dλ(v)` to each seniority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum BasisType {
    /// `dλ(v) = 0`
    Fixed,
    /// `dλ(v) = v`
    Seniority,
    /// `dλ(v) = v mod 2`
    Parity,
    /// `dλ(v) = v − v_min`
    SeniorityFromMin,
}

impl Default for BasisType {
    fn default() -> Self {
        BasisType::Fixed
    }
}

impl BasisType {
    pub fn code(self) -> i64 {
        match self {
            BasisType::Fixed => 0,
            BasisType::Seniority => 1,
            BasisType::Parity => 2,
            BasisType::SeniorityFromMin => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        Ok(match code {
            0 => BasisType::Fixed,
            1 => BasisType::Seniority,
            2 => BasisType::Parity,
            3 => BasisType::SeniorityFromMin,
            _ => return Err(Error::value("basis_type", code,
                                         "must be 0, 1, 2 or 3")),
        })
    }

    /// Offset `dλ(v)` of the radial basis used at seniority `v`.
    pub fn lambda_shift(self, v: i32, v_min: i32) -> i32 {
        match self {
            BasisType::Fixed => 0,
            BasisType::Seniority => v,
            BasisType::Parity => v % 2,
            BasisType::SeniorityFromMin => v - v_min,
        }
    }
}

impl ::std::convert::TryFrom<i64> for BasisType {
    type Error = Error;
    fn try_from(code: i64) -> Result<Self> {
        BasisType::from_code(code)
    }
}

impl From<BasisType> for i64 {
    fn from(b: BasisType) -> i64 {
        b.code()
    }
}

/// `[dλ(0), …, dλ(v_max)]` for a space starting at seniority 0.
pub fn show_lambda_fun(basis_type: BasisType, v_max: i32) -> Result<Vec<i32>> {
    let v_max = require_nonnegint("v_max", v_max)?;
    Ok((0 ..= v_max).map(|v| basis_type.lambda_shift(v, 0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::error::ErrorKind;
    use super::super::utils::Toler;

    const TOLER: Toler = Toler { relerr: 1e-12, abserr: 1e-12 };

    #[test]
    fn test_mult() {
        assert_eq!(so5_mult(0, 0), 1);
        assert_eq!(so5_mult(1, 1), 0);
        assert_eq!(so5_mult(1, 2), 1);
        assert_eq!(so5_mult(2, 3), 0);
        assert_eq!(so5_mult(3, 0), 1);
        assert_eq!(so5_mult(3, 5), 0);
        assert_eq!(so5_mult(6, 6), 2);
        assert_eq!(so5_mult(6, 5), 0);
        assert_eq!(so5_mult(-1, 0), 0);
        // the number of states of seniority v sums to the SO(5) dimension
        for v in 0 .. 12 {
            let d: i32 = (0 ..= 2 * v).map(|l| (2 * l + 1) * so5_mult(v, l))
                .sum();
            assert_eq!(d, (v + 1) * (v + 2) * (2 * v + 3) / 6);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(lbs_so5r3(0, 5, 0), vec![
            SphLabel { v: 0, alpha: 1, l: 0 },
            SphLabel { v: 3, alpha: 1, l: 0 },
        ]);
        assert_eq!(dim_so5r3(0, 6, 0), 3);
        let labels = lbs_so5r3_rng(6, 6, 6, 6);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1], SphLabel { v: 6, alpha: 2, l: 6 });
        let labels = lbs_so5r3_rng(0, 8, 0, 8);
        assert_eq!(labels.len(), dim_so5r3_rng(0, 8, 0, 8));
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
        assert!(lbs_so5r3_rng(3, 2, 0, 4).is_empty());
    }

    #[test]
    fn test_so5_reduced() {
        toler_assert_eq!(TOLER, so5_reduced(0, 3, 3), 90f64.sqrt());
        toler_assert_eq!(TOLER, so5_reduced(3, 3, 0), 3f64.sqrt());
        toler_assert_eq!(TOLER, so5_reduced(1, 1, 0), (5.0f64 / 3.0).sqrt());
        assert_eq!(so5_reduced(1, 1, 1), 0.0);
        assert_eq!(so5_reduced(0, 1, 3), 0.0);
    }

    #[test]
    fn test_lambda_fun() {
        let s = |b| show_lambda_fun(b, 10).unwrap();
        assert_eq!(s(BasisType::Fixed), vec![0; 11]);
        assert_eq!(s(BasisType::Seniority), (0 ..= 10).collect::<Vec<_>>());
        assert_eq!(s(BasisType::Parity),
                   vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(s(BasisType::SeniorityFromMin),
                   (0 ..= 10).collect::<Vec<_>>());
        assert_eq!(BasisType::SeniorityFromMin.lambda_shift(4, 1), 3);
        assert_eq!(BasisType::from_code(4).unwrap_err().kind(),
                   ErrorKind::Value);
        assert_eq!(BasisType::from_code(2).unwrap().code(), 2);
    }

    #[test]
    fn test_scalar_ops() {
        let store = So5CgStore::new("no/such/dir");
        let m = rep_so5r3_prod(&store, &[SphOp::Lambda, SphOp::SqL],
                               0, 4, 2).unwrap();
        // L = 2 occurs at v = 1, 2, 4
        assert_eq!(m.shape(), (3, 3));
        toler_assert_eq!(TOLER, m[(0, 0)], 4.0 * 6.0);
        toler_assert_eq!(TOLER, m[(1, 1)], 10.0 * 6.0);
        toler_assert_eq!(TOLER, m[(2, 2)], 28.0 * 6.0);
        toler_assert_eq!(TOLER, m[(0, 1)], 0.0);
        assert_eq!(rep_so5r3_prod(&store, &[SphOp::Harm {
            v: 1, alpha: 2, l: 2,
        }], 0, 4, 2).unwrap_err().kind(), ErrorKind::Value);
        // a quadrupole factor mixes angular momenta
        for ops in &[&[SPHARM_112][..], &[SphOp::Lambda, SPHARM_112][..]] {
            assert_eq!(rep_so5r3_prod(&store, ops, 0, 4, 2).unwrap_err()
                       .kind(), ErrorKind::Value);
            assert_eq!(rep_so5r3_prod_rem(&store, ops, 0, 4, 0, 4)
                       .unwrap_err().kind(), ErrorKind::Value);
        }
        assert_eq!(rep_so5r3_reduced(&store, &[SPHARM_112, SPHARM_112],
                                     0, 2, 0, 0).unwrap_err().kind(),
                   ErrorKind::Value);
    }
}
