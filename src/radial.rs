//! Radial bases of the collective model and their operator algebra.
//!
//! The radial basis with parameter `λ` and unit length scale is
//!
//! ```text
//! R^λ_ν(β) = (−1)^ν √(2 ν! / Γ(λ + ν)) β^(λ − 5/2) L^(λ−1)_ν(β²) e^(−β²/2)
//! ```
//!
//! orthonormal with respect to `β⁴ dβ`.  For a length scale `a` the
//! argument becomes `aβ`, so a matrix element of an operator with "β
//! dimension" `p` picks up a factor of `a^(−p)`.
use std::cmp::{max, min};
use nalgebra::DMatrix;
use num::{BigRational, Integer, One, Signed, ToPrimitive, Zero};
use num::rational::Ratio;
use super::error::{Error, Result};
use super::guards::{require_nonnegint, require_positive};
use super::special::{factorial, ln_gamma, ratio_from_f64, ratio_from_int,
                     ratio_to_f64, rising, signed_sqrt};

/// Tolerance used to decide whether two `λ` values coincide.
const LAMBDA_EPS: f64 = 1e-12;

/// A member `{|λ; ν⟩ : ν ≥ 0}` of the radial family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialBasis {
    lambda: f64,
}

impl RadialBasis {
    pub fn new(lambda: f64) -> Result<Self> {
        Ok(Self { lambda: require_positive("lambda", lambda)? })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// The basis with parameter `λ + d`.
    pub fn shifted(&self, d: i32) -> Result<Self> {
        Self::new(self.lambda + d as f64)
    }
}

/// Dimension of the truncated radial space `ν_min ..= ν_max`.
pub fn dim_radial(nu_min: i32, nu_max: i32) -> usize {
    max(0, nu_max - nu_min + 1) as usize
}

/// Labels of the truncated radial space in ascending order.
pub fn lbs_radial(nu_min: i32, nu_max: i32) -> Vec<i32> {
    (nu_min ..= nu_max).collect()
}

/// Truncated radial space `ν_min ..= ν_max`.  May be empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RadialSpace {
    pub nu_min: i32,
    pub nu_max: i32,
}

impl RadialSpace {
    pub fn new(nu_min: i32, nu_max: i32) -> Result<Self> {
        Ok(Self {
            nu_min: require_nonnegint("nu_min", nu_min)?,
            nu_max: require_nonnegint("nu_max", nu_max)?,
        })
    }

    pub fn dim(&self) -> usize {
        dim_radial(self.nu_min, self.nu_max)
    }

    pub fn labels(&self) -> Vec<i32> {
        lbs_radial(self.nu_min, self.nu_max)
    }

    fn widen(&self, ext: i32) -> Self {
        Self {
            nu_min: max(0, self.nu_min - ext),
            nu_max: self.nu_max + ext,
        }
    }
}

/// Elementary radial operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadialOp {
    /// Identity; between different `λ` this is the overlap `I_{λ′←λ}`.
    Id,
    /// `β`
    B,
    /// `β⁻¹`
    Bm,
    /// `β²`
    B2,
    /// `β⁻²`
    Bm2,
    /// `β^k`
    Pow(i32),
    /// `d/dβ`
    Db,
    /// `β d/dβ`
    BDb,
    /// `d²/dβ² + (4/β) d/dβ − ((λ − 1)² − 9/4)/β²`, adapted to the basis
    /// it acts on.
    D2b,
    /// Radial Laplacian `d²/dβ² + (4/β) d/dβ`.
    Lap,
    /// su(1,1) weight operator.
    S0,
    /// su(1,1) raising operator.
    Sp,
    /// su(1,1) lowering operator.
    Sm,
}

impl RadialOp {
    /// Power `p` of `β` carried by the operator: its matrix elements scale
    /// with the length scale as `a^(−p)`.
    pub fn scale_power(self) -> i32 {
        match self {
            RadialOp::Id | RadialOp::BDb => 0,
            RadialOp::S0 | RadialOp::Sp | RadialOp::Sm => 0,
            RadialOp::B => 1,
            RadialOp::Bm | RadialOp::Db => -1,
            RadialOp::B2 => 2,
            RadialOp::Bm2 | RadialOp::D2b | RadialOp::Lap => -2,
            RadialOp::Pow(k) => k,
        }
    }

    pub fn is_hermitian(self) -> bool {
        match self {
            RadialOp::Db | RadialOp::BDb | RadialOp::Sp | RadialOp::Sm => false,
            _ => true,
        }
    }

    /// `β^k` in its most specific form.
    pub fn power(k: i32) -> Self {
        match k {
            0 => RadialOp::Id,
            1 => RadialOp::B,
            -1 => RadialOp::Bm,
            2 => RadialOp::B2,
            -2 => RadialOp::Bm2,
            k => RadialOp::Pow(k),
        }
    }

    /// Exponent `k` if the operator is a pure power `β^k`.
    pub fn power_of(self) -> Option<i32> {
        match self {
            RadialOp::Id => Some(0),
            RadialOp::B => Some(1),
            RadialOp::Bm => Some(-1),
            RadialOp::B2 => Some(2),
            RadialOp::Bm2 => Some(-2),
            RadialOp::Pow(k) => Some(k),
            _ => None,
        }
    }

    /// Whether the operator is only defined between equal `λ`.
    pub fn preserves_lambda(self) -> bool {
        match self {
            RadialOp::BDb | RadialOp::D2b | RadialOp::Lap
                | RadialOp::S0 | RadialOp::Sp | RadialOp::Sm => true,
            _ => false,
        }
    }

    /// Change of `λ` this operator takes when `remaining` units are still
    /// needed to reach the target basis.
    fn natural_shift(self, remaining: i32) -> i32 {
        match self {
            RadialOp::Db => 1,
            op if op.power_of().is_some() => remaining,
            _ => 0,
        }
    }

    /// Largest `|μ − ν|` with a nonzero element for the given change of
    /// `λ`, or `None` if the matrix is dense.
    fn bandwidth(self, shift: i32) -> Option<i32> {
        match (self, shift) {
            (RadialOp::Id, 0) | (RadialOp::S0, 0) => Some(0),
            (RadialOp::B, 1) | (RadialOp::B, -1) => Some(1),
            (RadialOp::B2, 0) => Some(1),
            (RadialOp::Pow(k), 0) if k >= 0 && k % 2 == 0 => Some(k / 2),
            (RadialOp::D2b, 0) | (RadialOp::BDb, 0) => Some(1),
            (RadialOp::Sp, 0) | (RadialOp::Sm, 0) => Some(1),
            _ => None,
        }
    }

    /// Matrix element `⟨λ_f; μ|O|λ_i; ν⟩` at unit length scale.
    pub fn matrix_element(self, lam_f: f64, lam_i: f64, mu: i32, nu: i32)
                          -> Result<f64> {
        RadialBasis::new(lam_f)?;
        RadialBasis::new(lam_i)?;
        require_nonnegint("mu", mu)?;
        require_nonnegint("nu", nu)?;
        let shift = lam_f - lam_i;
        let same = shift.abs() < LAMBDA_EPS;
        if !same && self.preserves_lambda() {
            return Err(Error::value("lambda_f", lam_f,
                                    "operator is diagonal in lambda"));
        }
        let op = match self.power_of() {
            Some(k) => RadialOp::power(k),
            None => self,
        };
        let lam = lam_i;
        let (m, n) = (mu as f64, nu as f64);
        Ok(match op {
            RadialOp::Id if same => delta(mu, nu),
            RadialOp::B if (shift - 1.0).abs() < LAMBDA_EPS => {
                if mu == nu {
                    (lam + n).sqrt()
                } else if mu == nu - 1 {
                    n.sqrt()
                } else {
                    0.0
                }
            }
            RadialOp::B if (shift + 1.0).abs() < LAMBDA_EPS => {
                if mu == nu {
                    (lam + n - 1.0).sqrt()
                } else if mu == nu + 1 {
                    (n + 1.0).sqrt()
                } else {
                    0.0
                }
            }
            RadialOp::B2 if same => tridiagonal(lam, mu, nu, lam + 2.0 * n),
            RadialOp::Bm2 if same => inv_square(lam, mu, nu)?,
            RadialOp::Id => power_element(0, lam_f, lam_i, mu, nu)?,
            RadialOp::B => power_element(1, lam_f, lam_i, mu, nu)?,
            RadialOp::Bm => power_element(-1, lam_f, lam_i, mu, nu)?,
            RadialOp::B2 => power_element(2, lam_f, lam_i, mu, nu)?,
            RadialOp::Bm2 => power_element(-2, lam_f, lam_i, mu, nu)?,
            RadialOp::Pow(k) => power_element(k, lam_f, lam_i, mu, nu)?,
            RadialOp::Db => {
                // d/dβ = β⁻¹ (β d/dβ), the latter being tridiagonal
                let mut s = 0.0;
                for kappa in max(0, nu - 1) ..= nu + 1 {
                    let d = beta_ddbeta(lam, kappa, nu);
                    if d != 0.0 {
                        s += power_element(-1, lam_f, lam_i, mu, kappa)? * d;
                    }
                }
                s
            }
            RadialOp::BDb => beta_ddbeta(lam, mu, nu),
            RadialOp::D2b => tridiagonal(lam, mu, nu, -(lam + 2.0 * n)),
            RadialOp::Lap => {
                let c = (lam - 1.0).powi(2) - 2.25;
                let d2b = tridiagonal(lam, mu, nu, -(lam + 2.0 * n));
                if c.abs() < LAMBDA_EPS {
                    d2b
                } else {
                    d2b + c * inv_square(lam, mu, nu)?
                }
            }
            RadialOp::S0 => delta(mu, nu) * (lam + 2.0 * n) / 2.0,
            RadialOp::Sp => {
                if mu == nu + 1 { ((lam + n) * m).sqrt() } else { 0.0 }
            }
            RadialOp::Sm => {
                if mu == nu - 1 { ((lam + m) * n).sqrt() } else { 0.0 }
            }
        })
    }

    /// Matrix on the truncated space, with rows in basis `λ_f` and columns
    /// in basis `λ_i`, at length scale `a`.
    pub fn rep(self, a: f64, lam_f: f64, lam_i: f64, space: &RadialSpace)
               -> Result<DMatrix<f64>> {
        require_positive("a", a)?;
        let d = lam_f - lam_i;
        // a non-integral shift never matches a banded pattern
        let shift = if (d - d.round()).abs() < LAMBDA_EPS {
            d.round() as i32
        } else {
            i32::min_value()
        };
        let mut m = self.rep_unscaled(lam_f, lam_i, shift, space)?;
        m *= a.powi(-self.scale_power());
        Ok(m)
    }

    fn rep_unscaled(
        self,
        lam_f: f64,
        lam_i: f64,
        shift: i32,
        space: &RadialSpace,
    ) -> Result<DMatrix<f64>> {
        let labels = space.labels();
        let n = labels.len();
        let band = self.bandwidth(shift);
        let mut m = DMatrix::zeros(n, n);
        for (c, &nu) in labels.iter().enumerate() {
            for (r, &mu) in labels.iter().enumerate() {
                if let Some(bw) = band {
                    if (mu - nu).abs() > bw {
                        continue;
                    }
                }
                m[(r, c)] = self.matrix_element(lam_f, lam_i, mu, nu)?;
            }
        }
        Ok(m)
    }
}

fn delta(mu: i32, nu: i32) -> f64 {
    if mu == nu { 1.0 } else { 0.0 }
}

/// Tridiagonal pattern shared by `β²`, `D2b` (and hence `S₀`, `S±`).
fn tridiagonal(lam: f64, mu: i32, nu: i32, diag: f64) -> f64 {
    let n = nu as f64;
    match mu - nu {
        0 => diag,
        1 => ((lam + n) * (n + 1.0)).sqrt(),
        -1 => ((lam + n - 1.0) * n).sqrt(),
        _ => 0.0,
    }
}

/// `⟨λ; μ|β⁻²|λ; ν⟩`, finite only for `λ > 1`.
fn inv_square(lam: f64, mu: i32, nu: i32) -> Result<f64> {
    if !(lam > 1.0) {
        return Err(Error::numeric(format!(
            "matrix elements of β⁻² diverge for λ = {} ≤ 1", lam)));
    }
    let (lo, hi) = (min(mu, nu), max(mu, nu));
    let mut p = 1.0;
    for k in lo + 1 ..= hi {
        p *= k as f64 / (lam + k as f64 - 1.0);
    }
    let sign = if (hi - lo) % 2 == 0 { 1.0 } else { -1.0 };
    Ok(sign * p.sqrt() / (lam - 1.0))
}

/// `⟨λ; μ|β d/dβ|λ; ν⟩`
fn beta_ddbeta(lam: f64, mu: i32, nu: i32) -> f64 {
    let n = nu as f64;
    if mu == nu {
        -2.5
    } else if mu == nu - 1 {
        (n * (lam + n - 1.0)).sqrt()
    } else if mu == nu + 1 {
        -((n + 1.0) * (lam + n)).sqrt()
    } else {
        0.0
    }
}

fn fact_ratio(n: i32) -> BigRational {
    Ratio::from_integer(factorial(n as u32))
}

/// `⟨λ_f; μ|β^k|λ_i; ν⟩` at unit length scale for arbitrary `λ_f`, `λ_i`.
///
/// The Laguerre sum is evaluated in exact rational arithmetic.  When
/// `λ_f − λ_i + k` is an even integer the gamma-function prefactor is
/// rational as well and the result is exact up to the final rounding.
pub fn power_element(k: i32, lam_f: f64, lam_i: f64, mu: i32, nu: i32)
                     -> Result<f64> {
    let lf = ratio_from_f64("lambda_f", lam_f)?;
    let li = ratio_from_f64("lambda_i", lam_i)?;
    if !lf.is_positive() || !li.is_positive() {
        return Err(Error::value("lambda", format!("({}, {})", lam_f, lam_i),
                                "must be positive"));
    }
    let two = ratio_from_int(2);
    let s = (&lf + &li + ratio_from_int(k as i64)) / &two;
    if !s.is_positive() {
        return Err(Error::numeric(format!(
            "⟨β^{}⟩ between λ = {} and λ = {} is singular", k, lam_f, lam_i)));
    }

    let mut sum = BigRational::zero();
    for j in 0 ..= mu {
        let jr = ratio_from_int(j as i64);
        let term = rising(&(&lf + &jr), (mu - j) as u32)
            / (fact_ratio(mu - j) * fact_ratio(j))
            * rising(&s, j as u32)
            * rising(&(&li - &s - &jr), nu as u32);
        if j % 2 == 0 {
            sum = sum + term;
        } else {
            sum = sum - term;
        }
    }
    if sum.is_zero() {
        return Ok(0.0);
    }
    sum = sum / fact_ratio(nu);

    let norm_sq = fact_ratio(mu) * fact_ratio(nu)
        / (rising(&lf, mu as u32) * rising(&li, nu as u32));
    let mut sign = if sum.is_negative() { -1 } else { 1 };
    if (mu + nu) % 2 != 0 {
        sign = -sign;
    }

    let d = &lf - &li + ratio_from_int(k as i64);
    if d.is_integer() && d.to_integer().is_even() {
        // Γ(s)/Γ(λ_i) and Γ(s)/Γ(λ_f) are Pochhammer ratios
        let n1 = (d / &two).to_integer().to_i64()
            .ok_or_else(|| Error::numeric("λ difference out of range"))?;
        let n2 = k as i64 - n1;
        let gamma_ratio = |base: &BigRational, n: i64| {
            if n >= 0 {
                rising(base, n as u32)
            } else {
                BigRational::one() / rising(&s, (-n) as u32)
            }
        };
        let sq = gamma_ratio(&li, n1) * gamma_ratio(&lf, n2)
            * norm_sq * &sum * &sum;
        Ok(signed_sqrt(sign, &sq))
    } else {
        let g = (ln_gamma(ratio_to_f64(&s))
                 - 0.5 * (ln_gamma(lam_f) + ln_gamma(lam_i))).exp();
        Ok(sign as f64 * g * ratio_to_f64(&norm_sq).sqrt()
           * ratio_to_f64(&sum.abs()))
    }
}

/// One factor of a radial product together with the bases it maps
/// between, as offsets from the reference `λ`.
#[derive(Clone, Copy, Debug)]
struct Step {
    op: RadialOp,
    d_out: i32,
    d_in: i32,
}

/// Assigns each factor of `ops[0] ops[1] … ops[n−1]` the bases it acts
/// between when mapping `λ + d_i` to `λ + d_f`.  Steps are returned in
/// order of application (rightmost factor first).
fn plan_product(ops: &[RadialOp], d_f: i32, d_i: i32) -> Vec<Step> {
    // adjacent powers of β combine exactly
    let mut merged: Vec<RadialOp> = Vec::with_capacity(ops.len());
    for &op in ops {
        let prev = merged.last().and_then(|last| last.power_of());
        match (prev, op.power_of()) {
            (Some(j), Some(k)) => {
                merged.pop();
                merged.push(RadialOp::power(j + k));
            }
            _ => merged.push(op),
        }
    }
    let mut steps = Vec::with_capacity(merged.len() + 1);
    let mut d = d_i;
    for &op in merged.iter().rev() {
        let shift = op.natural_shift(d_f - d);
        steps.push(Step { op, d_out: d + shift, d_in: d });
        d += shift;
    }
    if d != d_f {
        steps.push(Step { op: RadialOp::Id, d_out: d_f, d_in: d });
    }
    steps
}

/// Matrix of the product `ops[0] ops[1] … ops[n−1]` from the basis with
/// parameter `λ + d_i` (columns) to that with `λ + d_f` (rows).
///
/// Intermediate sums run over the truncated space widened by the total
/// bandwidth of the banded factors, so a product of banded operators is
/// exact on the requested block.
pub fn rep_radial_prod(
    ops: &[RadialOp],
    a: f64,
    lambda: f64,
    d_f: i32,
    d_i: i32,
    space: &RadialSpace,
) -> Result<DMatrix<f64>> {
    require_positive("a", a)?;
    let basis = RadialBasis::new(lambda)?;
    let steps = plan_product(ops, d_f, d_i);
    let dim = space.dim();
    if dim == 0 {
        return Ok(DMatrix::zeros(0, 0));
    }
    let ext = if steps.len() > 1 {
        steps.iter()
            .filter_map(|s| s.op.bandwidth(s.d_out - s.d_in))
            .sum()
    } else {
        0
    };
    let wide = space.widen(ext);
    let mut acc = DMatrix::identity(wide.dim(), wide.dim());
    for step in &steps {
        let lam_out = basis.shifted(step.d_out)?.lambda();
        let lam_in = basis.shifted(step.d_in)?.lambda();
        let m = step.op.rep_unscaled(lam_out, lam_in,
                                     step.d_out - step.d_in, &wide)?;
        acc = m * acc;
    }
    let power: i32 = ops.iter().map(|op| op.scale_power()).sum();
    acc *= a.powi(-power);
    let off = (space.nu_min - wide.nu_min) as usize;
    Ok(acc.view((off, off), (dim, dim)).into_owned())
}
