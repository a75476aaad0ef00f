//! Sums of products of radial and spherical operators.
use std::{fmt, slice};
use std::ops::{Add, AddAssign, Mul, Neg};
use super::radial::RadialOp;
use super::spherical::{SphOp, SPHARM_112, SPHARM_310};

/// `coeff · (radial[0] ⋯ radial[n−1]) ⊗ (spherical[0] ⋯ spherical[m−1])`.
/// Empty factor lists stand for the identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub coeff: f64,
    pub radial: Vec<RadialOp>,
    pub spherical: Vec<SphOp>,
}

impl Term {
    pub fn new(coeff: f64, radial: Vec<RadialOp>, spherical: Vec<SphOp>)
               -> Self {
        Self { coeff, radial, spherical }
    }

    /// Net power of `β` of the radial factors.
    pub fn scale_power(&self) -> i32 {
        self.radial.iter().map(|op| op.scale_power()).sum()
    }
}

/// Ordered sum of terms.  An empty sum is the zero operator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorSum(Vec<Term>);

impl OperatorSum {
    pub fn new() -> Self {
        Default::default()
    }

    /// Single-term sum.
    pub fn term(coeff: f64, radial: Vec<RadialOp>, spherical: Vec<SphOp>)
                -> Self {
        let mut s = Self::new();
        s.push(Term::new(coeff, radial, spherical));
        s
    }

    /// Appends a term unless its coefficient is exactly zero.
    pub fn push(&mut self, term: Term) {
        if term.coeff != 0.0 {
            self.0.push(term);
        }
    }

    pub fn iter(&self) -> slice::Iter<Term> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a OperatorSum {
    type Item = &'a Term;
    type IntoIter = slice::Iter<'a, Term>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Term> for OperatorSum {
    fn extend<I: IntoIterator<Item = Term>>(&mut self, iter: I) {
        for term in iter {
            self.push(term);
        }
    }
}

impl AddAssign for OperatorSum {
    fn add_assign(&mut self, other: Self) {
        self.extend(other.0);
    }
}

impl Add for OperatorSum {
    type Output = Self;
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Mul<OperatorSum> for f64 {
    type Output = OperatorSum;
    fn mul(self, sum: OperatorSum) -> OperatorSum {
        let mut r = OperatorSum::new();
        r.extend(sum.0.into_iter().map(|t| Term { coeff: self * t.coeff, .. t }));
        r
    }
}

impl Mul<f64> for OperatorSum {
    type Output = OperatorSum;
    fn mul(self, c: f64) -> OperatorSum {
        c * self
    }
}

impl Neg for OperatorSum {
    type Output = OperatorSum;
    fn neg(self) -> OperatorSum {
        -1.0 * self
    }
}

impl fmt::Display for OperatorSum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, t) in self.iter().enumerate() {
            if i != 0 {
                write!(f, " + ")?;
            }
            write!(f, "{} {:?} ⊗ {:?}", t.coeff, t.radial, t.spherical)?;
        }
        Ok(())
    }
}

/// The ten-parameter collective Hamiltonian
///
/// ```text
/// x1 β² + x2 (−∇²) + x3 β⁴ + x4 β⁻² + x5 β cos 3γ + x6 β³ cos 3γ
///   + x7 cos² 3γ + x8 β² cos² 3γ + x9 Λ + x10
/// ```
///
/// with `−∇² = −(radial Laplacian) + Λ/β²` and `cos 3γ = SpHarm_310 / 3`.
pub fn acm_hamiltonian(x: [f64; 10]) -> OperatorSum {
    use self::RadialOp::*;
    let c3g = || vec![SPHARM_310];
    let c3g2 = || vec![SPHARM_310, SPHARM_310];
    let mut h = OperatorSum::new();
    h.push(Term::new(x[0], vec![B2], vec![]));
    h.push(Term::new(-x[1], vec![Lap], vec![]));
    h.push(Term::new(x[1], vec![Bm2], vec![SphOp::Lambda]));
    h.push(Term::new(x[2], vec![B2, B2], vec![]));
    h.push(Term::new(x[3], vec![Bm2], vec![]));
    h.push(Term::new(x[4] / 3.0, vec![B], c3g()));
    h.push(Term::new(x[5] / 3.0, vec![Pow(3)], c3g()));
    h.push(Term::new(x[6] / 9.0, vec![], c3g2()));
    h.push(Term::new(x[7] / 9.0, vec![B2], c3g2()));
    h.push(Term::new(x[8], vec![], vec![SphOp::Lambda]));
    h.push(Term::new(x[9], vec![], vec![]));
    h
}

/// Quadrupole operator `β SpHarm_112`.
pub fn quadrupole() -> OperatorSum {
    OperatorSum::term(1.0, vec![RadialOp::B], vec![SPHARM_112])
}

/// Monopole operator `β²`.
pub fn monopole() -> OperatorSum {
    OperatorSum::term(1.0, vec![RadialOp::B2], vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_pruning() {
        assert!(acm_hamiltonian([0.0; 10]).is_zero());
        let h = acm_hamiltonian([1.0, 0.0, 0.0, 0.0, 0.0,
                                 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(h.len(), 1);
        assert_eq!(h.iter().next().unwrap().radial, vec![RadialOp::B2]);
        // −∇² contributes two terms
        let h = acm_hamiltonian([0.0, 2.0, 0.0, 0.0, 0.0,
                                 0.0, 0.0, 0.0, 0.0, 0.0]);
        let coeffs: Vec<_> = h.iter().map(|t| t.coeff).collect();
        assert_eq!(coeffs, vec![-2.0, 2.0]);
        assert_eq!(acm_hamiltonian([1.0; 10]).len(), 11);
    }

    #[test]
    fn test_algebra() {
        let s = quadrupole() + 2.0 * monopole();
        assert_eq!(s.len(), 2);
        let t: Vec<_> = s.iter().map(|t| t.coeff).collect();
        assert_eq!(t, vec![1.0, 2.0]);
        assert!((0.0 * s.clone()).is_zero());
        assert_eq!((-s.clone()).iter().next().unwrap().coeff, -1.0);
        assert_eq!((s * 0.5).iter().map(|t| t.coeff).sum::<f64>(), 1.5);
        assert_eq!(OperatorSum::new().to_string(), "0");
        let h = acm_hamiltonian([0.0, 0.0, 0.0, 0.0, 3.0,
                                 0.0, 0.0, 0.0, 0.0, 0.0]);
        let t = h.iter().next().unwrap();
        assert_eq!(t.coeff, 1.0);
        assert_eq!(t.spherical, vec![SPHARM_310]);
        assert_eq!(t.scale_power(), 1);
    }
}
