//! Product space radial ⊗ spherical and matrices of operator sums on it.
//!
//! At fixed `L` the basis is ordered with the radial label `ν` slow and
//! the spherical label `(v, α)` fast.  The radial basis attached to a
//! spherical state depends on its seniority through the
//! [`BasisType`](../spherical/enum.BasisType.html).
use fnv::FnvHashMap;
use nalgebra::DMatrix;
use super::error::Result;
use super::guards::{require_nonnegint, require_nonnegint_range,
                    require_positive};
use super::linalg::check_finite;
use super::op_sum::OperatorSum;
use super::radial::{rep_radial_prod, RadialSpace};
use super::so5cg::So5CgStore;
use super::spherical::{lbs_so5r3, lbs_so5r3_rng, rep_so5r3_prod,
                       rep_so5r3_prod_rem, rep_so5r3_reduced,
                       require_scalar, BasisType, SphLabel, SphOp};

/// Truncation of the product space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Truncation {
    pub nu_min: i32,
    pub nu_max: i32,
    pub v_min: i32,
    pub v_max: i32,
    pub l_min: i32,
    pub l_max: i32,
}

impl Truncation {
    pub fn validate(&self) -> Result<()> {
        require_nonnegint("nu_min", self.nu_min)?;
        require_nonnegint("nu_max", self.nu_max)?;
        require_nonnegint("v_min", self.v_min)?;
        require_nonnegint("v_max", self.v_max)?;
        require_nonnegint_range("L", self.l_min, self.l_max)?;
        Ok(())
    }

    /// Angular momenta in ascending order.
    pub fn ls(&self) -> ::std::ops::RangeInclusive<i32> {
        self.l_min ..= self.l_max
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
pub struct XLabel {
    pub nu: i32,
    pub sph: SphLabel,
}

/// Labels at angular momentum `L`, `ν` slow and `(v, α)` fast.
pub fn lbs_xspace(nu_min: i32, nu_max: i32, v_min: i32, v_max: i32, l: i32)
                  -> Vec<XLabel> {
    let sph = lbs_so5r3(v_min, v_max, l);
    let mut labels = Vec::with_capacity(sph.len() * ((nu_max - nu_min + 1)
                                                      .max(0) as usize));
    for nu in nu_min ..= nu_max {
        labels.extend(sph.iter().map(|&s| XLabel { nu, sph: s }));
    }
    labels
}

pub fn dim_xspace(nu_min: i32, nu_max: i32, v_min: i32, v_max: i32, l: i32)
                  -> usize {
    lbs_xspace(nu_min, nu_max, v_min, v_max, l).len()
}

/// Product space with a fixed radial family and spherical truncation.
#[derive(Clone, Copy, Debug)]
pub struct XSpace<'a> {
    store: &'a So5CgStore,
    basis_type: BasisType,
    a: f64,
    lambda: f64,
    radial: RadialSpace,
    v_min: i32,
    v_max: i32,
}

impl<'a> XSpace<'a> {
    pub fn new(
        store: &'a So5CgStore,
        basis_type: BasisType,
        a: f64,
        lambda: f64,
        nu_min: i32,
        nu_max: i32,
        v_min: i32,
        v_max: i32,
    ) -> Result<Self> {
        Ok(Self {
            store,
            basis_type,
            a: require_positive("a", a)?,
            lambda: require_positive("lambda", lambda)?,
            radial: RadialSpace::new(nu_min, nu_max)?,
            v_min: require_nonnegint("v_min", v_min)?,
            v_max: require_nonnegint("v_max", v_max)?,
        })
    }

    pub fn from_truncation(
        store: &'a So5CgStore,
        basis_type: BasisType,
        a: f64,
        lambda: f64,
        trunc: &Truncation,
    ) -> Result<Self> {
        Self::new(store, basis_type, a, lambda, trunc.nu_min, trunc.nu_max,
                  trunc.v_min, trunc.v_max)
    }

    pub fn labels(&self, l: i32) -> Vec<XLabel> {
        lbs_xspace(self.radial.nu_min, self.radial.nu_max,
                   self.v_min, self.v_max, l)
    }

    pub fn dim(&self, l: i32) -> usize {
        self.radial.dim() * lbs_so5r3(self.v_min, self.v_max, l).len()
    }

    fn lambda_shift(&self, v: i32) -> i32 {
        self.basis_type.lambda_shift(v, self.v_min)
    }

    /// Accumulates `Σ c R ⊗ S` between `rows` and `cols`, where `sph`
    /// supplies each term's spherical matrix together with its row and
    /// column labels.
    fn assemble<F>(&self, op: &OperatorSum, rows: &[XLabel], cols: &[XLabel],
                   mut sph: F) -> Result<DMatrix<f64>>
        where F: FnMut(&[SphOp]) -> Result<(Vec<SphLabel>, Vec<SphLabel>,
                                            DMatrix<f64>)>
    {
        let mut out = DMatrix::zeros(rows.len(), cols.len());
        if rows.is_empty() || cols.is_empty() {
            return Ok(out);
        }
        let nu_min = self.radial.nu_min;
        for term in op {
            let (sph_rows, sph_cols, s) = sph(&term.spherical)?;
            let index = |labels: &[SphLabel]| -> FnvHashMap<SphLabel, usize> {
                labels.iter().enumerate().map(|(k, &x)| (x, k)).collect()
            };
            let (ri, ci) = (index(&sph_rows), index(&sph_cols));
            let row_sph: Vec<usize> = rows.iter().map(|x| ri[&x.sph]).collect();
            let col_sph: Vec<usize> = cols.iter().map(|x| ci[&x.sph]).collect();
            let mut radial: FnvHashMap<(i32, i32), DMatrix<f64>> =
                Default::default();
            for (c, xi) in cols.iter().enumerate() {
                for (r, xf) in rows.iter().enumerate() {
                    let sv = s[(row_sph[r], col_sph[c])];
                    if sv == 0.0 {
                        continue;
                    }
                    let key = (self.lambda_shift(xf.sph.v),
                               self.lambda_shift(xi.sph.v));
                    if !radial.contains_key(&key) {
                        let m = rep_radial_prod(&term.radial, self.a,
                                                self.lambda, key.0, key.1,
                                                &self.radial)?;
                        radial.insert(key, m);
                    }
                    let rv = radial[&key][((xf.nu - nu_min) as usize,
                                           (xi.nu - nu_min) as usize)];
                    out[(r, c)] += term.coeff * rv * sv;
                }
            }
        }
        check_finite("product-space matrix", &out)?;
        Ok(out)
    }

    fn require_scalar(&self, op: &OperatorSum) -> Result<()> {
        for term in op {
            require_scalar(&term.spherical)?;
        }
        Ok(())
    }

    /// Matrix of `op` on the block of angular momentum `L`.
    pub fn rep(&self, op: &OperatorSum, l: i32) -> Result<DMatrix<f64>> {
        require_nonnegint("L", l)?;
        self.require_scalar(op)?;
        let labels = self.labels(l);
        let sph_labels = lbs_so5r3(self.v_min, self.v_max, l);
        self.assemble(op, &labels, &labels, |ops| {
            let m = rep_so5r3_prod(self.store, ops, self.v_min, self.v_max, l)?;
            Ok((sph_labels.clone(), sph_labels.clone(), m))
        })
    }

    /// SO(3)-reduced (Rose convention) matrix of `op` from `L_i` to `L_f`.
    pub fn rep_between(&self, op: &OperatorSum, l_f: i32, l_i: i32)
                       -> Result<DMatrix<f64>> {
        require_nonnegint("L_f", l_f)?;
        require_nonnegint("L_i", l_i)?;
        let rows = self.labels(l_f);
        let cols = self.labels(l_i);
        let sph_rows = lbs_so5r3(self.v_min, self.v_max, l_f);
        let sph_cols = lbs_so5r3(self.v_min, self.v_max, l_i);
        self.assemble(op, &rows, &cols, |ops| {
            let m = rep_so5r3_reduced(self.store, ops, self.v_min, self.v_max,
                                      l_f, l_i)?;
            Ok((sph_rows.clone(), sph_cols.clone(), m))
        })
    }

    /// Labels of all blocks `L_min ..= L_max`, `L` outermost.
    pub fn labels_full(&self, l_min: i32, l_max: i32) -> Vec<XLabel> {
        (l_min ..= l_max).flat_map(|l| self.labels(l)).collect()
    }

    /// Matrix of `op` over all angular momenta `L_min ..= L_max` at once,
    /// indexed by [`labels_full`](#method.labels_full).
    pub fn rep_full(&self, op: &OperatorSum, l_min: i32, l_max: i32)
                    -> Result<DMatrix<f64>> {
        let (l_min, l_max) = require_nonnegint_range("L", l_min, l_max)?;
        self.require_scalar(op)?;
        let labels = self.labels_full(l_min, l_max);
        let sph_labels = lbs_so5r3_rng(self.v_min, self.v_max, l_min, l_max);
        self.assemble(op, &labels, &labels, |ops| {
            let m = rep_so5r3_prod_rem(self.store, ops, self.v_min,
                                       self.v_max, l_min, l_max)?;
            Ok((sph_labels.clone(), sph_labels.clone(), m))
        })
    }
}

/// Matrix of `op` on the product space at angular momentum `L`.
pub fn rep_xspace(
    store: &So5CgStore,
    basis_type: BasisType,
    op: &OperatorSum,
    a: f64,
    lambda: f64,
    nu_min: i32,
    nu_max: i32,
    v_min: i32,
    v_max: i32,
    l: i32,
) -> Result<DMatrix<f64>> {
    XSpace::new(store, basis_type, a, lambda, nu_min, nu_max, v_min, v_max)?
        .rep(op, l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::error::ErrorKind;

    #[test]
    fn test_labels() {
        let labels = lbs_xspace(0, 1, 0, 3, 0);
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], XLabel { nu: 0, sph: SphLabel { v: 0, alpha: 1, l: 0 } });
        assert_eq!(labels[1], XLabel { nu: 0, sph: SphLabel { v: 3, alpha: 1, l: 0 } });
        assert_eq!(labels[2].nu, 1);
        assert_eq!(dim_xspace(0, 4, 0, 2, 2), 10);
        assert_eq!(dim_xspace(2, 1, 0, 2, 2), 0);
        assert_eq!(dim_xspace(0, 4, 0, 2, 1), 0);
    }

    #[test]
    fn test_truncation() {
        let t = Truncation {
            nu_min: 0, nu_max: 3, v_min: 0, v_max: 3, l_min: 2, l_max: 0,
        };
        assert_eq!(t.validate().unwrap_err().kind(), ErrorKind::Value);
        let t = Truncation { l_min: 0, l_max: 2, .. t };
        t.validate().unwrap();
        assert_eq!(t.ls().collect::<Vec<_>>(), vec![0, 1, 2]);
        let store = So5CgStore::new("no/such/dir");
        assert_eq!(XSpace::from_truncation(&store, BasisType::Fixed, 0.0, 2.5,
                                           &t).unwrap_err().kind(),
                   ErrorKind::Value);
    }
}
