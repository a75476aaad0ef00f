//! Linear algebra.
use std::f64;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use super::error::{Error, Result};

/// Eigenvalues in ascending order with the matching eigenvectors stored as
/// columns.
#[derive(Clone, Debug)]
pub struct Eigen {
    pub values: Vec<f64>,
    pub vectors: DMatrix<f64>,
}

/// Fails if any entry is NaN or infinite.
pub fn check_finite(what: &str, m: &DMatrix<f64>) -> Result<()> {
    if let Some(i) = m.iter().position(|x| !x.is_finite()) {
        return Err(Error::numeric(format!(
            "{} has a non-finite entry at ({}, {})",
            what, i % m.nrows(), i / m.nrows())));
    }
    Ok(())
}

/// Flips the sign of `v` so that its component of largest magnitude is
/// positive.
pub fn fix_sign(v: &mut DVector<f64>) {
    let mut best: f64 = 0.0;
    for &x in v.iter() {
        if x.abs() > best.abs() {
            best = x;
        }
    }
    if best < 0.0 {
        v.neg_mut();
    }
}

/// Diagonalizes a real symmetric matrix.  Only the lower triangle is read.
pub fn sym_eigen(m: &DMatrix<f64>) -> Result<Eigen> {
    if !m.is_square() {
        return Err(Error::numeric(format!(
            "cannot diagonalize a {}×{} matrix", m.nrows(), m.ncols())));
    }
    check_finite("matrix", m)?;
    let n = m.nrows();
    if n == 0 {
        return Ok(Eigen { values: Vec::new(), vectors: DMatrix::zeros(0, 0) });
    }
    let eig = SymmetricEigen::try_new(m.clone(), f64::EPSILON, 0)
        .ok_or_else(|| Error::numeric(format!(
            "symmetric eigensolver did not converge ({}×{})", n, n)))?;
    let mut order: Vec<usize> = (0 .. n).collect();
    order.sort_by(|&i, &j| {
        eig.eigenvalues[i].partial_cmp(&eig.eigenvalues[j])
            .unwrap_or(::std::cmp::Ordering::Equal)
    });
    let values: Vec<f64> = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let mut vectors = DMatrix::zeros(n, n);
    for (k, &i) in order.iter().enumerate() {
        let mut v = eig.eigenvectors.column(i).into_owned();
        fix_sign(&mut v);
        vectors.set_column(k, &v);
    }
    if values.iter().any(|x| !x.is_finite()) {
        return Err(Error::numeric("eigensolver produced non-finite values"));
    }
    Ok(Eigen { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::error::ErrorKind;
    use super::super::utils::Toler;

    const TOLER: Toler = Toler { relerr: 1e-12, abserr: 1e-12 };

    #[test]
    fn test_sym_eigen() {
        let s = 2.5f64.sqrt();
        let m = DMatrix::from_row_slice(2, 2, &[-2.5, s, s, -4.5]);
        let e = sym_eigen(&m).unwrap();
        assert!(e.values[0] <= e.values[1]);
        // trace and determinant are preserved
        toler_assert_eq!(TOLER, e.values[0] + e.values[1], -7.0);
        toler_assert_eq!(TOLER, e.values[0] * e.values[1], 11.25 - 2.5);
        for k in 0 .. 2 {
            let v = e.vectors.column(k);
            toler_assert_eq!(TOLER, v.norm(), 1.0);
            let r = &m * v - v * e.values[k];
            toler_assert_eq!(TOLER, r.norm(), 0.0);
            assert!(v.iter().cloned().fold(0.0, |a: f64, x| {
                if x.abs() > a.abs() { x } else { a }
            }) > 0.0);
        }
        assert_eq!(sym_eigen(&DMatrix::zeros(0, 0)).unwrap().values.len(), 0);
    }

    #[test]
    fn test_errors() {
        let m = DMatrix::from_row_slice(1, 1, &[f64::NAN]);
        assert_eq!(sym_eigen(&m).unwrap_err().kind(), ErrorKind::Numeric);
        let m = DMatrix::<f64>::zeros(2, 3);
        assert_eq!(sym_eigen(&m).unwrap_err().kind(), ErrorKind::Numeric);
    }

    #[test]
    fn test_fix_sign() {
        let mut v = DVector::from_vec(vec![0.3, -0.9, 0.1]);
        fix_sign(&mut v);
        assert_eq!(v[1], 0.9);
        assert_eq!(v[0], -0.3);
        let mut v = DVector::from_vec(vec![-0.5, 0.2]);
        fix_sign(&mut v);
        assert_eq!(v.as_slice(), &[0.5, -0.2]);
    }
}
