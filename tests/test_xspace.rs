#[macro_use]
extern crate acm;
extern crate nalgebra;

use nalgebra::DMatrix;
use acm::error::ErrorKind;
use acm::op_sum::{acm_hamiltonian, quadrupole, OperatorSum, Term};
use acm::radial::{RadialOp, RadialSpace};
use acm::so5cg::So5CgStore;
use acm::spherical::{rep_so5r3_prod, BasisType, SphOp, SPHARM_112,
                     SPHARM_310};
use acm::utils::Toler;
use acm::xspace::{rep_xspace, XSpace};

const TOLER: Toler = Toler { relerr: 1e-10, abserr: 1e-10 };

fn store() -> So5CgStore {
    So5CgStore::new("data/so5cg-test")
}

#[test]
fn test_beta_squared_only() {
    let h = acm_hamiltonian([1.0, 0.0, 0.0, 0.0, 0.0,
                             0.0, 0.0, 0.0, 0.0, 0.0]);
    let (a, lambda) = (2.0, 2.5);
    let m = rep_xspace(&store(), BasisType::Fixed, &h, a, lambda,
                       0, 1, 0, 0, 0).unwrap();
    let s = lambda.sqrt() / (a * a);
    let expected = DMatrix::from_row_slice(2, 2, &[
        lambda / (a * a), s,
        s, (lambda + 2.0) / (a * a),
    ]);
    toler_assert_mat_eq!(TOLER, m, expected);
}

#[test]
fn test_linearity() {
    let store = store();
    let (a, lambda) = (1.3, 3.5);
    let (c1, c2) = (0.7, -1.9);
    let mut op = OperatorSum::new();
    op.push(Term::new(c1, vec![RadialOp::B], vec![SPHARM_310]));
    op.push(Term::new(c2, vec![RadialOp::B2], vec![SphOp::Lambda]));
    let m = rep_xspace(&store, BasisType::Fixed, &op, a, lambda,
                       0, 2, 0, 3, 0).unwrap();

    let space = RadialSpace::new(0, 2).unwrap();
    let r1 = RadialOp::B.rep(a, lambda, lambda, &space).unwrap();
    let r2 = RadialOp::B2.rep(a, lambda, lambda, &space).unwrap();
    let s1 = rep_so5r3_prod(&store, &[SPHARM_310], 0, 3, 0).unwrap();
    let s2 = rep_so5r3_prod(&store, &[SphOp::Lambda], 0, 3, 0).unwrap();
    let expected = r1.kronecker(&s1) * c1 + r2.kronecker(&s2) * c2;
    toler_assert_mat_eq!(TOLER, m, expected);
}

#[test]
fn test_full_matrix_is_direct_sum() {
    let store = store();
    let h = acm_hamiltonian([1.0, 0.5, 0.1, 0.2, 0.3,
                             0.4, 0.5, 0.6, 0.7, 0.8]);
    for &basis_type in &[BasisType::Fixed, BasisType::Seniority] {
        let space = XSpace::new(&store, basis_type, 1.0, 2.5,
                                0, 2, 0, 3).unwrap();
        let full = space.rep_full(&h, 0, 3).unwrap();
        let n = space.labels_full(0, 3).len();
        assert_eq!(full.shape(), (n, n));
        let mut expected = DMatrix::zeros(n, n);
        let mut offset = 0;
        for l in 0 ..= 3 {
            let block = space.rep(&h, l).unwrap();
            let d = block.nrows();
            assert_eq!(d, space.dim(l));
            expected.view_mut((offset, offset), (d, d)).copy_from(&block);
            offset += d;
        }
        assert_eq!(offset, n);
        toler_assert_mat_eq!(TOLER, full, expected);
    }
}

#[test]
fn test_hamiltonian_is_symmetric() {
    let store = store();
    let h = acm_hamiltonian([1.0, 1.0, 0.5, 0.0, 1.5,
                             0.5, 0.0, 0.25, 1.0, 0.0]);
    for &basis_type in &[BasisType::Fixed, BasisType::Parity] {
        let space = XSpace::new(&store, basis_type, 1.0, 2.5,
                                0, 3, 0, 5).unwrap();
        for l in 0 ..= 4 {
            let m = space.rep(&h, l).unwrap();
            toler_assert_mat_eq!(Toler { relerr: 1e-8, abserr: 1e-8 },
                                 m, m.transpose());
        }
    }
}

#[test]
fn test_empty_blocks() {
    let store = store();
    let h = acm_hamiltonian([1.0; 10]);
    let space = XSpace::new(&store, BasisType::Fixed, 1.0, 2.5,
                            0, 2, 0, 5).unwrap();
    // L = 1 occurs at no seniority
    assert_eq!(space.rep(&h, 1).unwrap().shape(), (0, 0));
    let space = XSpace::new(&store, BasisType::Fixed, 1.0, 2.5,
                            3, 2, 0, 5).unwrap();
    assert_eq!(space.rep(&h, 0).unwrap().shape(), (0, 0));
}

#[test]
fn test_blocks_need_scalar_operators() {
    let store = store();
    let mut op = OperatorSum::new();
    op.push(Term::new(1.0, vec![RadialOp::B2], vec![SPHARM_112]));
    let err = rep_xspace(&store, BasisType::Fixed, &op, 1.0, 2.5,
                         0, 0, 0, 3, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    // rejected even where the block itself is empty
    let space = XSpace::new(&store, BasisType::Fixed, 1.0, 2.5,
                            0, 0, 0, 3).unwrap();
    assert_eq!(space.rep(&op, 1).unwrap_err().kind(), ErrorKind::Value);
    assert_eq!(space.rep_full(&op, 0, 3).unwrap_err().kind(),
               ErrorKind::Value);
    // a scalar part does not excuse a tensor factor in the same sum
    let mixed = acm_hamiltonian([1.0; 10]) + quadrupole();
    assert_eq!(space.rep(&mixed, 0).unwrap_err().kind(), ErrorKind::Value);
    // the reduced matrix between blocks still accepts it
    assert_eq!(space.rep_between(&quadrupole(), 2, 0).unwrap().shape(),
               (2, 2));
}
