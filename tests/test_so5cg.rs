#[macro_use]
extern crate acm;

use acm::error::{Error, ErrorKind};
use acm::so5cg::{So5CgKey, So5CgStore};
use acm::spherical::{rep_so5r3_prod_rem, rep_so5r3_reduced, SPHARM_112,
                     SPHARM_310};
use acm::utils::Toler;

const TOLER: Toler = Toler { relerr: 1e-8, abserr: 1e-8 };

fn key(v1: i32, l1: i32, v2: i32, l2: i32, v3: i32, l3: i32) -> So5CgKey {
    So5CgKey {
        v1, a1: 1, l1,
        v2, a2: 1, l2,
        v3, a3: 1, l3,
    }
}

#[test]
fn test_reads_are_repeatable() {
    let store = So5CgStore::new("data/so5cg-test");
    let k = key(3, 0, 3, 0, 0, 0);
    let x = store.get(&k).unwrap();
    toler_assert_eq!(TOLER, x, 0.182574185835055);
    assert_eq!(store.get(&k).unwrap(), x);
    assert_eq!(store.loaded_files(), 1);
    toler_assert_eq!(TOLER, store.get(&key(2, 4, 1, 2, 1, 2)).unwrap(),
                     0.801783725737274);
    toler_assert_eq!(TOLER, store.get(&key(2, 2, 1, 2, 3, 3)).unwrap(),
                     -0.845154254728517);
    // no file at all
    assert_eq!(store.get(&key(5, 5, 1, 2, 6, 6)).unwrap(), 0.0);
    // forbidden by the SO(5) triangle, decided without the disk
    let before = store.loaded_files();
    assert_eq!(store.get(&key(0, 0, 1, 2, 3, 3)).unwrap(), 0.0);
    assert_eq!(store.loaded_files(), before);
}

#[test]
fn test_compressed_file() {
    let store = So5CgStore::new("data/so5cg-gz");
    assert_eq!(store.get(&key(1, 2, 1, 2, 2, 2)).unwrap(), 1.0);
    assert_eq!(store.get(&key(1, 2, 1, 2, 2, 4)).unwrap(), 1.0);
}

#[test]
fn test_malformed_file() {
    let store = So5CgStore::new("data/so5cg-bad");
    match store.get(&key(0, 0, 1, 2, 1, 2)) {
        Err(Error::Parse { path, line, .. }) => {
            assert_eq!(line, 3);
            assert!(path.ends_with("v2=1/SO5CG_0_1-1-2_1"));
        }
        r => panic!("expected a parse error, got {:?}", r),
    }
    assert_eq!(store.get(&key(0, 0, 1, 2, 1, 2)).unwrap_err().kind(),
               ErrorKind::Data);
}

#[test]
fn test_invalid_labels() {
    let store = So5CgStore::new("data/so5cg-test");
    assert_eq!(store.get(&key(-1, 0, 1, 2, 1, 2)).unwrap_err().kind(),
               ErrorKind::Value);
    // L = 1 never occurs at seniority 1
    assert_eq!(store.get(&key(0, 0, 1, 1, 1, 2)).unwrap_err().kind(),
               ErrorKind::Value);
    let mut k = key(0, 0, 1, 2, 1, 2);
    k.a3 = 0;
    assert_eq!(store.get(&k).unwrap_err().kind(), ErrorKind::Value);
}

#[test]
fn test_cos3gamma_block() {
    let store = So5CgStore::new("data/so5cg-test");
    let m = rep_so5r3_prod_rem(&store, &[SPHARM_310], 0, 5, 0, 0).unwrap();
    assert_eq!(m.shape(), (2, 2));
    toler_assert_eq!(TOLER, m[(0, 0)], 0.0);
    toler_assert_eq!(TOLER, m[(0, 1)], 3f64.sqrt());
    toler_assert_eq!(TOLER, m[(1, 0)], 3f64.sqrt());
    toler_assert_eq!(TOLER, m[(1, 1)], 0.0);
}

#[test]
fn test_reduced_quadrupole() {
    let store = So5CgStore::new("data/so5cg-test");
    // ⟨v = 1, L = 2‖SpHarm_112‖v = 0, L = 0⟩ = √(5/3)
    let m = rep_so5r3_reduced(&store, &[SPHARM_112], 0, 2, 2, 0).unwrap();
    assert_eq!(m.shape(), (2, 1));
    toler_assert_eq!(TOLER, m[(0, 0)], (5.0f64 / 3.0).sqrt());
    toler_assert_eq!(TOLER, m[(1, 0)], 0.0);
    // and backwards, carrying the ratio of SO(5) dimensions
    let m = rep_so5r3_reduced(&store, &[SPHARM_112], 0, 2, 0, 2).unwrap();
    toler_assert_eq!(TOLER, m[(0, 0)], (25.0f64 / 3.0).sqrt());
}
