//! Special functions and exact combinatorics.
use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};
use num::rational::Ratio;
use super::error::{Error, Result};

/// `n!` as a big integer.
pub fn factorial(n: u32) -> BigInt {
    let mut r = BigInt::one();
    for k in 2 ..= n {
        r *= BigInt::from(k);
    }
    r
}

/// Rising factorial (Pochhammer symbol) `(x)_n = x (x + 1) … (x + n − 1)`.
pub fn rising(x: &BigRational, n: u32) -> BigRational {
    let mut r = BigRational::one();
    let mut y = x.clone();
    for _ in 0 .. n {
        r = r * &y;
        y = y + BigRational::one();
    }
    r
}

pub fn ratio_from_int(n: i64) -> BigRational {
    Ratio::from_integer(BigInt::from(n))
}

/// Exact rational value of a finite `f64`.
pub fn ratio_from_f64(name: &str, x: f64) -> Result<BigRational> {
    Ratio::from_float(x)
        .ok_or_else(|| Error::value(name, x, "must be finite"))
}

/// Nearest `f64` of a big rational.  Unlike a naive conversion of the
/// numerator and denominator, this does not overflow for large operands.
pub fn ratio_to_f64(r: &BigRational) -> f64 {
    if r.is_zero() {
        return 0.0;
    }
    let numer = r.numer();
    let denom = r.denom();
    // shift so that the integer quotient carries ~64 significant bits
    let shift = 64 + denom.bits() as i64 - numer.bits() as i64;
    let q = if shift >= 0 {
        (numer << shift as usize) / denom
    } else {
        numer / (denom << (-shift) as usize)
    };
    let q = q.to_f64().unwrap_or(::std::f64::NAN);
    q * 2f64.powi(-shift as i32)
}

/// `sign(s) √|q|` where the value is represented as `(s, q)`.
pub fn signed_sqrt(sign: i32, sq: &BigRational) -> f64 {
    let x = ratio_to_f64(&sq.abs()).sqrt();
    if sign < 0 { -x } else { x }
}

/// Natural logarithm of the gamma function for `x > 0` (Lanczos
/// approximation, g = 7, n = 9).
pub fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        // reflection formula
        let pi = ::std::f64::consts::PI;
        return (pi / (pi * x).sin()).abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut a = COEFFS[0];
    let t = x + G + 0.5;
    for (i, &c) in COEFFS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * ::std::f64::consts::PI).ln()
        + (x + 0.5) * t.ln() - t + a.ln()
}

/// Coefficients (ascending powers) of the normalized Gegenbauer
/// polynomial `C^{3/2}_v(t) / C^{3/2}_v(1)`, the zonal function of
/// seniority `v` on the 4-sphere.
pub fn zonal_poly(v: u32) -> Vec<BigRational> {
    // n C_n = (2n + 1) t C_{n−1} − (n + 1) C_{n−2}
    let mut prev: Vec<BigRational> = vec![BigRational::one()];
    let mut cur: Vec<BigRational> = vec![BigRational::zero(),
                                         ratio_from_int(3)];
    if v == 0 {
        return prev;
    }
    for n in 2 ..= v as i64 {
        let mut next = vec![BigRational::zero(); n as usize + 1];
        let f1 = Ratio::new(BigInt::from(2 * n + 1), BigInt::from(n));
        let f2 = Ratio::new(BigInt::from(n + 1), BigInt::from(n));
        for (i, c) in cur.iter().enumerate() {
            next[i + 1] = &next[i + 1] + &f1 * c;
        }
        for (i, c) in prev.iter().enumerate() {
            next[i] = &next[i] - &f2 * c;
        }
        prev = cur;
        cur = next;
    }
    let at_one = cur.iter().fold(BigRational::zero(), |s, c| s + c);
    cur.into_iter().map(|c| c / &at_one).collect()
}

/// Exact average `(3/4) ∫_{−1}^{1} P_{v1} P_{v2} P_{v3} (1 − t²) dt` of
/// three zonal functions.
pub fn zonal_triple_avg(v1: u32, v2: u32, v3: u32) -> BigRational {
    fn mul(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
        let mut r = vec![BigRational::zero(); a.len() + b.len() - 1];
        for (i, x) in a.iter().enumerate() {
            if x.is_zero() {
                continue;
            }
            for (j, y) in b.iter().enumerate() {
                r[i + j] = &r[i + j] + x * y;
            }
        }
        r
    }
    let weight = [BigRational::one(), BigRational::zero(),
                  -BigRational::one()];
    let p = mul(&mul(&zonal_poly(v1), &zonal_poly(v2)),
                &mul(&zonal_poly(v3), &weight));
    let mut s = BigRational::zero();
    for (k, c) in p.iter().enumerate() {
        if k % 2 == 0 {
            s = s + c * Ratio::new(BigInt::from(2), BigInt::from(k + 1));
        }
    }
    s * Ratio::new(BigInt::from(3), BigInt::from(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::utils::Toler;

    const TOLER: Toler = Toler { relerr: 1e-13, abserr: 1e-13 };

    #[test]
    fn test_ln_gamma() {
        toler_assert_eq!(TOLER, ln_gamma(1.0), 0.0);
        toler_assert_eq!(TOLER, ln_gamma(2.0), 0.0);
        toler_assert_eq!(TOLER, ln_gamma(5.0), 24f64.ln());
        toler_assert_eq!(TOLER, ln_gamma(0.5),
                         ::std::f64::consts::PI.sqrt().ln());
        toler_assert_eq!(TOLER, ln_gamma(3.5),
                         (15.0 / 8.0 * ::std::f64::consts::PI.sqrt()).ln());
        toler_assert_eq!(TOLER, ln_gamma(0.25), 1.2880225246980774);
    }

    #[test]
    fn test_ratio_to_f64() {
        let r = Ratio::new(BigInt::from(1), BigInt::from(3));
        assert_eq!(ratio_to_f64(&r), 1.0 / 3.0);
        assert_eq!(ratio_to_f64(&ratio_from_int(-7)), -7.0);
        let big = Ratio::new(factorial(40), factorial(38));
        assert_eq!(ratio_to_f64(&big), 1560.0);
        let x = ratio_from_f64("x", 2.5).unwrap();
        assert_eq!(ratio_to_f64(&x), 2.5);
        assert!(ratio_from_f64("x", ::std::f64::INFINITY).is_err());
    }

    #[test]
    fn test_rising() {
        let half = Ratio::new(BigInt::from(1), BigInt::from(2));
        // (1/2)_3 = 1/2 · 3/2 · 5/2
        assert_eq!(rising(&half, 3),
                   Ratio::new(BigInt::from(15), BigInt::from(8)));
        assert_eq!(rising(&half, 0), BigRational::one());
        assert_eq!(factorial(5), BigInt::from(120));
    }

    #[test]
    fn test_zonal() {
        // C^{3/2}_2(t) = (15 t² − 3)/2, value 6 at t = 1
        let p = zonal_poly(2);
        assert_eq!(p[0], Ratio::new(BigInt::from(-1), BigInt::from(4)));
        assert_eq!(p[2], Ratio::new(BigInt::from(5), BigInt::from(4)));
        assert_eq!(zonal_triple_avg(0, 0, 0), BigRational::one());
        // ⟨P_v P_v⟩ = 1 / d_v with d_1 = 5, d_3 = 30
        assert_eq!(zonal_triple_avg(1, 1, 0),
                   Ratio::new(BigInt::from(1), BigInt::from(5)));
        assert_eq!(zonal_triple_avg(3, 0, 3),
                   Ratio::new(BigInt::from(1), BigInt::from(30)));
        assert!(zonal_triple_avg(1, 1, 1).is_zero());
    }
}
