/// Tolerance for comparing floating-point numbers.  Two numbers are
/// considered equal if they agree within *either* the absolute or the
/// relative error.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Toler {
    pub relerr: f64,
    pub abserr: f64,
}

/// `{ relerr: 1e-10, abserr: 1e-10 }`
impl Default for Toler {
    fn default() -> Self {
        Self {
            relerr: 1e-10,
            abserr: 1e-10,
        }
    }
}

impl Toler {
    pub fn is_eq(&self, left: f64, right: f64) -> bool {
        (left - right).abs()
            <= self.abserr + self.relerr * f64::max(left.abs(), right.abs())
    }
}

/// Euclidean norm of a two-component vector, `√(x² + y²)`.
#[inline]
pub fn norm(x: f64, y: f64) -> f64 {
    x.hypot(y)
}

/// Whether `a`, `b`, `c` satisfy the triangle inequality.
#[inline]
pub fn triangle(a: i32, b: i32, c: i32) -> bool {
    (a - b).abs() <= c && c <= a + b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        assert_eq!(norm(0.0, 0.0), 0.0);
        assert_eq!(norm(1.0, 0.0), 1.0);
        assert_eq!(norm(3.0, 4.0), 5.0);
        assert_eq!(norm(1.0, 2.0), norm(2.0, 1.0));
    }

    #[test]
    fn test_toler() {
        let t = Toler { relerr: 1e-3, abserr: 1e-2 };
        assert!(t.is_eq(10.0, 10.009));
        assert!(t.is_eq(1e6, 1e6 + 10.0));
        assert!(!t.is_eq(1.0, 1.1));
        // the two bounds add up
        toler_assert_eq!(t, 10.0, 10.02);
        assert!(!t.is_eq(10.0, 10.021));
    }

    #[test]
    fn test_triangle() {
        assert!(triangle(2, 2, 0));
        assert!(triangle(2, 2, 4));
        assert!(!triangle(2, 2, 5));
        assert!(!triangle(0, 3, 2));
    }
}
