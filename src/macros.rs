/// Check whether two `f64` numbers are equal within the given
/// [`Toler`](utils/struct.Toler.html).
///
/// ```
/// #[macro_use]
/// extern crate acm;
///
/// use acm::utils::Toler;
///
/// fn main() {
///     toler_assert_eq!(Toler { abserr: 1e-2, relerr: 1e-3 }, 10.0, 10.02);
/// }
/// ```
#[macro_export]
macro_rules! toler_assert_eq {
    ($toler:expr, $left:expr, $right:expr) => {
        let toler = &$toler;
        let left = $left;
        let right = $right;
        assert!(toler.is_eq(left, right),
                "{} does not equal to {} within {:?}",
                left, right, toler)
    }
}

/// Check whether two `nalgebra` matrices have the same shape and agree
/// elementwise within the given [`Toler`](utils/struct.Toler.html).
#[macro_export]
macro_rules! toler_assert_mat_eq {
    ($toler:expr, $left:expr, $right:expr) => {
        let toler = &$toler;
        let left = &$left;
        let right = &$right;
        assert_eq!(left.shape(), right.shape(), "matrix shapes differ");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            assert!(toler.is_eq(*l, *r),
                    "entry {} (column-major): {} does not equal to {} \
                     within {:?}\nleft = {}\nright = {}",
                    i, l, r, toler, left, right)
        }
    }
}

/// Declare a regular expression (`Regex`) cached via `lazy_static!`.
/// This macro is mainly for internal use.
#[macro_export]
macro_rules! re {
    ($e:expr) => {
        {
            lazy_static! {
                static ref REGEX: ::regex::Regex =
                    ::regex::Regex::new($e).unwrap();
            }
            &*REGEX
        }
    }
}
