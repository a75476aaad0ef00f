//! Validated integer and integer-range predicates.
//!
//! Every guard accepts either an integer or an `f64` (as read from a job
//! file or the command line).  A value that is not integral fails with a
//! [`Type`](../error/enum.Error.html) error; an integral value outside the
//! permitted range fails with a `Value` error.  On success the validated
//! integer is returned.
use std::fmt::Display;
use conv::ValueFrom;
use super::error::{Error, Result};

/// A number that may or may not hold an integer.
pub trait Quantity: Copy + Display {
    fn as_integer(self) -> Option<i64>;
}

macro_rules! impl_quantity_int {
    ($($t:ty),*) => {
        $(
            impl Quantity for $t {
                #[inline]
                fn as_integer(self) -> Option<i64> {
                    Some(self as i64)
                }
            }
        )*
    }
}

impl_quantity_int!(i8, i16, i32, i64, u8, u16, u32);

impl Quantity for usize {
    fn as_integer(self) -> Option<i64> {
        if self as u64 > i64::max_value() as u64 {
            None
        } else {
            Some(self as i64)
        }
    }
}

impl Quantity for f64 {
    fn as_integer(self) -> Option<i64> {
        if self.is_finite() && self.fract() == 0.0
            && self.abs() <= (1u64 << 53) as f64
        {
            Some(self as i64)
        } else {
            None
        }
    }
}

pub fn require_int<T: Quantity>(name: &str, v: T) -> Result<i64> {
    v.as_integer().ok_or_else(|| Error::Type {
        name: name.to_owned(),
        value: v.to_string(),
    })
}

pub fn require_nonnegint<T: Quantity>(name: &str, v: T) -> Result<i32> {
    let n = require_int(name, v)?;
    if n < 0 {
        return Err(Error::value(name, v, "must be non-negative"));
    }
    i32::value_from(n).map_err(|_| Error::value(name, v, "too large"))
}

pub fn require_posint<T: Quantity>(name: &str, v: T) -> Result<i32> {
    let n = require_nonnegint(name, v)?;
    if n == 0 {
        return Err(Error::value(name, v, "must be positive"));
    }
    Ok(n)
}

/// Validates `lo ..= hi` as a non-empty range of non-negative integers.
pub fn require_nonnegint_range<T: Quantity>(
    name: &str,
    lo: T,
    hi: T,
) -> Result<(i32, i32)> {
    let lo_n = require_nonnegint(name, lo)?;
    let hi_n = require_nonnegint(name, hi)?;
    if lo_n > hi_n {
        return Err(Error::value(name, format!("{} ..= {}", lo, hi),
                                "range is inverted"));
    }
    Ok((lo_n, hi_n))
}

/// Validates a positive real parameter such as `λ` or `a`.
pub fn require_positive(name: &str, v: f64) -> Result<f64> {
    if !(v > 0.0) || !v.is_finite() {
        return Err(Error::value(name, v, "must be positive and finite"));
    }
    Ok(v)
}
