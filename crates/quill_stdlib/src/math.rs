//! Integer math natives.

/// `min(a, ...)`: smallest argument, 0 with none.
#[must_use]
pub fn min(args: &[i64]) -> i64 {
    args.iter().copied().min().unwrap_or(0)
}

/// `max(a, ...)`: largest argument, 0 with none.
#[must_use]
pub fn max(args: &[i64]) -> i64 {
    args.iter().copied().max().unwrap_or(0)
}

/// `abs(a)`: absolute value of the first argument, wrapping at `i64::MIN`.
#[must_use]
pub fn abs(args: &[i64]) -> i64 {
    args.first().map_or(0, |a| a.wrapping_abs())
}
