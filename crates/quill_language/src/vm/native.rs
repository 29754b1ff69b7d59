//! Native callbacks and the integer helpers behind the VM's opcodes.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use quill_foundation::{Error, Result};

/// A host function callable from scripts.
///
/// Natives receive the call's arguments in source order and return one
/// value. They run inline on the VM's thread.
pub trait Native {
    /// Invokes the native.
    fn call(&mut self, args: &[i64]) -> i64;
}

impl<F> Native for F
where
    F: FnMut(&[i64]) -> i64,
{
    fn call(&mut self, args: &[i64]) -> i64 {
        self(args)
    }
}

// =============================================================================
// Arithmetic and Comparison Helpers
// =============================================================================

/// Converts a boolean to the VM's 0/1 truth value.
pub(crate) fn truth(b: bool) -> i64 {
    i64::from(b)
}

/// Divides, truncating toward zero.
pub(crate) fn div_values(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(Error::division_by_zero());
    }
    Ok(a.wrapping_div(b))
}

/// Remainder with the sign of the dividend.
pub(crate) fn mod_values(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(Error::division_by_zero());
    }
    Ok(a.wrapping_rem(b))
}

/// Shifts left by the low six bits of `b`.
pub(crate) const fn shl_values(a: i64, b: i64) -> i64 {
    a.wrapping_shl(b as u32)
}

/// Arithmetic shift right by the low six bits of `b`.
pub(crate) const fn shr_values(a: i64, b: i64) -> i64 {
    a.wrapping_shr(b as u32)
}
