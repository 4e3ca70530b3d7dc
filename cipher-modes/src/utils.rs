//! Utility functions for cipher modes

use crate::error::{CipherModeError, Result};

/// XOR `src` into `dst` byte by byte
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// Validates that `offset..offset + count` lies inside a buffer of `len` bytes
pub fn check_range(len: usize, offset: usize, count: usize, name: &str) -> Result<()> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(CipherModeError::InvalidArgument(format!(
            "{name}: offset {offset} and count {count} exceed buffer length {len}"
        ))),
    }
}
