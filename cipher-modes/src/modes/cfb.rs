//! CFB (Cipher Feedback) mode implementation
//!
//! Works in units of `f` bytes, `1 <= f <= block size`:
//! `O = E(K, R)[..f]`, `C = P ⊕ O`, then `R` is shifted left by `f` bytes and
//! the ciphertext unit is appended. Both directions feed back ciphertext.

use crate::BlockCipher;

pub(super) fn encrypt(
    cipher: &dyn BlockCipher,
    register: &mut [u8],
    keystream: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) {
    keystream.copy_from_slice(register);
    cipher.encrypt_block(keystream);
    for ((out, p), k) in output.iter_mut().zip(input).zip(keystream.iter()) {
        *out = p ^ k;
    }
    shift_in(register, output);
}

pub(super) fn decrypt(
    cipher: &dyn BlockCipher,
    register: &mut [u8],
    keystream: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) {
    keystream.copy_from_slice(register);
    cipher.encrypt_block(keystream);
    for ((out, c), k) in output.iter_mut().zip(input).zip(keystream.iter()) {
        *out = c ^ k;
    }
    shift_in(register, input);
}

/// Shifts `register` left by `feedback.len()` bytes and appends `feedback`
fn shift_in(register: &mut [u8], feedback: &[u8]) {
    let f = feedback.len();
    let n = register.len();
    register.copy_within(f.., 0);
    register[n - f..].copy_from_slice(feedback);
}
