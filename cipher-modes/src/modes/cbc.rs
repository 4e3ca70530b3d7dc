//! CBC (Cipher Block Chaining) mode implementation
//!
//! Encrypt: `C_i = E(K, P_i ⊕ R)`, then `R = C_i`.
//! Decrypt: `P_i = D(K, C_i) ⊕ R`, then `R = C_i`.
//! `R` starts out as a copy of the IV.

use crate::utils::xor_in_place;
use crate::BlockCipher;

pub(super) fn encrypt(
    cipher: &dyn BlockCipher,
    register: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) {
    output.copy_from_slice(input);
    xor_in_place(output, register);
    cipher.encrypt_block(output);
    register.copy_from_slice(output);
}

pub(super) fn decrypt(
    cipher: &dyn BlockCipher,
    register: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) {
    output.copy_from_slice(input);
    cipher.decrypt_block(output);
    xor_in_place(output, register);
    register.copy_from_slice(input);
}
