//! OFB (Output Feedback) mode implementation
//!
//! The cipher generates a keystream independent of the data:
//! `R = E(K, R)`, `C_i = P_i ⊕ R`. Encryption and decryption are identical.
//! Reusing a key/IV pair for two messages leaks their XOR.

use crate::utils::xor_in_place;
use crate::BlockCipher;

pub(super) fn apply(
    cipher: &dyn BlockCipher,
    register: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) {
    cipher.encrypt_block(register);
    output.copy_from_slice(input);
    xor_in_place(output, register);
}
