//! ECB (Electronic Code Book) mode implementation
//!
//! Every block is enciphered independently, so equal plaintext blocks give
//! equal ciphertext blocks.

use crate::BlockCipher;

pub(super) fn encrypt(cipher: &dyn BlockCipher, input: &[u8], output: &mut [u8]) {
    output.copy_from_slice(input);
    cipher.encrypt_block(output);
}

pub(super) fn decrypt(cipher: &dyn BlockCipher, input: &[u8], output: &mut [u8]) {
    output.copy_from_slice(input);
    cipher.decrypt_block(output);
}
