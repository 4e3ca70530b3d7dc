//! Generic block cipher trait

/// A keyed block cipher primitive.
///
/// Implementations are keyed at construction and operate in place on exactly
/// one block. The mode engine guarantees that every slice handed to
/// [`encrypt_block`](Self::encrypt_block) and [`decrypt_block`](Self::decrypt_block)
/// is `block_size()` bytes long.
pub trait BlockCipher {
    /// Returns the block size of the cipher in bytes
    fn block_size(&self) -> usize;

    /// Encrypts a single block in place
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypts a single block in place
    fn decrypt_block(&self, block: &mut [u8]);
}

impl<C: BlockCipher + ?Sized> BlockCipher for Box<C> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        (**self).decrypt_block(block)
    }
}
