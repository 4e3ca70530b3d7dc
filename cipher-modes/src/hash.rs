//! Hash functions usable as transforms
//!
//! A [`HashTransform`] copies its input to its output unchanged and feeds
//! the same bytes into a digest, so it can sit inside a crypto stream and
//! expose the hash of everything that passed through once the stream is
//! finalized.

use digest::Digest;
use zeroize::Zeroize;

use crate::error::{CipherModeError, Result};
use crate::transform::CryptoTransform;

/// An incremental hash function.
pub trait HashAlgorithm {
    /// Canonical algorithm name
    fn name(&self) -> &'static str;

    /// Digest size in bits
    fn hash_size(&self) -> usize;

    /// Feeds `data` into the running digest
    fn hash_core(&mut self, data: &[u8]);

    /// Returns the digest and resets the state for a new message
    fn hash_final(&mut self) -> Vec<u8>;

    /// Hashes `data` as one complete message
    fn compute_hash(&mut self, data: &[u8]) -> Vec<u8> {
        self.hash_core(data);
        self.hash_final()
    }
}

impl<H: HashAlgorithm + ?Sized> HashAlgorithm for Box<H> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn hash_size(&self) -> usize {
        (**self).hash_size()
    }

    fn hash_core(&mut self, data: &[u8]) {
        (**self).hash_core(data)
    }

    fn hash_final(&mut self) -> Vec<u8> {
        (**self).hash_final()
    }
}

macro_rules! digest_algorithm {
    ($ty:ty, $name:literal) => {
        impl HashAlgorithm for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn hash_size(&self) -> usize {
                <$ty as Digest>::output_size() * 8
            }

            fn hash_core(&mut self, data: &[u8]) {
                Digest::update(self, data);
            }

            fn hash_final(&mut self) -> Vec<u8> {
                Digest::finalize_reset(self).to_vec()
            }
        }
    };
}

digest_algorithm!(sha1::Sha1, "SHA1");
digest_algorithm!(sha2::Sha256, "SHA256");
digest_algorithm!(sha2::Sha384, "SHA384");
digest_algorithm!(sha2::Sha512, "SHA512");
digest_algorithm!(md5::Md5, "MD5");

/// Pass-through transform that hashes every byte it sees.
pub struct HashTransform<H: HashAlgorithm> {
    hasher: Option<H>,
    hash: Option<Vec<u8>>,
}

impl<H: HashAlgorithm> HashTransform<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher: Some(hasher),
            hash: None,
        }
    }

    /// Digest of the last finalized message
    pub fn hash(&self) -> Option<&[u8]> {
        self.hash.as_deref()
    }

    pub fn hash_size(&self) -> Option<usize> {
        self.hasher.as_ref().map(HashAlgorithm::hash_size)
    }

    fn hasher_mut(&mut self) -> Result<&mut H> {
        self.hasher
            .as_mut()
            .ok_or(CipherModeError::Disposed("HashTransform"))
    }
}

impl<H: HashAlgorithm> CryptoTransform for HashTransform<H> {
    fn input_block_size(&self) -> usize {
        1
    }

    fn output_block_size(&self) -> usize {
        1
    }

    fn can_reuse_transform(&self) -> bool {
        true
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let hasher = self.hasher_mut()?;
        if output.len() < input.len() {
            return Err(CipherModeError::InvalidArgument(format!(
                "output buffer holds {} bytes, {} required",
                output.len(),
                input.len()
            )));
        }
        hasher.hash_core(input);
        output[..input.len()].copy_from_slice(input);
        Ok(input.len())
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let hasher = self.hasher_mut()?;
        hasher.hash_core(input);
        let digest = hasher.hash_final();
        log::trace!("{} finalized: {} byte digest", hasher.name(), digest.len());
        self.hash = Some(digest);
        Ok(input.to_vec())
    }

    fn clear(&mut self) {
        self.hasher = None;
        if let Some(hash) = self.hash.as_mut() {
            hash.zeroize();
        }
        self.hash = None;
    }
}
