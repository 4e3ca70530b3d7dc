//! PBKDF1 key derivation

use zeroize::{Zeroize, Zeroizing};

use crate::error::{CipherModeError, Result};
use crate::hash::HashAlgorithm;

/// Derives key bytes from a password with PBKDF1.
///
/// `T1 = H(password || salt)`, `Ti = H(Ti-1)`; the key is a prefix of the
/// last `Ti`, so at most one digest worth of bytes can be derived.
pub struct PasswordDeriveBytes<H: HashAlgorithm> {
    hasher: H,
    password: Zeroizing<Vec<u8>>,
    salt: Vec<u8>,
    iterations: usize,
}

impl<H: HashAlgorithm> PasswordDeriveBytes<H> {
    pub fn new(password: &[u8], salt: &[u8], hasher: H, iterations: usize) -> Result<Self> {
        check_iterations(iterations)?;
        Ok(Self {
            hasher,
            password: Zeroizing::new(password.to_vec()),
            salt: salt.to_vec(),
            iterations,
        })
    }

    pub fn hash_name(&self) -> &'static str {
        self.hasher.name()
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn set_salt(&mut self, salt: &[u8]) {
        self.salt = salt.to_vec();
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn set_iterations(&mut self, iterations: usize) -> Result<()> {
        check_iterations(iterations)?;
        self.iterations = iterations;
        Ok(())
    }

    /// Derives `len` bytes; `len` must be between 1 and the digest size
    pub fn get_bytes(&mut self, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let max = self.hasher.hash_size() / 8;
        if len == 0 || len > max {
            return Err(CipherModeError::InvalidArgument(format!(
                "PBKDF1 with {} yields 1..={max} bytes, {len} requested",
                self.hasher.name()
            )));
        }

        self.hasher.hash_core(&self.password);
        self.hasher.hash_core(&self.salt);
        let mut digest = self.hasher.hash_final();
        for _ in 1..self.iterations {
            let next = self.hasher.compute_hash(&digest);
            digest.zeroize();
            digest = next;
        }

        digest.truncate(len);
        Ok(Zeroizing::new(digest))
    }
}

fn check_iterations(iterations: usize) -> Result<()> {
    if iterations == 0 {
        return Err(CipherModeError::InvalidArgument(
            "iteration count must be positive".to_string(),
        ));
    }
    Ok(())
}
