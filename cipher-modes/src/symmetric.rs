//! Configuration object for a symmetric algorithm
//!
//! A [`SymmetricAlgorithm`] holds the key, IV, mode, padding and sizes and
//! produces independent [`SymmetricTransform`]s. The key and IV are copied
//! into every transform, so changing them afterwards does not affect a
//! transform already created.

use rand::RngCore;
use zeroize::Zeroizing;

use crate::ciphers::des::{is_degenerate_triple_des_key, is_weak_key};
use crate::ciphers::{self, AlgorithmInfo, KeySizes};
use crate::error::{CipherModeError, Result};
use crate::transform::{Direction, SymmetricTransform};
use crate::{CipherMode, PaddingMode};

pub struct SymmetricAlgorithm {
    info: &'static AlgorithmInfo,
    key: Option<Zeroizing<Vec<u8>>>,
    key_size: usize,
    iv: Option<Zeroizing<Vec<u8>>>,
    mode: CipherMode,
    padding: PaddingMode,
    block_size: usize,
    feedback_size: usize,
}

impl SymmetricAlgorithm {
    /// Starts from the algorithm's default sizes, CBC and PKCS7; key and IV
    /// are generated on first use
    pub fn new(info: &'static AlgorithmInfo) -> Self {
        Self {
            info,
            key: None,
            key_size: info.default_key_size,
            iv: None,
            mode: CipherMode::default(),
            padding: PaddingMode::default(),
            block_size: info.default_block_size,
            feedback_size: info.default_feedback_size,
        }
    }

    pub fn des() -> Self {
        Self::new(&ciphers::DES)
    }

    pub fn triple_des() -> Self {
        Self::new(&ciphers::TRIPLE_DES)
    }

    pub fn rijndael() -> Self {
        Self::new(&ciphers::RIJNDAEL)
    }

    pub fn aes() -> Self {
        Self::new(&ciphers::AES)
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn legal_key_sizes(&self) -> &'static [KeySizes] {
        self.info.legal_key_sizes
    }

    pub fn legal_block_sizes(&self) -> &'static [KeySizes] {
        self.info.legal_block_sizes
    }

    /// Whether `bits` is a legal key size for this algorithm
    pub fn valid_key_size(&self, bits: usize) -> bool {
        self.info.is_legal_key_size(bits)
    }

    /// Current key, generated if none was set
    pub fn key(&mut self) -> &[u8] {
        if self.key.is_none() {
            self.generate_key();
        }
        self.key.as_deref().map(Vec::as_slice).unwrap_or_default()
    }

    /// Copies `key` in; its length fixes the key size
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        if !self.valid_key_size(key.len() * 8) {
            return Err(CipherModeError::InvalidKeyOrIv(format!(
                "{} bit key is not legal for {}",
                key.len() * 8,
                self.info.name
            )));
        }
        self.key_size = key.len() * 8;
        self.key = Some(Zeroizing::new(key.to_vec()));
        Ok(())
    }

    /// Key size in bits
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Changes the key size; the current key is discarded
    pub fn set_key_size(&mut self, bits: usize) -> Result<()> {
        if !self.valid_key_size(bits) {
            return Err(CipherModeError::InvalidKeyOrIv(format!(
                "{bits} bit key is not legal for {}",
                self.info.name
            )));
        }
        self.key_size = bits;
        self.key = None;
        Ok(())
    }

    /// Current IV, generated if none was set
    pub fn iv(&mut self) -> &[u8] {
        if self.iv.is_none() {
            self.generate_iv();
        }
        self.iv.as_deref().map(Vec::as_slice).unwrap_or_default()
    }

    /// Copies `iv` in; it must be one block long
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        if iv.len() * 8 != self.block_size {
            return Err(CipherModeError::InvalidKeyOrIv(format!(
                "IV is {} bytes, block is {}",
                iv.len(),
                self.block_size / 8
            )));
        }
        self.iv = Some(Zeroizing::new(iv.to_vec()));
        Ok(())
    }

    /// Block size in bits
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Changes the block size; the current IV is discarded and a feedback
    /// size larger than the new block is reduced to the block size
    pub fn set_block_size(&mut self, bits: usize) -> Result<()> {
        if !self.info.is_legal_block_size(bits) {
            return Err(CipherModeError::InvalidBlockSize);
        }
        self.block_size = bits;
        self.feedback_size = self.feedback_size.min(bits);
        self.iv = None;
        Ok(())
    }

    /// CFB feedback size in bits
    pub fn feedback_size(&self) -> usize {
        self.feedback_size
    }

    /// Sets the CFB feedback size: a multiple of 8 between 8 and the block size
    pub fn set_feedback_size(&mut self, bits: usize) -> Result<()> {
        if bits == 0 || bits % 8 != 0 || bits > self.block_size {
            return Err(CipherModeError::InvalidBlockSize);
        }
        self.feedback_size = bits;
        Ok(())
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CipherMode) {
        self.mode = mode;
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn set_padding(&mut self, padding: PaddingMode) {
        self.padding = padding;
    }

    /// Replaces the key with random bytes of the current key size.
    ///
    /// Weak DES keys and degenerate TripleDES keys are never produced.
    pub fn generate_key(&mut self) {
        let mut key = Zeroizing::new(vec![0u8; self.key_size / 8]);
        let mut rng = rand::thread_rng();
        loop {
            rng.fill_bytes(&mut key);
            let unusable = match self.info.name {
                "DES" => is_weak_key(&key),
                "TripleDES" => is_degenerate_triple_des_key(&key),
                _ => false,
            };
            if !unusable {
                break;
            }
        }
        self.key = Some(key);
    }

    /// Replaces the IV with one random block
    pub fn generate_iv(&mut self) {
        let mut iv = Zeroizing::new(vec![0u8; self.block_size / 8]);
        rand::thread_rng().fill_bytes(&mut iv);
        self.iv = Some(iv);
    }

    /// Encryptor with the configured key and IV
    pub fn create_encryptor(&mut self) -> Result<SymmetricTransform> {
        self.create_configured(Direction::Encrypt)
    }

    /// Decryptor with the configured key and IV
    pub fn create_decryptor(&mut self) -> Result<SymmetricTransform> {
        self.create_configured(Direction::Decrypt)
    }

    /// Encryptor with an explicit key and IV; the IV is ignored for ECB
    pub fn create_encryptor_with(&self, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform> {
        self.create(Direction::Encrypt, key, iv)
    }

    /// Decryptor with an explicit key and IV; the IV is ignored for ECB
    pub fn create_decryptor_with(&self, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform> {
        self.create(Direction::Decrypt, key, iv)
    }

    fn create_configured(&mut self, direction: Direction) -> Result<SymmetricTransform> {
        let key = Zeroizing::new(self.key().to_vec());
        let iv = Zeroizing::new(self.iv().to_vec());
        self.create(direction, &key, &iv)
    }

    fn create(&self, direction: Direction, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform> {
        if !self.valid_key_size(key.len() * 8) {
            return Err(CipherModeError::InvalidKeyOrIv(format!(
                "{} bit key is not legal for {}",
                key.len() * 8,
                self.info.name
            )));
        }

        let cipher = (self.info.construct)(key, self.block_size / 8)?;
        let iv: &[u8] = if self.mode.uses_iv() { iv } else { &[] };
        log::debug!(
            "{} {:?}: {} bit key, {} bit block",
            self.info.name,
            direction,
            key.len() * 8,
            self.block_size
        );

        SymmetricTransform::new(
            cipher,
            self.mode,
            self.padding,
            direction,
            iv,
            self.feedback_size / 8,
        )
    }
}
