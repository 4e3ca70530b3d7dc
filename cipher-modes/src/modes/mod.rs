//! Cipher modes implementation
//!
//! [`ModeEngine`] owns the chaining register and dispatches every unit of
//! input to the per-mode step functions in the submodules. The same engine
//! runs for every [`BlockCipher`]; only the primitive differs.

pub mod cbc;
pub mod cfb;
pub mod ecb;
pub mod ofb;

use std::fmt;

use zeroize::Zeroize;

use crate::error::{CipherModeError, Result};
use crate::transform::{CryptoTransform, Direction, SymmetricTransform};
use crate::{BlockCipher, PaddingMode};

/// Chaining algorithm applied on top of a block cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherMode {
    /// Electronic Code Book
    Ecb,
    /// Cipher Block Chaining
    #[default]
    Cbc,
    /// Cipher Feedback with a configurable feedback size
    Cfb,
    /// Output Feedback
    Ofb,
    /// Ciphertext stealing; never supported by this engine
    Cts,
}

impl CipherMode {
    /// Whether the mode chains through a register initialized from an IV
    pub fn uses_iv(self) -> bool {
        !matches!(self, CipherMode::Ecb)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherMode::Ecb => "ECB",
            CipherMode::Cbc => "CBC",
            CipherMode::Cfb => "CFB",
            CipherMode::Ofb => "OFB",
            CipherMode::Cts => "CTS",
        };
        f.write_str(name)
    }
}

/// Stateful chaining engine shared by every block cipher.
pub(crate) struct ModeEngine {
    cipher: Box<dyn BlockCipher>,
    mode: CipherMode,
    direction: Direction,
    iv: Vec<u8>,
    register: Vec<u8>,
    keystream: Vec<u8>,
    unit: usize,
}

impl ModeEngine {
    /// Builds an engine; the IV is copied so later changes to the caller's
    /// buffer do not reach the register.
    ///
    /// `feedback_bytes` only matters for CFB, where it must be in
    /// `1..=block_size`.
    pub(crate) fn new(
        cipher: Box<dyn BlockCipher>,
        mode: CipherMode,
        direction: Direction,
        iv: &[u8],
        feedback_bytes: usize,
    ) -> Result<Self> {
        let block_size = cipher.block_size();
        if block_size == 0 {
            return Err(CipherModeError::InvalidBlockSize);
        }

        let unit = match mode {
            CipherMode::Cts => return Err(CipherModeError::UnsupportedMode(mode)),
            CipherMode::Cfb => {
                if feedback_bytes == 0 || feedback_bytes > block_size {
                    return Err(CipherModeError::InvalidArgument(format!(
                        "feedback size of {feedback_bytes} bytes is outside 1..={block_size}"
                    )));
                }
                feedback_bytes
            }
            CipherMode::Ecb | CipherMode::Cbc | CipherMode::Ofb => block_size,
        };

        let iv = if mode.uses_iv() {
            if iv.len() != block_size {
                return Err(CipherModeError::InvalidKeyOrIv(format!(
                    "IV is {} bytes, {mode} requires {block_size}",
                    iv.len()
                )));
            }
            iv.to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            cipher,
            mode,
            direction,
            register: iv.clone(),
            iv,
            keystream: vec![0u8; block_size],
            unit,
        })
    }

    pub(crate) fn mode(&self) -> CipherMode {
        self.mode
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    /// Bytes consumed per step: the feedback size for CFB, the block size otherwise
    pub(crate) fn unit_size(&self) -> usize {
        self.unit
    }

    /// Runs whole units of `input` through the mode into `output`.
    ///
    /// `input.len()` must be a multiple of [`unit_size`](Self::unit_size) and
    /// `output` at least as long as `input`.
    pub(crate) fn process(&mut self, input: &[u8], output: &mut [u8]) {
        debug_assert_eq!(input.len() % self.unit, 0);
        debug_assert!(output.len() >= input.len());

        let cipher = &*self.cipher;
        let units = input
            .chunks_exact(self.unit)
            .zip(output.chunks_exact_mut(self.unit));
        for (src, dst) in units {
            match (self.mode, self.direction) {
                (CipherMode::Ecb, Direction::Encrypt) => ecb::encrypt(cipher, src, dst),
                (CipherMode::Ecb, Direction::Decrypt) => ecb::decrypt(cipher, src, dst),
                (CipherMode::Cbc, Direction::Encrypt) => {
                    cbc::encrypt(cipher, &mut self.register, src, dst)
                }
                (CipherMode::Cbc, Direction::Decrypt) => {
                    cbc::decrypt(cipher, &mut self.register, src, dst)
                }
                (CipherMode::Cfb, Direction::Encrypt) => {
                    cfb::encrypt(cipher, &mut self.register, &mut self.keystream, src, dst)
                }
                (CipherMode::Cfb, Direction::Decrypt) => {
                    cfb::decrypt(cipher, &mut self.register, &mut self.keystream, src, dst)
                }
                (CipherMode::Ofb, _) => ofb::apply(cipher, &mut self.register, src, dst),
                // rejected in `new`
                (CipherMode::Cts, _) => {}
            }
        }
    }

    /// Restores the register to the IV
    pub(crate) fn reset(&mut self) {
        self.register.copy_from_slice(&self.iv);
        self.keystream.zeroize();
    }
}

impl Drop for ModeEngine {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.register.zeroize();
        self.keystream.zeroize();
    }
}

/// One-shot helpers for encrypting or decrypting a whole message.
///
/// CFB runs with a feedback size equal to the block size here; build a
/// [`SymmetricTransform`] directly for other feedback sizes.
pub struct CipherModes;

impl CipherModes {
    /// Encrypts `plaintext` with padding applied to the final block
    pub fn encrypt<C: BlockCipher + 'static>(
        cipher: C,
        mode: CipherMode,
        padding: PaddingMode,
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        Self::run(cipher, mode, padding, Direction::Encrypt, iv, plaintext)
    }

    /// Decrypts `ciphertext` and strips the padding
    pub fn decrypt<C: BlockCipher + 'static>(
        cipher: C,
        mode: CipherMode,
        padding: PaddingMode,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        Self::run(cipher, mode, padding, Direction::Decrypt, iv, ciphertext)
    }

    /// List all supported cipher modes
    pub fn supported_modes() -> Vec<CipherMode> {
        vec![CipherMode::Ecb, CipherMode::Cbc, CipherMode::Cfb, CipherMode::Ofb]
    }

    fn run<C: BlockCipher + 'static>(
        cipher: C,
        mode: CipherMode,
        padding: PaddingMode,
        direction: Direction,
        iv: &[u8],
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let feedback = cipher.block_size();
        let mut transform =
            SymmetricTransform::new(Box::new(cipher), mode, padding, direction, iv, feedback)?;
        transform.transform_final_block(data)
    }
}
