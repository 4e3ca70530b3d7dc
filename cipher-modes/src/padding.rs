//! Padding schemes for the final block of a message
//!
//! Padding is applied in units of the transform's input block size, which is
//! the cipher block size for every mode except CFB with a feedback size
//! smaller than the block.

use std::fmt;

use rand::RngCore;

use crate::error::{CipherModeError, Result};

/// Selects how the final block is filled on encryption and stripped on decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    /// No padding; the message must be block aligned
    None,
    /// Fill with zero bytes; aligned input gets no extra block
    Zeros,
    /// `N` bytes of value `N`
    #[default]
    Pkcs7,
    /// `N - 1` zero bytes followed by one byte of value `N`
    AnsiX923,
    /// `N - 1` random bytes followed by one byte of value `N`
    Iso10126,
}

impl PaddingMode {
    /// All padding modes, in declaration order
    pub const ALL: [PaddingMode; 5] = [
        PaddingMode::None,
        PaddingMode::Zeros,
        PaddingMode::Pkcs7,
        PaddingMode::AnsiX923,
        PaddingMode::Iso10126,
    ];

    /// Returns `data` extended to a multiple of `block_size`.
    ///
    /// # Errors
    ///
    /// [`CipherModeError::BlockAlignment`] for [`PaddingMode::None`] when
    /// `data` is not block aligned.
    pub fn pad(self, data: &[u8], block_size: usize) -> Result<Vec<u8>> {
        if block_size == 0 || block_size > u8::MAX as usize {
            return Err(CipherModeError::InvalidBlockSize);
        }

        let remainder = data.len() % block_size;
        // PKCS7-style schemes always append 1..=block_size bytes
        let count = block_size - remainder;

        let mut padded = Vec::with_capacity(data.len() + count);
        padded.extend_from_slice(data);

        match self {
            PaddingMode::None => {
                if remainder != 0 {
                    return Err(CipherModeError::BlockAlignment {
                        length: data.len(),
                        block_size,
                    });
                }
            }
            PaddingMode::Zeros => {
                if remainder != 0 {
                    padded.resize(data.len() + count, 0);
                }
            }
            PaddingMode::Pkcs7 => {
                padded.resize(data.len() + count, count as u8);
            }
            PaddingMode::AnsiX923 => {
                padded.resize(data.len() + count - 1, 0);
                padded.push(count as u8);
            }
            PaddingMode::Iso10126 => {
                let mut filler = vec![0u8; count - 1];
                rand::thread_rng().fill_bytes(&mut filler);
                padded.extend_from_slice(&filler);
                padded.push(count as u8);
            }
        }

        Ok(padded)
    }

    /// Returns the prefix of `data` left after the padding is removed.
    ///
    /// `None` and `Zeros` return `data` unchanged. Empty input yields empty
    /// output for every mode.
    ///
    /// # Errors
    ///
    /// [`CipherModeError::BadPadding`] when the padding bytes fail validation,
    /// [`CipherModeError::BlockAlignment`] when `data` is not block aligned.
    pub fn unpad(self, data: &[u8], block_size: usize) -> Result<&[u8]> {
        if block_size == 0 || block_size > u8::MAX as usize {
            return Err(CipherModeError::InvalidBlockSize);
        }
        if data.len() % block_size != 0 {
            return Err(CipherModeError::BlockAlignment {
                length: data.len(),
                block_size,
            });
        }
        if data.is_empty() {
            return Ok(data);
        }

        match self {
            PaddingMode::None | PaddingMode::Zeros => Ok(data),
            PaddingMode::Pkcs7 | PaddingMode::AnsiX923 | PaddingMode::Iso10126 => {
                let count = data[data.len() - 1] as usize;
                if count == 0 || count > block_size {
                    return Err(CipherModeError::BadPadding);
                }

                let start = data.len() - count;
                let filler = &data[start..data.len() - 1];
                let valid = match self {
                    PaddingMode::Pkcs7 => filler.iter().all(|&b| b as usize == count),
                    PaddingMode::AnsiX923 => filler.iter().all(|&b| b == 0),
                    _ => true,
                };
                if !valid {
                    return Err(CipherModeError::BadPadding);
                }

                Ok(&data[..start])
            }
        }
    }
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaddingMode::None => "None",
            PaddingMode::Zeros => "Zeros",
            PaddingMode::Pkcs7 => "PKCS7",
            PaddingMode::AnsiX923 => "ANSIX923",
            PaddingMode::Iso10126 => "ISO10126",
        };
        f.write_str(name)
    }
}
