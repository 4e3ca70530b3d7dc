//! # Cipher Modes Library
//!
//! Block cipher modes of operation, padding and streaming transforms for
//! DES, TripleDES and Rijndael/AES.
//!
//! ## Supported Modes
//!
//! - **ECB** (Electronic Code Book) - no chaining, no IV
//! - **CBC** (Cipher Block Chaining) - requires IV
//! - **CFB** (Cipher Feedback) - configurable feedback size, requires IV
//! - **OFB** (Output Feedback) - full block feedback, requires IV
//!
//! CTS is recognized but always rejected with
//! [`CipherModeError::UnsupportedMode`].
//!
//! ## Padding
//!
//! None, Zeros, PKCS7, ANSI X9.23 and ISO 10126, applied per input block of
//! the transform (the feedback size for CFB).
//!
//! ## Usage
//!
//! ```rust
//! use std::io::Write;
//! use cipher_modes::{CryptoTransform, CryptoWriter, SymmetricAlgorithm};
//!
//! let mut aes = SymmetricAlgorithm::aes();
//! aes.set_key(&[0x2b; 16])?;
//! aes.set_iv(&[0u8; 16])?;
//!
//! let mut ciphertext = Vec::new();
//! let mut writer = CryptoWriter::new(&mut ciphertext, aes.create_encryptor()?);
//! writer.write_all(b"Hello, World!")?;
//! writer.close()?;
//! assert_eq!(ciphertext.len(), 16);
//!
//! let plaintext = aes.create_decryptor()?.transform_final_block(&ciphertext)?;
//! assert_eq!(plaintext, b"Hello, World!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cipher;
pub mod ciphers;
pub mod derive;
pub mod error;
pub mod hash;
pub mod modes;
pub mod padding;
pub mod registry;
pub mod stream;
pub mod symmetric;
pub mod transform;
pub mod utils;

pub use cipher::BlockCipher;
pub use ciphers::{AlgorithmInfo, Des, KeySizes, Rijndael, TripleDes};
pub use derive::PasswordDeriveBytes;
pub use error::{CipherModeError, Result};
pub use hash::{HashAlgorithm, HashTransform};
pub use modes::{CipherMode, CipherModes};
pub use padding::PaddingMode;
pub use registry::CryptoConfig;
pub use stream::{CryptoReader, CryptoStream, CryptoStreamMode, CryptoWriter};
pub use symmetric::SymmetricAlgorithm;
pub use transform::{CryptoTransform, Direction, SymmetricTransform};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
