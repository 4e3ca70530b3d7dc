//! Error types for cipher mode operations

use std::io;

use thiserror::Error;

use crate::modes::CipherMode;

#[derive(Error, Debug)]
pub enum CipherModeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid key or IV: {0}")]
    InvalidKeyOrIv(String),

    #[error("Invalid block size (not a legal size for this algorithm)")]
    InvalidBlockSize,

    #[error("Input length {length} is not a multiple of the block size {block_size}")]
    BlockAlignment { length: usize, block_size: usize },

    #[error("Padding is invalid and cannot be removed")]
    BadPadding,

    #[error("Cipher mode {0} is not supported")]
    UnsupportedMode(CipherMode),

    #[error("The final block has already been transformed")]
    AlreadyFinalized,

    #[error("Cannot access a disposed object: {0}")]
    Disposed(&'static str),

    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CipherModeError>;

impl From<CipherModeError> for io::Error {
    fn from(err: CipherModeError) -> Self {
        match err {
            CipherModeError::Io(inner) => inner,
            other => {
                let kind = match &other {
                    CipherModeError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
                    CipherModeError::BadPadding | CipherModeError::BlockAlignment { .. } => {
                        io::ErrorKind::InvalidData
                    }
                    CipherModeError::NotSupported(_) => io::ErrorKind::Unsupported,
                    _ => io::ErrorKind::Other,
                };
                io::Error::new(kind, other)
            }
        }
    }
}

impl CipherModeError {
    /// Recovers the engine error carried by an `io::Error` produced by a crypto stream.
    pub fn from_io(err: &io::Error) -> Option<&CipherModeError> {
        err.get_ref()
            .and_then(|inner| inner.downcast_ref::<CipherModeError>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_block_alignment() {
        let err = CipherModeError::BlockAlignment {
            length: 7,
            block_size: 8,
        };
        assert_eq!(
            err.to_string(),
            "Input length 7 is not a multiple of the block size 8"
        );
    }

    #[test]
    fn test_display_unsupported_mode() {
        let err = CipherModeError::UnsupportedMode(CipherMode::Cts);
        assert_eq!(err.to_string(), "Cipher mode CTS is not supported");
    }

    #[test]
    fn test_into_io_error_keeps_source() {
        let io_err: io::Error = CipherModeError::BadPadding.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
        assert!(matches!(
            CipherModeError::from_io(&io_err),
            Some(CipherModeError::BadPadding)
        ));
    }

    #[test]
    fn test_io_variant_unwraps() {
        let original = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let io_err: io::Error = CipherModeError::Io(original).into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
        assert!(CipherModeError::from_io(&io_err).is_none());
    }

    #[test]
    fn test_not_supported_maps_to_unsupported() {
        let io_err: io::Error = CipherModeError::NotSupported("seek").into();
        assert_eq!(io_err.kind(), io::ErrorKind::Unsupported);
    }
}
