//! Concrete block ciphers and their size descriptors

pub mod des;
pub mod rijndael;

pub use self::des::{Des, TripleDes};
pub use self::rijndael::Rijndael;

use crate::error::Result;
use crate::BlockCipher;

/// Range of legal sizes in bits: `min..=max` stepping by `skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySizes {
    pub min: usize,
    pub max: usize,
    pub skip: usize,
}

impl KeySizes {
    pub const fn new(min: usize, max: usize, skip: usize) -> Self {
        Self { min, max, skip }
    }

    pub fn contains(&self, bits: usize) -> bool {
        if bits < self.min || bits > self.max {
            return false;
        }
        if self.skip == 0 {
            return bits == self.min;
        }
        (bits - self.min) % self.skip == 0
    }
}

/// Builds a keyed cipher from key bytes and a block size in bytes
pub type CipherFactory = fn(&[u8], usize) -> Result<Box<dyn BlockCipher>>;

/// Static description of a symmetric algorithm
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub legal_key_sizes: &'static [KeySizes],
    pub legal_block_sizes: &'static [KeySizes],
    pub default_key_size: usize,
    pub default_block_size: usize,
    pub default_feedback_size: usize,
    pub construct: CipherFactory,
}

impl AlgorithmInfo {
    pub fn is_legal_key_size(&self, bits: usize) -> bool {
        self.legal_key_sizes.iter().any(|s| s.contains(bits))
    }

    pub fn is_legal_block_size(&self, bits: usize) -> bool {
        self.legal_block_sizes.iter().any(|s| s.contains(bits))
    }
}

fn build_des(key: &[u8], _block_size: usize) -> Result<Box<dyn BlockCipher>> {
    Ok(Box::new(Des::new(key)?))
}

fn build_triple_des(key: &[u8], _block_size: usize) -> Result<Box<dyn BlockCipher>> {
    Ok(Box::new(TripleDes::new(key)?))
}

fn build_rijndael(key: &[u8], block_size: usize) -> Result<Box<dyn BlockCipher>> {
    Ok(Box::new(Rijndael::new(key, block_size)?))
}

pub static DES: AlgorithmInfo = AlgorithmInfo {
    name: "DES",
    legal_key_sizes: &[KeySizes::new(64, 64, 0)],
    legal_block_sizes: &[KeySizes::new(64, 64, 0)],
    default_key_size: 64,
    default_block_size: 64,
    default_feedback_size: 8,
    construct: build_des,
};

pub static TRIPLE_DES: AlgorithmInfo = AlgorithmInfo {
    name: "TripleDES",
    legal_key_sizes: &[KeySizes::new(128, 192, 64)],
    legal_block_sizes: &[KeySizes::new(64, 64, 0)],
    default_key_size: 192,
    default_block_size: 64,
    default_feedback_size: 8,
    construct: build_triple_des,
};

pub static RIJNDAEL: AlgorithmInfo = AlgorithmInfo {
    name: "Rijndael",
    legal_key_sizes: &[KeySizes::new(128, 256, 64)],
    legal_block_sizes: &[KeySizes::new(128, 256, 64)],
    default_key_size: 256,
    default_block_size: 128,
    default_feedback_size: 128,
    construct: build_rijndael,
};

pub static AES: AlgorithmInfo = AlgorithmInfo {
    name: "AES",
    legal_key_sizes: &[KeySizes::new(128, 256, 64)],
    legal_block_sizes: &[KeySizes::new(128, 128, 0)],
    default_key_size: 256,
    default_block_size: 128,
    default_feedback_size: 128,
    construct: build_rijndael,
};
