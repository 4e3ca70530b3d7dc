//! DES and TripleDES block ciphers backed by the RustCrypto `des` crate

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::error::{CipherModeError, Result};
use crate::BlockCipher;

const DES_BLOCK_SIZE: usize = 8;

/// Weak DES keys with the parity bits cleared
const WEAK_KEYS: [u64; 4] = [
    0x0000_0000_0000_0000,
    0xFEFE_FEFE_FEFE_FEFE,
    0xE0E0_E0E0_F0F0_F0F0,
    0x1E1E_1E1E_0E0E_0E0E,
];

/// Semi-weak DES keys with the parity bits cleared
const SEMI_WEAK_KEYS: [u64; 12] = [
    0x001E_001E_000E_000E,
    0x1E00_1E00_0E00_0E00,
    0x00E0_00E0_00F0_00F0,
    0xE000_E000_F000_F000,
    0x00FE_00FE_00FE_00FE,
    0xFE00_FE00_FE00_FE00,
    0x1EE0_1EE0_0EF0_0EF0,
    0xE01E_E01E_F00E_F00E,
    0x1EFE_1EFE_0EFE_0EFE,
    0xFE1E_FE1E_FE0E_FE0E,
    0xE0FE_E0FE_F0FE_F0FE,
    0xFEE0_FEE0_FEF0_FEF0,
];

/// DES key bytes as an integer with the low (parity) bit of every byte cleared
fn without_parity(key: &[u8]) -> u64 {
    key.iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b & 0xFE))
}

/// Whether an 8 byte key is one of the weak or semi-weak DES keys
pub fn is_weak_key(key: &[u8]) -> bool {
    if key.len() != DES_BLOCK_SIZE {
        return false;
    }
    let value = without_parity(key);
    WEAK_KEYS.contains(&value) || SEMI_WEAK_KEYS.contains(&value)
}

/// Whether a 16 or 24 byte TripleDES key collapses to single DES
/// (K1 == K2 or K2 == K3, parity ignored)
pub fn is_degenerate_triple_des_key(key: &[u8]) -> bool {
    let parts: Vec<u64> = key.chunks_exact(DES_BLOCK_SIZE).map(without_parity).collect();
    match parts.as_slice() {
        [k1, k2] => k1 == k2,
        [k1, k2, k3] => k1 == k2 || k2 == k3,
        _ => false,
    }
}

/// Single DES
pub struct Des {
    inner: des::Des,
}

impl Des {
    /// Keys a DES cipher; the key must be 8 bytes and not weak or semi-weak
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != DES_BLOCK_SIZE {
            return Err(CipherModeError::InvalidKeyOrIv(format!(
                "DES key must be 8 bytes, got {}",
                key.len()
            )));
        }
        if is_weak_key(key) {
            return Err(CipherModeError::InvalidKeyOrIv(
                "weak or semi-weak DES key".to_string(),
            ));
        }
        let inner = des::Des::new_from_slice(key)
            .map_err(|_| CipherModeError::InvalidKeyOrIv("DES key rejected".to_string()))?;
        Ok(Self { inner })
    }
}

impl BlockCipher for Des {
    fn block_size(&self) -> usize {
        DES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.inner
            .encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.inner
            .decrypt_block(GenericArray::from_mut_slice(block));
    }
}

/// TripleDES in EDE form with two (K3 = K1) or three independent keys
pub enum TripleDes {
    TwoKey(des::TdesEde2),
    ThreeKey(des::TdesEde3),
}

impl TripleDes {
    /// Keys TripleDES from a 16 or 24 byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24) {
            return Err(CipherModeError::InvalidKeyOrIv(format!(
                "TripleDES key must be 16 or 24 bytes, got {}",
                key.len()
            )));
        }
        if is_degenerate_triple_des_key(key) {
            return Err(CipherModeError::InvalidKeyOrIv(
                "TripleDES key reduces to single DES".to_string(),
            ));
        }

        let rejected = |_| CipherModeError::InvalidKeyOrIv("TripleDES key rejected".to_string());
        if key.len() == 16 {
            Ok(TripleDes::TwoKey(
                des::TdesEde2::new_from_slice(key).map_err(rejected)?,
            ))
        } else {
            Ok(TripleDes::ThreeKey(
                des::TdesEde3::new_from_slice(key).map_err(rejected)?,
            ))
        }
    }
}

impl BlockCipher for TripleDes {
    fn block_size(&self) -> usize {
        DES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            TripleDes::TwoKey(c) => c.encrypt_block(block),
            TripleDes::ThreeKey(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            TripleDes::TwoKey(c) => c.decrypt_block(block),
            TripleDes::ThreeKey(c) => c.decrypt_block(block),
        }
    }
}
