//! Block-oriented transforms
//!
//! [`CryptoTransform`] is the unit of work consumed by the crypto streams.
//! [`SymmetricTransform`] combines a [`ModeEngine`] with a [`PaddingMode`] and
//! a fixed [`Direction`].
//!
//! `transform_block` never strips padding and never holds data back: every
//! whole block it receives is processed. Padding is added or removed only by
//! `transform_final_block`, so a decrypting caller must keep the last
//! ciphertext block for the final call (the crypto streams do this).

use zeroize::Zeroize;

use crate::error::{CipherModeError, Result};
use crate::modes::{CipherMode, ModeEngine};
use crate::utils::check_range;
use crate::{BlockCipher, PaddingMode};

/// Whether a transform enciphers or deciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// A transform that turns whole input blocks into output blocks and handles
/// the final block of a message specially.
pub trait CryptoTransform {
    /// Number of bytes consumed per block
    fn input_block_size(&self) -> usize;

    /// Number of bytes produced per block
    fn output_block_size(&self) -> usize;

    /// Whether `transform_block` accepts more than one block per call
    fn can_transform_multiple_blocks(&self) -> bool {
        true
    }

    /// Whether the transform is ready for a new message after `transform_final_block`
    fn can_reuse_transform(&self) -> bool;

    /// Transforms whole blocks of `input` into `output` and returns the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// [`CipherModeError::BlockAlignment`] when `input` is not a multiple of
    /// the input block size, [`CipherModeError::InvalidArgument`] when `input`
    /// is empty or `output` is too small, [`CipherModeError::Disposed`] after
    /// [`clear`](Self::clear).
    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Transforms the last bytes of a message, applying or removing padding,
    /// and returns only the bytes produced by this call.
    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Wipes key material; every later call fails with `Disposed`
    fn clear(&mut self);

    /// Offset/count form of [`transform_block`](Self::transform_block)
    fn transform_block_at(
        &mut self,
        input: &[u8],
        in_offset: usize,
        count: usize,
        output: &mut [u8],
        out_offset: usize,
    ) -> Result<usize> {
        check_range(input.len(), in_offset, count, "input")?;
        check_range(output.len(), out_offset, 0, "output")?;
        self.transform_block(
            &input[in_offset..in_offset + count],
            &mut output[out_offset..],
        )
    }

    /// Offset/count form of [`transform_final_block`](Self::transform_final_block)
    fn transform_final_block_at(
        &mut self,
        input: &[u8],
        offset: usize,
        count: usize,
    ) -> Result<Vec<u8>> {
        check_range(input.len(), offset, count, "input")?;
        self.transform_final_block(&input[offset..offset + count])
    }
}

impl<T: CryptoTransform + ?Sized> CryptoTransform for &mut T {
    fn input_block_size(&self) -> usize {
        (**self).input_block_size()
    }

    fn output_block_size(&self) -> usize {
        (**self).output_block_size()
    }

    fn can_transform_multiple_blocks(&self) -> bool {
        (**self).can_transform_multiple_blocks()
    }

    fn can_reuse_transform(&self) -> bool {
        (**self).can_reuse_transform()
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        (**self).transform_block(input, output)
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        (**self).transform_final_block(input)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

impl<T: CryptoTransform + ?Sized> CryptoTransform for Box<T> {
    fn input_block_size(&self) -> usize {
        (**self).input_block_size()
    }

    fn output_block_size(&self) -> usize {
        (**self).output_block_size()
    }

    fn can_transform_multiple_blocks(&self) -> bool {
        (**self).can_transform_multiple_blocks()
    }

    fn can_reuse_transform(&self) -> bool {
        (**self).can_reuse_transform()
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        (**self).transform_block(input, output)
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        (**self).transform_final_block(input)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

/// Encryptor or decryptor for a block cipher in a given mode and padding.
pub struct SymmetricTransform {
    engine: Option<ModeEngine>,
    mode: CipherMode,
    padding: PaddingMode,
    direction: Direction,
    unit: usize,
}

impl SymmetricTransform {
    /// Creates a transform; the key lives inside `cipher`, the IV is copied.
    ///
    /// # Errors
    ///
    /// [`CipherModeError::UnsupportedMode`] for CTS,
    /// [`CipherModeError::InvalidKeyOrIv`] when the IV length does not match
    /// the block size, [`CipherModeError::InvalidArgument`] for a CFB feedback
    /// size outside `1..=block_size`.
    pub fn new(
        cipher: Box<dyn BlockCipher>,
        mode: CipherMode,
        padding: PaddingMode,
        direction: Direction,
        iv: &[u8],
        feedback_bytes: usize,
    ) -> Result<Self> {
        let engine = ModeEngine::new(cipher, mode, direction, iv, feedback_bytes)?;
        let unit = engine.unit_size();
        log::debug!("created {direction:?} transform: mode {mode}, padding {padding}, block {unit} bytes");

        Ok(Self {
            engine: Some(engine),
            mode,
            padding,
            direction,
            unit,
        })
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn engine_mut(&mut self) -> Result<&mut ModeEngine> {
        self.engine
            .as_mut()
            .ok_or(CipherModeError::Disposed("SymmetricTransform"))
    }
}

impl CryptoTransform for SymmetricTransform {
    fn input_block_size(&self) -> usize {
        self.unit
    }

    fn output_block_size(&self) -> usize {
        self.unit
    }

    fn can_reuse_transform(&self) -> bool {
        true
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let engine = self.engine_mut()?;
        let unit = engine.unit_size();

        if input.is_empty() {
            return Err(CipherModeError::InvalidArgument(
                "count must be positive".to_string(),
            ));
        }
        if input.len() % unit != 0 {
            return Err(CipherModeError::BlockAlignment {
                length: input.len(),
                block_size: unit,
            });
        }
        if output.len() < input.len() {
            return Err(CipherModeError::InvalidArgument(format!(
                "output buffer holds {} bytes, {} required",
                output.len(),
                input.len()
            )));
        }

        engine.process(input, &mut output[..input.len()]);
        Ok(input.len())
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let padding = self.padding;
        let engine = self.engine_mut()?;
        let unit = engine.unit_size();

        let result = match engine.direction() {
            Direction::Encrypt => {
                let mut padded = match padding.pad(input, unit) {
                    Ok(padded) => padded,
                    Err(err) => {
                        engine.reset();
                        return Err(err);
                    }
                };
                let mut output = vec![0u8; padded.len()];
                engine.process(&padded, &mut output);
                padded.zeroize();
                output
            }
            Direction::Decrypt => {
                if input.len() % unit != 0 {
                    engine.reset();
                    return Err(CipherModeError::BlockAlignment {
                        length: input.len(),
                        block_size: unit,
                    });
                }
                let mut output = vec![0u8; input.len()];
                engine.process(input, &mut output);
                match padding.unpad(&output, unit) {
                    Ok(kept) => {
                        let kept = kept.len();
                        output[kept..].zeroize();
                        output.truncate(kept);
                    }
                    Err(err) => {
                        output.zeroize();
                        engine.reset();
                        return Err(err);
                    }
                }
                output
            }
        };

        log::trace!(
            "final block ({:?}, {}): {} bytes in, {} bytes out",
            engine.direction(),
            engine.mode(),
            input.len(),
            result.len()
        );
        engine.reset();
        Ok(result)
    }

    fn clear(&mut self) {
        // dropping the engine wipes the register and the cipher's key schedule
        self.engine = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::Rijndael;

    fn transform(
        mode: CipherMode,
        padding: PaddingMode,
        direction: Direction,
    ) -> SymmetricTransform {
        let cipher = Rijndael::new(&[0x2bu8; 16], 16).unwrap();
        SymmetricTransform::new(Box::new(cipher), mode, padding, direction, &[0x11u8; 16], 16)
            .unwrap()
    }

    #[test]
    fn test_block_sizes() {
        let t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        assert_eq!(t.input_block_size(), 16);
        assert_eq!(t.output_block_size(), 16);
        assert!(t.can_transform_multiple_blocks());
        assert!(t.can_reuse_transform());
    }

    #[test]
    fn test_transform_block_rejects_partial_blocks() {
        for mode in [CipherMode::Ecb, CipherMode::Cbc] {
            for padding in PaddingMode::ALL {
                let mut t = transform(mode, padding, Direction::Encrypt);
                let mut output = [0u8; 32];
                let result = t.transform_block(&[0u8; 17], &mut output);
                assert!(matches!(
                    result,
                    Err(CipherModeError::BlockAlignment {
                        length: 17,
                        block_size: 16
                    })
                ));
            }
        }
    }

    #[test]
    fn test_transform_block_rejects_empty_input() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let mut output = [0u8; 16];
        assert!(matches!(
            t.transform_block(&[], &mut output),
            Err(CipherModeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transform_block_small_output() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let mut output = [0u8; 16];
        assert!(matches!(
            t.transform_block(&[0u8; 32], &mut output),
            Err(CipherModeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transform_block_never_unpads() {
        let mut enc = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let ciphertext = enc.transform_final_block(b"0123456789").unwrap();
        assert_eq!(ciphertext.len(), 16);

        let mut dec = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Decrypt);
        let mut output = [0u8; 16];
        assert_eq!(dec.transform_block(&ciphertext, &mut output).unwrap(), 16);
        assert_eq!(&output[..10], b"0123456789");
        assert_eq!(&output[10..], &[6u8; 6]);
    }

    #[test]
    fn test_split_processing_matches_one_shot() {
        let plaintext = [0xa5u8; 40];
        let mut one_shot = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let expected = one_shot.transform_final_block(&plaintext).unwrap();

        let mut split = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let mut head = [0u8; 32];
        split.transform_block(&plaintext[..32], &mut head).unwrap();
        let tail = split.transform_final_block(&plaintext[32..]).unwrap();

        assert_eq!(&expected[..32], &head);
        assert_eq!(&expected[32..], &tail[..]);
    }

    #[test]
    fn test_final_block_returns_only_new_bytes() {
        let mut dec = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Decrypt);
        let mut enc = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let ciphertext = enc.transform_final_block(&[7u8; 20]).unwrap();

        let mut first = [0u8; 16];
        dec.transform_block(&ciphertext[..16], &mut first).unwrap();
        let last = dec.transform_final_block(&ciphertext[16..]).unwrap();
        assert_eq!(first, [7u8; 16]);
        assert_eq!(last, vec![7u8; 4]);
    }

    #[test]
    fn test_none_padding_partial_final_block_fails() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::None, Direction::Encrypt);
        assert!(matches!(
            t.transform_final_block(&[1u8; 5]),
            Err(CipherModeError::BlockAlignment { .. })
        ));
        assert!(t.transform_final_block(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decrypt_empty_final_block() {
        for padding in PaddingMode::ALL {
            let mut t = transform(CipherMode::Cbc, padding, Direction::Decrypt);
            assert!(t.transform_final_block(&[]).unwrap().is_empty());
        }
    }

    #[test]
    fn test_decrypt_misaligned_final_block() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Decrypt);
        assert!(matches!(
            t.transform_final_block(&[0u8; 15]),
            Err(CipherModeError::BlockAlignment { .. })
        ));
    }

    #[test]
    fn test_reuse_after_final_block() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let first = t.transform_final_block(b"same message").unwrap();
        let second = t.transform_final_block(b"same message").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reuse_after_bad_padding() {
        let mut enc = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let good = enc.transform_final_block(b"payload").unwrap();

        let mut dec = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Decrypt);
        let mut corrupt = good.clone();
        corrupt[15] ^= 0x01;
        let _ = dec.transform_final_block(&corrupt);
        assert_eq!(dec.transform_final_block(&good).unwrap(), b"payload");
    }

    #[test]
    fn test_cleared_transform_is_disposed() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        t.clear();
        let mut output = [0u8; 16];
        assert!(matches!(
            t.transform_block(&[0u8; 16], &mut output),
            Err(CipherModeError::Disposed(_))
        ));
        assert!(matches!(
            t.transform_final_block(&[]),
            Err(CipherModeError::Disposed(_))
        ));
        assert_eq!(t.input_block_size(), 16);
    }

    #[test]
    fn test_offset_forms() {
        let mut t = transform(CipherMode::Ecb, PaddingMode::None, Direction::Encrypt);
        let input = [0u8; 40];
        let mut output = [0u8; 40];

        assert!(matches!(
            t.transform_block_at(&input, 30, 16, &mut output, 0),
            Err(CipherModeError::InvalidArgument(_))
        ));
        assert!(matches!(
            t.transform_block_at(&input, 0, 16, &mut output, 41),
            Err(CipherModeError::InvalidArgument(_))
        ));
        assert!(matches!(
            t.transform_block_at(&input, 0, 16, &mut output, 30),
            Err(CipherModeError::InvalidArgument(_))
        ));
        assert_eq!(
            t.transform_block_at(&input, 8, 32, &mut output, 8).unwrap(),
            32
        );
        assert_eq!(output[8..24], output[24..40]);

        assert!(matches!(
            t.transform_final_block_at(&input, 8, 33),
            Err(CipherModeError::InvalidArgument(_))
        ));
        assert_eq!(t.transform_final_block_at(&input, 8, 16).unwrap().len(), 16);
    }

    fn run_final<T: CryptoTransform>(mut t: T, data: &[u8]) -> Vec<u8> {
        t.transform_final_block(data).unwrap()
    }

    #[test]
    fn test_transform_through_mut_reference() {
        let mut t = transform(CipherMode::Cbc, PaddingMode::Pkcs7, Direction::Encrypt);
        let direct = t.transform_final_block(b"by ref").unwrap();
        let by_ref = run_final(&mut t, b"by ref");
        let boxed: Box<dyn CryptoTransform> = Box::new(transform(
            CipherMode::Cbc,
            PaddingMode::Pkcs7,
            Direction::Encrypt,
        ));
        assert_eq!(direct, run_final(boxed, b"by ref"));
        assert_eq!(direct, by_ref);
        assert_eq!(t.direction(), Direction::Encrypt);
        assert_eq!(t.mode(), CipherMode::Cbc);
        assert_eq!(t.padding(), PaddingMode::Pkcs7);
    }
}
