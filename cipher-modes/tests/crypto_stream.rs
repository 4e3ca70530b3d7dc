//! Crypto stream scenarios through the public API

use std::io::{self, Read, Write};

use cipher_modes::{
    CipherMode, CipherModeError, CryptoReader, CryptoStream, CryptoTransform, CryptoWriter,
    HashTransform, PaddingMode, SymmetricAlgorithm, SymmetricTransform,
};
use digest::Digest;

#[derive(Default)]
struct RawStream {
    data: Vec<u8>,
    flushes: usize,
}

impl Write for RawStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Reader that hands out at most `step` bytes per call
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn des() -> SymmetricAlgorithm {
    let mut des = SymmetricAlgorithm::des();
    des.set_key(&hex::decode("0123456789abcdef").unwrap()).unwrap();
    des.set_iv(&[0u8; 8]).unwrap();
    des
}

#[test]
fn test_des_write_2200_zero_bytes() {
    let mut raw = RawStream::default();
    let mut writer = CryptoWriter::new(&mut raw, des().create_encryptor().unwrap());
    writer.write_all(&[0u8; 2200]).unwrap();
    writer.flush_final_block().unwrap();
    writer.close().unwrap();

    assert_eq!(raw.data.len(), 2208);
    assert_eq!(raw.flushes, 1);

    let tail = des()
        .create_decryptor()
        .unwrap()
        .transform_final_block(&raw.data)
        .unwrap();
    assert_eq!(tail, vec![0u8; 2200]);
}

#[test]
fn test_nested_hash_streams_flush_once() {
    let mut raw = RawStream::default();
    let mut inner_hash = HashTransform::new(sha1::Sha1::new());
    let mut outer_hash = HashTransform::new(sha1::Sha1::new());
    {
        let inner = CryptoWriter::new(&mut raw, &mut inner_hash);
        let mut outer = CryptoWriter::new(inner, &mut outer_hash);
        outer.write_all(b"The quick brown fox").unwrap();
        outer.flush().unwrap();
    }

    assert_eq!(raw.flushes, 1);
    assert_eq!(raw.data, b"The quick brown fox");
    let expected = sha1::Sha1::digest(b"The quick brown fox");
    assert_eq!(inner_hash.hash().unwrap(), expected.as_slice());
    assert_eq!(outer_hash.hash().unwrap(), expected.as_slice());
}

#[test]
fn test_hash_over_cipher_stream() {
    let mut raw = RawStream::default();
    let mut hash = HashTransform::new(sha2::Sha256::new());
    {
        let cipher = CryptoWriter::new(&mut raw, des().create_encryptor().unwrap());
        let mut outer = CryptoWriter::new(cipher, &mut hash);
        outer.write_all(b"hash me, then encrypt me").unwrap();
    }
    assert_eq!(raw.flushes, 1);
    assert_eq!(raw.data.len(), 32);
    assert_eq!(
        hash.hash().unwrap(),
        sha2::Sha256::digest(b"hash me, then encrypt me").as_slice()
    );
}

#[test]
fn test_reader_handles_short_reads() {
    let plaintext: Vec<u8> = (0..=255u8).cycle().take(777).collect();
    let ciphertext = des()
        .create_encryptor()
        .unwrap()
        .transform_final_block(&plaintext)
        .unwrap();

    for step in [1, 5, 8, 13, 4096] {
        let source = Trickle {
            data: &ciphertext,
            step,
        };
        let mut reader = CryptoReader::new(source, des().create_decryptor().unwrap());
        let mut recovered = Vec::new();
        reader.read_to_end(&mut recovered).unwrap();
        assert_eq!(recovered, plaintext, "step {step}");
        assert!(reader.has_flushed_final_block());
    }
}

#[test]
fn test_cfb8_stream_byte_by_byte() {
    let mut alg = des();
    alg.set_mode(CipherMode::Cfb);
    alg.set_padding(PaddingMode::None);
    alg.set_iv(&hex::decode("1234567890abcdef").unwrap()).unwrap();

    let mut out = Vec::new();
    {
        let mut writer = CryptoWriter::new(&mut out, alg.create_encryptor().unwrap());
        for byte in b"Now is theXXXXXX" {
            writer.write_all(&[*byte]).unwrap();
        }
    }
    assert_eq!(
        hex::encode_upper(&out),
        "F31FDA07011462EE187F3B1CEB1104E9"
    );

    let mut reader = CryptoReader::new(&out[..], alg.create_decryptor().unwrap());
    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    assert_eq!(text, "Now is theXXXXXX");
}

#[test]
fn test_hash_reader_without_reads_finalizes_on_drop() {
    let mut hash = HashTransform::new(sha1::Sha1::new());
    drop(CryptoReader::new(io::empty(), &mut hash));
    assert_eq!(
        hex::encode(hash.hash().unwrap()),
        "da39a3ee5e6b4b0d3255bfef95601890afd80709"
    );
}

#[test]
fn test_hash_reader_passes_data_through() {
    let mut hash = HashTransform::new(md5::Md5::new());
    let mut reader = CryptoReader::new(&b"abc"[..], &mut hash);
    let mut data = Vec::new();
    reader.read_to_end(&mut data).unwrap();
    drop(reader);
    assert_eq!(data, b"abc");
    assert_eq!(
        hex::encode(hash.hash().unwrap()),
        "900150983cd24fb0d6963f7d28e17f72"
    );
}

#[test]
fn test_shared_transform_is_reused_across_streams() {
    let mut encryptor: SymmetricTransform = des().create_encryptor().unwrap();
    let mut first = Vec::new();
    CryptoWriter::new(&mut first, &mut encryptor)
        .close()
        .unwrap();
    let mut second = Vec::new();
    CryptoWriter::new(&mut second, &mut encryptor)
        .close()
        .unwrap();
    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
}

#[test]
fn test_truncated_ciphertext_is_reported() {
    let ciphertext = des()
        .create_encryptor()
        .unwrap()
        .transform_final_block(b"sixteen byte msg")
        .unwrap();
    let mut reader = CryptoReader::new(
        &ciphertext[..ciphertext.len() - 3],
        des().create_decryptor().unwrap(),
    );
    let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(matches!(
        CipherModeError::from_io(&err),
        Some(CipherModeError::BlockAlignment { .. })
    ));
}

#[test]
fn test_close_after_explicit_final_block() {
    let mut raw = RawStream::default();
    let mut writer = CryptoWriter::new(&mut raw, des().create_encryptor().unwrap());
    writer.write_all(b"abc").unwrap();
    writer.flush_final_block().unwrap();
    assert!(writer.has_flushed_final_block());
    writer.close().unwrap();
    assert_eq!(raw.data.len(), 8);
    assert_eq!(raw.flushes, 1);
}

#[test]
fn test_reader_does_not_report_eof_after_bad_padding() {
    let mut ciphertext = des()
        .create_encryptor()
        .unwrap()
        .transform_final_block(b"12345678")
        .unwrap();
    // the padding block now decrypts to ...09 instead of ...08
    ciphertext[7] ^= 1;

    let mut reader = CryptoReader::new(&ciphertext[..], des().create_decryptor().unwrap());
    let mut buf = [0u8; 64];
    assert_eq!(reader.read(&mut buf).unwrap(), 8);

    let err = reader.read(&mut buf).unwrap_err();
    assert!(matches!(
        CipherModeError::from_io(&err),
        Some(CipherModeError::BadPadding)
    ));
    for _ in 0..2 {
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}

#[test]
fn test_reader_does_not_report_eof_after_truncation() {
    let ciphertext = des()
        .create_encryptor()
        .unwrap()
        .transform_final_block(b"sixteen byte msg")
        .unwrap();
    let mut reader = CryptoReader::new(&ciphertext[..20], des().create_decryptor().unwrap());
    assert!(reader.read_to_end(&mut Vec::new()).is_err());
    assert!(reader.read_to_end(&mut Vec::new()).is_err());
}
