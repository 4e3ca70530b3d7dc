use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use cipher_modes::{
    CipherMode, CryptoConfig, CryptoReader, CryptoWriter, HashTransform, PaddingMode,
    PasswordDeriveBytes, SymmetricAlgorithm,
};
use clap::{Parser, ValueEnum};

/// Command-line arguments for the block cipher tool.
#[derive(Parser, Debug)]
#[command(name = "crypt-tool")]
#[command(about = "Encrypts, decrypts or hashes a file with DES, TripleDES, Rijndael or AES")]
struct Cli {
    /// Path to the input file.
    #[arg(short, long, help = "Path to the input file")]
    file: String,

    /// Path to the output file, stdout if omitted.
    #[arg(short, long, help = "Path to the output file")]
    output: Option<String>,

    /// Operation to perform.
    #[arg(short, long, help = "Operation (encrypt/decrypt/hash)")]
    mode: OperationMode,

    /// Algorithm name as known to the registry.
    #[arg(short, long, default_value = "AES", help = "Cipher or hash name (DES, 3DES, Rijndael, AES, SHA1, SHA256, ...)")]
    algorithm: String,

    /// Chaining mode.
    #[arg(long, value_enum, default_value_t = ChainingMode::Cbc)]
    cipher_mode: ChainingMode,

    /// Padding applied to the final block.
    #[arg(long, value_enum, default_value_t = Padding::Pkcs7)]
    padding: Padding,

    /// CFB feedback size in bits.
    #[arg(long, help = "CFB feedback size in bits (multiple of 8)")]
    feedback: Option<usize>,

    /// Rijndael block size in bits.
    #[arg(long, help = "Block size in bits (Rijndael: 128, 192 or 256)")]
    block_size: Option<usize>,

    /// File containing the key as hex.
    #[arg(short, long, help = "File contains the key as hex")]
    key: Option<String>,

    /// File containing the IV as hex.
    #[arg(long, help = "File contains the IV as hex")]
    iv: Option<String>,

    /// Password to derive the key from (PBKDF1).
    #[arg(long, conflicts_with = "key")]
    password: Option<String>,

    /// Salt for the password derivation, as hex.
    #[arg(long, default_value = "")]
    salt: String,

    /// Hash used by the password derivation.
    #[arg(long, default_value = "SHA256")]
    kdf_hash: String,

    /// Iteration count of the password derivation.
    #[arg(long, default_value_t = 100)]
    iterations: usize,
}

/// Enum representing the operation of the tool.
#[derive(Clone, Debug, ValueEnum)]
enum OperationMode {
    /// Encrypt mode.
    Encrypt,
    /// Decrypt mode.
    Decrypt,
    /// Digest of the input.
    Hash,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChainingMode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
}

impl From<ChainingMode> for CipherMode {
    fn from(mode: ChainingMode) -> Self {
        match mode {
            ChainingMode::Ecb => CipherMode::Ecb,
            ChainingMode::Cbc => CipherMode::Cbc,
            ChainingMode::Cfb => CipherMode::Cfb,
            ChainingMode::Ofb => CipherMode::Ofb,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Padding {
    None,
    Zeros,
    Pkcs7,
    Ansix923,
    Iso10126,
}

impl From<Padding> for PaddingMode {
    fn from(padding: Padding) -> Self {
        match padding {
            Padding::None => PaddingMode::None,
            Padding::Zeros => PaddingMode::Zeros,
            Padding::Pkcs7 => PaddingMode::Pkcs7,
            Padding::Ansix923 => PaddingMode::AnsiX923,
            Padding::Iso10126 => PaddingMode::Iso10126,
        }
    }
}

/// Reads hex data from a file, ignoring whitespace and line breaks
fn read_hex_from_file(filename: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let content = fs::read_to_string(filename)?;
    let hex_string: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if hex_string.is_empty() {
        return Err(format!("{filename} contains no hex data").into());
    }
    Ok(hex::decode(hex_string)?)
}

fn open_output(output: Option<&str>) -> Result<Box<dyn Write>, Box<dyn Error>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

/// Applies the command-line settings and loads, derives or generates key and IV
fn configure(cli: &Cli) -> Result<SymmetricAlgorithm, Box<dyn Error>> {
    let mut alg = CryptoConfig::global()
        .create_symmetric(&cli.algorithm)
        .ok_or_else(|| format!("unknown cipher: {}", cli.algorithm))?;

    alg.set_mode(cli.cipher_mode.into());
    alg.set_padding(cli.padding.into());
    if let Some(bits) = cli.block_size {
        alg.set_block_size(bits)?;
    }
    if let Some(bits) = cli.feedback {
        alg.set_feedback_size(bits)?;
    }

    let decrypting = matches!(cli.mode, OperationMode::Decrypt);
    if let Some(path) = &cli.key {
        alg.set_key(&read_hex_from_file(path)?)?;
    } else if let Some(password) = &cli.password {
        let hash = CryptoConfig::global()
            .create_hash(&cli.kdf_hash)
            .ok_or_else(|| format!("unknown hash: {}", cli.kdf_hash))?;
        let salt = hex::decode(&cli.salt)?;
        let mut pdb = PasswordDeriveBytes::new(password.as_bytes(), &salt, hash, cli.iterations)?;
        let key = pdb.get_bytes(alg.key_size() / 8)?;
        alg.set_key(&key)?;
    } else if decrypting {
        return Err("decryption needs --key or --password".into());
    } else {
        eprintln!("generated key: {}", hex::encode(alg.key()));
    }

    if let Some(path) = &cli.iv {
        alg.set_iv(&read_hex_from_file(path)?)?;
    } else if alg.mode().uses_iv() {
        if decrypting {
            return Err(format!("{} decryption needs --iv", alg.mode()).into());
        }
        eprintln!("generated IV: {}", hex::encode(alg.iv()));
    }

    Ok(alg)
}

fn encrypt(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut alg = configure(cli)?;
    let mut input = BufReader::new(File::open(&cli.file)?);
    let output = open_output(cli.output.as_deref())?;

    let mut writer = CryptoWriter::new(output, alg.create_encryptor()?);
    io::copy(&mut input, &mut writer)?;
    writer.close()?;
    Ok(())
}

fn decrypt(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut alg = configure(cli)?;
    let input = BufReader::new(File::open(&cli.file)?);
    let mut output = open_output(cli.output.as_deref())?;

    let mut reader = CryptoReader::new(input, alg.create_decryptor()?);
    io::copy(&mut reader, &mut output)?;
    reader.close()?;
    output.flush()?;
    Ok(())
}

fn hash(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let hasher = CryptoConfig::global()
        .create_hash(&cli.algorithm)
        .ok_or_else(|| format!("unknown hash: {}", cli.algorithm))?;
    let mut transform = HashTransform::new(hasher);

    let input = BufReader::new(File::open(&cli.file)?);
    let mut reader = CryptoReader::new(input, &mut transform);
    io::copy(&mut reader, &mut io::sink())?;
    reader.close()?;

    let digest = transform.hash().ok_or("digest was not produced")?;
    let mut output = open_output(cli.output.as_deref())?;
    writeln!(output, "{}", hex::encode(digest))?;
    output.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.mode {
        OperationMode::Encrypt => encrypt(&cli),
        OperationMode::Decrypt => decrypt(&cli),
        OperationMode::Hash => hash(&cli),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("crypt-tool-{}-{name}", std::process::id()))
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("crypt-tool").chain(args.iter().copied()))
    }

    #[test]
    fn test_read_hex_from_file_ignores_whitespace() {
        let path = temp_path("key.hex");
        fs::write(&path, "01 23 45 67\n89 ab cd ef\n").unwrap();
        let bytes = read_hex_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, hex::decode("0123456789abcdef").unwrap());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_encrypt_then_decrypt_file() {
        let plain = temp_path("plain.txt");
        let sealed = temp_path("sealed.bin");
        let opened = temp_path("opened.txt");
        let key = temp_path("des.key");
        let iv = temp_path("des.iv");
        fs::write(&plain, b"Now is the time for all ").unwrap();
        fs::write(&key, "0123456789abcdef").unwrap();
        fs::write(&iv, "1234567890abcdef").unwrap();

        let common = [
            "-a", "DES",
            "-k", key.to_str().unwrap(),
            "--iv", iv.to_str().unwrap(),
        ];
        let mut args = vec!["-m", "encrypt", "-f", plain.to_str().unwrap(), "-o", sealed.to_str().unwrap()];
        args.extend(common);
        encrypt(&cli(&args)).unwrap();
        assert_eq!(
            hex::encode_upper(fs::read(&sealed).unwrap()),
            "E5C7CDDE872BF27C43E934008C389C0F683788499A7C05F662C16A27E4FCF277"
        );

        let mut args = vec!["-m", "decrypt", "-f", sealed.to_str().unwrap(), "-o", opened.to_str().unwrap()];
        args.extend(common);
        decrypt(&cli(&args)).unwrap();
        assert_eq!(fs::read(&opened).unwrap(), b"Now is the time for all ");

        for path in [plain, sealed, opened, key, iv] {
            fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn test_hash_file() {
        let input = temp_path("abc.txt");
        let output = temp_path("abc.sha1");
        fs::write(&input, b"abc").unwrap();
        hash(&cli(&[
            "-m", "hash",
            "-a", "SHA1",
            "-f", input.to_str().unwrap(),
            "-o", output.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap().trim(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        fs::remove_file(input).unwrap();
        fs::remove_file(output).unwrap();
    }

    #[test]
    fn test_password_derived_key() {
        let cli = cli(&[
            "-m", "encrypt",
            "-f", "unused",
            "-a", "3DES",
            "--password", "secret",
            "--salt", "73616c74",
            "--cipher-mode", "ecb",
        ]);
        let mut alg = configure(&cli).unwrap();
        assert_eq!(alg.key().len(), 24);
        assert_eq!(alg.mode(), CipherMode::Ecb);
    }

    #[test]
    fn test_decrypt_requires_key() {
        let cli = cli(&["-m", "decrypt", "-f", "unused", "-a", "AES"]);
        assert!(configure(&cli).is_err());
    }

    #[test]
    fn test_unknown_algorithm() {
        let cli = cli(&["-m", "encrypt", "-f", "unused", "-a", "RC2"]);
        assert!(configure(&cli).is_err());
    }
}
