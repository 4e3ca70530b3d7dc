//! Name based lookup of algorithms
//!
//! [`CryptoConfig`] maps friendly and fully qualified names to factories.
//! Lookups ignore ASCII case. The table is built once per process.

use std::collections::HashMap;
use std::sync::OnceLock;

use digest::Digest;

use crate::ciphers::{self, AlgorithmInfo};
use crate::hash::HashAlgorithm;
use crate::symmetric::SymmetricAlgorithm;

type HashFactory = fn() -> Box<dyn HashAlgorithm>;

#[derive(Clone, Copy)]
enum Factory {
    Symmetric(&'static AlgorithmInfo),
    Hash(HashFactory),
}

#[derive(Clone, Copy)]
struct Entry {
    canonical: &'static str,
    oid: Option<&'static str>,
    factory: Factory,
}

const PREFIX: &str = "System.Security.Cryptography.";

/// Canonical name, OID, factory, aliases
static TABLE: &[(&str, Option<&str>, Factory, &[&str])] = &[
    ("DES", Some("1.3.14.3.2.7"), Factory::Symmetric(&ciphers::DES), &[]),
    (
        "TripleDES",
        Some("1.2.840.113549.3.7"),
        Factory::Symmetric(&ciphers::TRIPLE_DES),
        &["3DES", "Triple DES"],
    ),
    ("Rijndael", None, Factory::Symmetric(&ciphers::RIJNDAEL), &[]),
    ("AES", None, Factory::Symmetric(&ciphers::AES), &[]),
    ("SHA1", Some("1.3.14.3.2.26"), Factory::Hash(new_sha1), &["SHA", "SHA-1"]),
    (
        "SHA256",
        Some("2.16.840.1.101.3.4.2.1"),
        Factory::Hash(new_sha256),
        &["SHA-256"],
    ),
    (
        "SHA384",
        Some("2.16.840.1.101.3.4.2.2"),
        Factory::Hash(new_sha384),
        &["SHA-384"],
    ),
    (
        "SHA512",
        Some("2.16.840.1.101.3.4.2.3"),
        Factory::Hash(new_sha512),
        &["SHA-512"],
    ),
    ("MD5", Some("1.2.840.113549.2.5"), Factory::Hash(new_md5), &[]),
];

fn new_sha1() -> Box<dyn HashAlgorithm> {
    Box::new(sha1::Sha1::new())
}

fn new_sha256() -> Box<dyn HashAlgorithm> {
    Box::new(sha2::Sha256::new())
}

fn new_sha384() -> Box<dyn HashAlgorithm> {
    Box::new(sha2::Sha384::new())
}

fn new_sha512() -> Box<dyn HashAlgorithm> {
    Box::new(sha2::Sha512::new())
}

fn new_md5() -> Box<dyn HashAlgorithm> {
    Box::new(md5::Md5::new())
}

/// Process wide algorithm registry.
pub struct CryptoConfig {
    entries: HashMap<String, Entry>,
}

static CONFIG: OnceLock<CryptoConfig> = OnceLock::new();

impl CryptoConfig {
    pub fn global() -> &'static CryptoConfig {
        CONFIG.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut entries = HashMap::new();
        for &(canonical, oid, factory, aliases) in TABLE {
            let entry = Entry {
                canonical,
                oid,
                factory,
            };
            entries.insert(canonical.to_ascii_lowercase(), entry);
            entries.insert(format!("{PREFIX}{canonical}").to_ascii_lowercase(), entry);
            for alias in aliases {
                entries.insert(alias.to_ascii_lowercase(), entry);
            }
        }
        log::debug!("algorithm registry built with {} names", entries.len());
        Self { entries }
    }

    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.get(&name.trim().to_ascii_lowercase())
    }

    /// Canonical name registered for `name`
    pub fn canonical_name(&self, name: &str) -> Option<&'static str> {
        self.lookup(name).map(|entry| entry.canonical)
    }

    /// New symmetric algorithm with default settings
    pub fn create_symmetric(&self, name: &str) -> Option<SymmetricAlgorithm> {
        match self.lookup(name)?.factory {
            Factory::Symmetric(info) => Some(SymmetricAlgorithm::new(info)),
            Factory::Hash(_) => None,
        }
    }

    /// New hash algorithm in its initial state
    pub fn create_hash(&self, name: &str) -> Option<Box<dyn HashAlgorithm>> {
        match self.lookup(name)?.factory {
            Factory::Hash(factory) => Some(factory()),
            Factory::Symmetric(_) => None,
        }
    }

    /// Dotted ASN.1 object identifier for `name`, when one is assigned
    pub fn map_name_to_oid(&self, name: &str) -> Option<&'static str> {
        self.lookup(name)?.oid
    }
}
