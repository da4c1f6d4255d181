//! Digest computation.
//!
//! This module provides:
//! - The fixed set of supported checksum algorithms
//! - A hasher trait with one implementation per algorithm family
//! - File-level digest computation (chunked, lowercase hex output)

use crate::error::EngineError;
use digest::Digest;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Supported checksum algorithms.
///
/// The set is closed: anything else is rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    /// MD5 (the default, kept for compatibility with existing artifacts)
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    /// BLAKE2b with a 512-bit output
    Blake2b,
    /// BLAKE2s with a 256-bit output
    Blake2s,
    /// BLAKE3 (256-bit)
    Blake3,
}

impl ChecksumAlgorithm {
    /// Every supported algorithm, in the order shown to users.
    pub const ALL: [ChecksumAlgorithm; 13] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
        Self::Blake2b,
        Self::Blake2s,
        Self::Blake3,
    ];

    /// Canonical lowercase name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3_224",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_384 => "sha3_384",
            Self::Sha3_512 => "sha3_512",
            Self::Blake2b => "blake2b",
            Self::Blake2s => "blake2s",
            Self::Blake3 => "blake3",
        }
    }

    /// Comma-separated list of supported names, for error messages and help.
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|algorithm| algorithm.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for ChecksumAlgorithm {
    fn default() -> Self {
        Self::Md5
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = EngineError;

    /// Parse an algorithm name. Case-insensitive; `sha3-256` is accepted for `sha3_256`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.name() == normalized)
            .ok_or_else(|| EngineError::UnsupportedAlgorithm {
                name: s.to_string(),
                supported: Self::supported_names(),
            })
    }
}

/// Incremental hasher producing a lowercase hex digest.
pub trait ChecksumHasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the hex digest
    fn finalize(self: Box<Self>) -> String;
}

/// MD5 hasher (backed by md5 crate)
struct Md5Hasher {
    context: md5::Context,
}

impl ChecksumHasher for Md5Hasher {
    fn update(&mut self, data: &[u8]) {
        self.context.consume(data);
    }

    fn finalize(self: Box<Self>) -> String {
        format!("{:x}", self.context.compute())
    }
}

/// Any RustCrypto `Digest` implementation (SHA-1, SHA-2, SHA-3, BLAKE2).
struct RustCryptoHasher<D> {
    hasher: D,
}

impl<D: Digest + Send> ChecksumHasher for RustCryptoHasher<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn finalize(self: Box<Self>) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// BLAKE3 hasher (backed by blake3 crate)
struct Blake3Hasher {
    hasher: blake3::Hasher,
}

impl ChecksumHasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

fn rust_crypto<D: Digest + Send + 'static>() -> Box<dyn ChecksumHasher> {
    Box::new(RustCryptoHasher { hasher: D::new() })
}

/// Create a new hasher for the given algorithm
pub fn create_hasher(algorithm: ChecksumAlgorithm) -> Box<dyn ChecksumHasher> {
    match algorithm {
        ChecksumAlgorithm::Md5 => Box::new(Md5Hasher {
            context: md5::Context::new(),
        }),
        ChecksumAlgorithm::Sha1 => rust_crypto::<sha1::Sha1>(),
        ChecksumAlgorithm::Sha224 => rust_crypto::<sha2::Sha224>(),
        ChecksumAlgorithm::Sha256 => rust_crypto::<sha2::Sha256>(),
        ChecksumAlgorithm::Sha384 => rust_crypto::<sha2::Sha384>(),
        ChecksumAlgorithm::Sha512 => rust_crypto::<sha2::Sha512>(),
        ChecksumAlgorithm::Sha3_224 => rust_crypto::<sha3::Sha3_224>(),
        ChecksumAlgorithm::Sha3_256 => rust_crypto::<sha3::Sha3_256>(),
        ChecksumAlgorithm::Sha3_384 => rust_crypto::<sha3::Sha3_384>(),
        ChecksumAlgorithm::Sha3_512 => rust_crypto::<sha3::Sha3_512>(),
        ChecksumAlgorithm::Blake2b => rust_crypto::<blake2::Blake2b512>(),
        ChecksumAlgorithm::Blake2s => rust_crypto::<blake2::Blake2s256>(),
        ChecksumAlgorithm::Blake3 => Box::new(Blake3Hasher {
            hasher: blake3::Hasher::new(),
        }),
    }
}

/// Digest an in-memory buffer.
pub fn digest_bytes(data: &[u8], algorithm: ChecksumAlgorithm) -> String {
    let mut hasher = create_hasher(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Compute the hex digest of a file's full contents.
///
/// The file is read in fixed-size chunks; the result is identical to hashing
/// the whole content at once.
pub fn compute_digest(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String, EngineError> {
    let read_error = |source: io::Error| EngineError::ReadError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_error)?;
    let mut hasher = create_hasher(algorithm);
    let mut buffer = vec![0u8; BUF_SIZE];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        }
    }

    Ok(hasher.finalize())
}
