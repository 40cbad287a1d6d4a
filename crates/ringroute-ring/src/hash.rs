//! Hash functions that place vnodes and keys on the ring.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maps arbitrary bytes to a position on the `u64` ring.
///
/// Implementations must be total and deterministic: the same bytes always
/// produce the same position, for the whole lifetime of a ring. The ring
/// relies on nothing else, so any well-distributed hash works.
///
/// Closures `Fn(&[u8]) -> u64` implement this trait, which lets tests pin
/// vnodes and keys to exact positions.
pub trait HashFunction {
    /// Hash `bytes` to a ring position.
    fn hash(&self, bytes: &[u8]) -> u64;
}

impl<F> HashFunction for F
where
    F: Fn(&[u8]) -> u64,
{
    fn hash(&self, bytes: &[u8]) -> u64 {
        self(bytes)
    }
}

/// BLAKE3 truncated to its first 8 bytes, read as little-endian `u64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Hash;

impl HashFunction for Blake3Hash {
    fn hash(&self, bytes: &[u8]) -> u64 {
        let hash = blake3::hash(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}

/// 64-bit XXH3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hash;

impl HashFunction for Xxh3Hash {
    fn hash(&self, bytes: &[u8]) -> u64 {
        xxhash_rust::xxh3::xxh3_64(bytes)
    }
}

/// Hash algorithm selected at runtime (e.g. from a config file).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// [`Blake3Hash`].
    #[default]
    Blake3,
    /// [`Xxh3Hash`].
    Xxh3,
}

impl HashFunction for HashAlgorithm {
    fn hash(&self, bytes: &[u8]) -> u64 {
        match self {
            Self::Blake3 => Blake3Hash.hash(bytes),
            Self::Xxh3 => Xxh3Hash.hash(bytes),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => f.write_str("blake3"),
            Self::Xxh3 => f.write_str("xxh3"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "xxh3" => Ok(Self::Xxh3),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}
