//! Digest computation
//!
//! Maps a plaintext to the lowercase hex digest used as the table key.

use crate::error::DigestError;
use blake2::Blake2b512;
use digest::Digest;
use sha2::{Sha256, Sha512};
use sha3::Sha3_256;
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Blake2b512,
    Sha3_256,
}

impl DigestAlgorithm {
    /// Every supported algorithm, in help-text order
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Blake2b512,
        DigestAlgorithm::Sha3_256,
    ];

    /// Label written to the table header
    pub fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake2b512 => "blake2b512",
            Self::Sha3_256 => "sha3-256",
        }
    }

    /// Digest length in bytes
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 | Self::Sha3_256 => 32,
            Self::Sha512 | Self::Blake2b512 => 64,
        }
    }

    /// Compute the binary digest of `plaintext`
    ///
    /// The digest covers the bytes exactly as given; no text decoding or
    /// normalization is applied.
    pub fn digest(self, plaintext: impl AsRef<[u8]>) -> Vec<u8> {
        let bytes = plaintext.as_ref();
        match self {
            Self::Sha256 => Sha256::digest(bytes).to_vec(),
            Self::Sha512 => Sha512::digest(bytes).to_vec(),
            Self::Blake2b512 => Blake2b512::digest(bytes).to_vec(),
            Self::Sha3_256 => Sha3_256::digest(bytes).to_vec(),
        }
    }

    /// Compute the lowercase hex digest of `plaintext`
    pub fn digest_hex(self, plaintext: impl AsRef<[u8]>) -> String {
        hex::encode(self.digest(plaintext))
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algo| algo.label() == s)
            .ok_or_else(|| DigestError::UnsupportedAlgorithm(s.to_string()))
    }
}
