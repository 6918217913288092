//! Table record
//!
//! One (digest, plaintext) pair. Both fields are owned copies of the caller's
//! buffers.

use std::collections::TryReserveError;

/// A digest and the plaintext that produced it
///
/// File format: `digest_hex<TAB>plaintext`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    plaintext: String,
    digest_hex: String,
}

impl Record {
    /// Copy both fields into a new record
    ///
    /// Fails without leaving anything behind if either copy cannot be
    /// allocated.
    pub fn new(plaintext: &str, digest_hex: &str) -> Result<Self, TryReserveError> {
        let plaintext = copy_str(plaintext)?;
        let digest_hex = copy_str(digest_hex)?;
        Ok(Self {
            plaintext,
            digest_hex,
        })
    }

    /// Recovered plaintext
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// Lowercase hex digest (lookup key)
    pub fn digest_hex(&self) -> &str {
        &self.digest_hex
    }
}

fn copy_str(s: &str) -> Result<String, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve_exact(s.len())?;
    owned.push_str(s);
    Ok(owned)
}
