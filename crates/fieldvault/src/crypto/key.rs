//! [`CipherKey`]: the process-wide field encryption key.

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Filler appended to short secrets.
const PAD_BYTE: u8 = b'0';

/// Errors produced while deriving the key from configuration.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The configured secret is absent or blank.
    #[error("encryption key is missing or empty")]
    Missing,
}

/// Fixed-size key buffer holding exactly [`KEY_LEN`] bytes.
///
/// Built once at startup and moved into [`super::FieldCipher`]. The bytes are
/// overwritten with zeroes when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    /// Derive the key from the configured secret string.
    ///
    /// The UTF-8 bytes of `secret` are right-padded with ASCII `'0'` up to
    /// [`KEY_LEN`] bytes, or truncated to [`KEY_LEN`] bytes when longer. This
    /// matches the key derivation of the ciphertext already in storage.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] if `secret` is empty or only whitespace.
    pub fn from_secret(secret: &str) -> Result<Self, KeyError> {
        if secret.trim().is_empty() {
            return Err(KeyError::Missing);
        }
        let mut buf = [PAD_BYTE; KEY_LEN];
        let bytes = secret.as_bytes();
        let n = bytes.len().min(KEY_LEN);
        buf[..n].copy_from_slice(&bytes[..n]);
        Ok(Self(buf))
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("CipherKey([REDACTED])")
    }
}
