//! AES-256-CBC field encryption primitives.
//!
//! This module is free of entity, policy and persistence concerns. It provides
//! the key type, the encrypt/decrypt operations on single text values, and the
//! heuristic that decides whether a value is already ciphertext.
//!
//! # Ciphertext format
//!
//! ```text
//! base64-standard( IV (16 bytes) || AES-256-CBC-PKCS7(utf8(plaintext)) )
//! ```
//!
//! There is no version prefix and no authentication tag; the format is kept
//! byte-compatible with ciphertext already stored by the health-center
//! database.

pub mod cipher;
pub mod heuristic;
pub mod key;

pub use cipher::{CipherError, FieldCipher, IV_LEN};
pub use heuristic::looks_encrypted;
pub use key::{CipherKey, KeyError, KEY_LEN};
