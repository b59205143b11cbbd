//! Classification of stored values as "possibly ciphertext" or plaintext.
//!
//! Stored fields carry no marker telling whether they were encrypted, so the
//! decrypt path guesses: a value is treated as ciphertext when it is valid
//! standard base64 decoding to at least one IV's worth of bytes. Plaintext that
//! happens to satisfy this (long, padding-correct base64-alphabet words) is
//! misclassified; decryption then fails and the value is returned unchanged.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::cipher::IV_LEN;

/// Returns `true` if `text` may be a ciphertext token.
///
/// Empty input, invalid base64 and decodings shorter than [`IV_LEN`] bytes are
/// all classified as plaintext.
pub fn looks_encrypted(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    match STANDARD.decode(text) {
        Ok(bytes) => bytes.len() >= IV_LEN,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_plaintext() {
        assert!(!looks_encrypted(""));
    }

    #[test]
    fn names_with_spaces_are_plaintext() {
        assert!(!looks_encrypted("Juan Dela Cruz"));
    }

    #[test]
    fn fifteen_decoded_bytes_is_plaintext() {
        let token = STANDARD.encode([7u8; 15]);
        assert!(!looks_encrypted(&token));
    }

    #[test]
    fn sixteen_decoded_bytes_may_be_ciphertext() {
        let token = STANDARD.encode([7u8; 16]);
        assert!(looks_encrypted(&token));
    }

    #[test]
    fn bad_padding_is_plaintext() {
        let mut token = STANDARD.encode([1u8; 32]);
        token.pop();
        assert!(!looks_encrypted(&token));
    }

    #[test]
    fn base64_looking_plaintext_is_misclassified() {
        // 24 base64-alphabet characters decode to 18 bytes.
        assert!(looks_encrypted("BaesaHealthCenterRecords"));
    }
}
