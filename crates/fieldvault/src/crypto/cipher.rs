//! AES-256-CBC encryption and decryption of individual text fields.
//!
//! **Mode:** CBC with PKCS#7 padding and a fresh random 16-byte IV per call.
//! There is no authentication tag: a flipped ciphertext bit either breaks the
//! padding check or decrypts to garbage. The mode is kept for compatibility
//! with existing stored ciphertext.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use super::heuristic::looks_encrypted;
use super::key::CipherKey;

/// Byte length of the CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Errors produced by the cipher layer.
///
/// None of the variants carry the offending value: they are logged, and the
/// value may be sensitive.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The OS random source failed to produce an IV.
    #[error("random IV generation failed")]
    Randomness,

    /// The key or IV could not be loaded into the block cipher.
    #[error("invalid key or IV length")]
    InvalidLength,

    /// The token is not standard base64.
    #[error("token is not valid base64")]
    Encoding,

    /// The ciphertext is not a whole number of blocks or its padding is wrong
    /// (corrupted data or the wrong key).
    #[error("ciphertext padding check failed")]
    Padding,

    /// The decrypted bytes are not UTF-8.
    #[error("decrypted bytes are not valid UTF-8")]
    Utf8,
}

/// Text-field cipher bound to the process key.
///
/// Stateless apart from the immutable key; safe to share across threads.
#[derive(Clone, Debug)]
pub struct FieldCipher {
    key: CipherKey,
}

impl FieldCipher {
    /// Create a cipher for `key`.
    pub fn new(key: CipherKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` into a base64 `IV || ciphertext` token.
    ///
    /// Empty input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Randomness`] if no IV could be drawn from the OS
    /// CSPRNG.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|_| CipherError::Randomness)?;

        let ciphertext = Aes256CbcEnc::new_from_slices(self.key.as_bytes(), &iv)
            .map_err(|_| CipherError::InvalidLength)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut token = Vec::with_capacity(IV_LEN + ciphertext.len());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(token))
    }

    /// Decrypt a token produced by [`FieldCipher::encrypt`].
    ///
    /// Returns `Ok(None)` when `token` is empty or is not classified as
    /// ciphertext by [`looks_encrypted`]: the caller keeps the value as is.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Padding`] for corrupted ciphertext or a wrong
    /// key, and [`CipherError::Utf8`] if the plaintext is not UTF-8.
    pub fn decrypt(&self, token: &str) -> Result<Option<String>, CipherError> {
        if !looks_encrypted(token) {
            return Ok(None);
        }

        let raw = STANDARD.decode(token).map_err(|_| CipherError::Encoding)?;
        let (iv, ciphertext) = raw.split_at(IV_LEN);

        let plaintext = Aes256CbcDec::new_from_slices(self.key.as_bytes(), iv)
            .map_err(|_| CipherError::InvalidLength)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::Padding)?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|_| CipherError::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    fn random_cipher() -> FieldCipher {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        FieldCipher::new(CipherKey::from_bytes(key))
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = random_cipher();
        let token = cipher.encrypt("Juan Dela Cruz").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap().as_deref(), Some("Juan Dela Cruz"));
    }

    #[test]
    fn multibyte_text_round_trips() {
        let cipher = random_cipher();
        let token = cipher.encrypt("Sto. Niño, Parañaque").unwrap();
        assert_eq!(
            cipher.decrypt(&token).unwrap().as_deref(),
            Some("Sto. Niño, Parañaque")
        );
    }

    #[test]
    fn token_layout_is_iv_plus_whole_blocks() {
        let cipher = random_cipher();
        let token = cipher.encrypt("Male").unwrap();
        let raw = STANDARD.decode(&token).unwrap();
        // 4 bytes of plaintext pad to one block.
        assert_eq!(raw.len(), IV_LEN + 16);
    }

    #[test]
    fn fresh_iv_per_call() {
        let cipher = random_cipher();
        let a = cipher.encrypt("09913933498").unwrap();
        let b = cipher.encrypt("09913933498").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), cipher.decrypt(&b).unwrap());
    }

    #[test]
    fn empty_passthrough() {
        let cipher = random_cipher();
        assert_eq!(cipher.encrypt("").unwrap(), "");
        assert_eq!(cipher.decrypt("").unwrap(), None);
    }

    #[test]
    fn plaintext_is_not_decrypted() {
        let cipher = random_cipher();
        assert_eq!(cipher.decrypt("Baesa Health Center").unwrap(), None);
    }

    #[test]
    fn wrong_key_fails_or_garbles() {
        let a = random_cipher();
        let b = random_cipher();
        let token = a.encrypt("renier@example.com").unwrap();
        // Without a tag, a wrong key is only caught when padding or UTF-8 breaks.
        match b.decrypt(&token) {
            Err(_) => {}
            Ok(Some(text)) => assert_ne!(text, "renier@example.com"),
            Ok(None) => panic!("token must be classified as ciphertext"),
        }
    }

    #[test]
    fn iv_only_token_fails_padding() {
        let cipher = random_cipher();
        let token = STANDARD.encode([0u8; IV_LEN]);
        assert_eq!(cipher.decrypt(&token), Err(CipherError::Padding));
    }

    #[test]
    fn partial_block_fails_padding() {
        let cipher = random_cipher();
        let token = STANDARD.encode([0u8; IV_LEN + 5]);
        assert_eq!(cipher.decrypt(&token), Err(CipherError::Padding));
    }

    #[test]
    fn tampered_last_block_is_detected() {
        let cipher = random_cipher();
        let token = cipher.encrypt("Baesa").unwrap();
        let mut raw = STANDARD.decode(&token).unwrap();
        // Flipping the IV byte that lines up with the final pad byte of a
        // single-block message turns 0x0b padding into an invalid value.
        raw[IV_LEN - 1] ^= 0x80;
        let tampered = STANDARD.encode(raw);
        assert_eq!(cipher.decrypt(&tampered), Err(CipherError::Padding));
    }

    #[test]
    fn known_key_interoperates() {
        // Fixed key and IV: the token must decode with the same layout the
        // stored data uses.
        let key = CipherKey::from_secret("BHCARE_DataEncryption_Key_2024_Secure_32Chars").unwrap();
        let cipher = FieldCipher::new(key.clone());
        let iv = [0x11u8; IV_LEN];
        let ct = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(b"Baesa Health Center");
        let mut raw = iv.to_vec();
        raw.extend_from_slice(&ct);
        let token = STANDARD.encode(raw);
        assert_eq!(
            cipher.decrypt(&token).unwrap().as_deref(),
            Some("Baesa Health Center")
        );
    }
}
