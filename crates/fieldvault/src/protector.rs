//! [`DataProtector`]: the cipher and the decryption policy behind one service.
//!
//! The `try_*` methods return the cipher's `Result` for callers that want to
//! attach their own context (the field sweep logs entity and field names).
//! The plain methods keep the fail-open contract of the stored data: on any
//! cryptographic failure the input comes back unchanged and an error is
//! logged.

use tracing::{error, info};

use crate::crypto::{looks_encrypted, CipherError, FieldCipher};
use crate::policy::{Caller, DecryptionPolicy, ACCESS_DENIED};

/// Encrypts values, and decrypts them for authorized callers.
#[derive(Clone, Debug)]
pub struct DataProtector {
    cipher: FieldCipher,
    policy: DecryptionPolicy,
}

impl DataProtector {
    pub fn new(cipher: FieldCipher, policy: DecryptionPolicy) -> Self {
        Self { cipher, policy }
    }

    /// Encrypt `plaintext`. Empty input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Propagates [`CipherError`] from the cipher.
    pub fn try_encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        self.cipher.encrypt(plaintext)
    }

    /// Encrypt `plaintext`, returning it unchanged if encryption fails.
    pub fn encrypt(&self, plaintext: &str) -> String {
        match self.cipher.encrypt(plaintext) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "encryption failed; value left unchanged");
                plaintext.to_owned()
            }
        }
    }

    /// Decrypt `token`. `Ok(None)` means the value is empty or not ciphertext.
    ///
    /// # Errors
    ///
    /// Propagates [`CipherError`] from the cipher.
    pub fn try_decrypt(&self, token: &str) -> Result<Option<String>, CipherError> {
        self.cipher.decrypt(token)
    }

    /// Decrypt `token`, returning it unchanged when it is not ciphertext or
    /// when decryption fails.
    pub fn decrypt(&self, token: &str) -> String {
        match self.cipher.decrypt(token) {
            Ok(Some(plaintext)) => plaintext,
            Ok(None) => token.to_owned(),
            Err(e) => {
                error!(error = %e, "decryption failed; value left unchanged");
                token.to_owned()
            }
        }
    }

    /// Whether `text` is classified as possibly-encrypted.
    pub fn looks_encrypted(&self, text: &str) -> bool {
        looks_encrypted(text)
    }

    /// Whether `caller` may see decrypted values.
    pub fn can_decrypt(&self, caller: &Caller) -> bool {
        self.policy.can_decrypt(caller)
    }

    /// Decrypt `token` for `caller`, or return [`ACCESS_DENIED`] if the
    /// caller is not authorized.
    pub fn decrypt_for_caller(&self, token: &str, caller: &Caller) -> String {
        if !self.can_decrypt(caller) {
            info!("caller not authorized to decrypt; returning sentinel");
            return ACCESS_DENIED.to_owned();
        }
        self.decrypt(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CipherKey;

    fn protector() -> DataProtector {
        let key = CipherKey::from_secret("unit-test-secret").unwrap();
        DataProtector::new(FieldCipher::new(key), DecryptionPolicy::default())
    }

    fn nurse() -> Caller {
        Caller::authenticated("nurse.joy", ["Nurse"].into_iter().collect())
    }

    #[test]
    fn authorized_round_trip() {
        let p = protector();
        let token = p.encrypt("Juan Dela Cruz");
        assert_ne!(token, "Juan Dela Cruz");
        assert_eq!(p.decrypt_for_caller(&token, &nurse()), "Juan Dela Cruz");
    }

    #[test]
    fn unauthorized_gets_sentinel() {
        let p = protector();
        let token = p.encrypt("Juan Dela Cruz");
        let no_roles = Caller::authenticated("guest", Default::default());
        assert_eq!(p.decrypt_for_caller(&token, &no_roles), ACCESS_DENIED);
        assert_eq!(p.decrypt_for_caller(&token, &Caller::Anonymous), ACCESS_DENIED);
    }

    #[test]
    fn plaintext_passes_through_decrypt() {
        let p = protector();
        assert_eq!(p.decrypt("Barangay 161"), "Barangay 161");
        assert_eq!(p.decrypt(""), "");
        assert_eq!(p.encrypt(""), "");
    }

    #[test]
    fn truncated_token_is_returned_unchanged() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let p = protector();
        let token = p.encrypt("2025-01-21");
        let mut raw = STANDARD.decode(&token).unwrap();
        raw.truncate(raw.len() - 3);
        let corrupted = STANDARD.encode(raw);
        assert!(p.looks_encrypted(&corrupted));
        assert!(p.try_decrypt(&corrupted).is_err());
        assert_eq!(p.decrypt_for_caller(&corrupted, &nurse()), corrupted);
    }

    #[test]
    fn tampered_token_never_yields_the_original() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let p = protector();
        let token = p.encrypt("2025-01-21");
        let mut raw = STANDARD.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = STANDARD.encode(raw);
        // CBC is unauthenticated: a flipped bit either breaks the padding,
        // and the token comes back, or decrypts to different text.
        let out = p.decrypt_for_caller(&tampered, &nurse());
        assert_ne!(out, "2025-01-21");
    }

    #[test]
    fn classification_is_exposed() {
        let p = protector();
        assert!(p.looks_encrypted(&p.encrypt("x")));
        assert!(!p.looks_encrypted("x"));
    }
}
