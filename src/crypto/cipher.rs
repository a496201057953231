use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};
use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// The fixed salt for the key derivation.
const KDF_SALT: &[u8] = b"padlock_kdf_salt";
/// The PBKDF2 iteration count.
const KDF_ITERATIONS: u32 = 100_000;

/// The symmetric cipher that protects credential secrets.
///
/// The key is derived once at process start from the configured passphrase
/// and zeroized on drop. Ciphertext tokens are opaque
/// `base64(nonce || ciphertext)` strings; the GCM tag makes tampering
/// detectable.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretCipher {
    key: [u8; KEY_SIZE],
}

impl SecretCipher {
    /// Derives the cipher key from a passphrase with PBKDF2-HMAC-SHA256.
    pub fn derive(passphrase: &str) -> Self {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), KDF_SALT, KDF_ITERATIONS, &mut key);
        Self { key }
    }

    /// Encrypts a plaintext secret into an opaque ciphertext token.
    ///
    /// A fresh random nonce is generated per call, so encrypting the same
    /// plaintext twice yields different tokens.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = Aes256Gcm::new((&self.key).into());

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::Crypto("Encryption failed".to_string()))?;

        let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);

        Ok(general_purpose::URL_SAFE_NO_PAD.encode(token))
    }

    /// Decrypts a ciphertext token back into the plaintext secret.
    ///
    /// Malformed tokens and failed integrity checks both surface as a
    /// generic crypto error.
    pub fn decrypt(&self, token: &str) -> Result<String> {
        let raw = general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| AppError::Crypto("Malformed ciphertext token".to_string()))?;

        if raw.len() <= NONCE_SIZE {
            return Err(AppError::Crypto("Malformed ciphertext token".to_string()));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
        let nonce_arr: [u8; NONCE_SIZE] = nonce_bytes
            .try_into()
            .map_err(|_| AppError::Crypto("Malformed ciphertext token".to_string()))?;
        let nonce = Nonce::from(nonce_arr);

        let cipher = Aes256Gcm::new((&self.key).into());
        let plaintext = cipher
            .decrypt(&nonce, ciphertext)
            .map_err(|_| AppError::Crypto("Decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Crypto("Decryption failed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cipher = SecretCipher::derive("test-passphrase");
        let token = cipher.encrypt("secret1").unwrap();
        assert_ne!(token, "secret1");
        assert_eq!(cipher.decrypt(&token).unwrap(), "secret1");
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let cipher = SecretCipher::derive("test-passphrase");
        let a = cipher.encrypt("secret1").unwrap();
        let b = cipher.encrypt("secret1").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), cipher.decrypt(&b).unwrap());
    }

    #[test]
    fn tampering_is_detected() {
        let cipher = SecretCipher::derive("test-passphrase");
        let token = cipher.encrypt("secret1").unwrap();
        let mut raw = general_purpose::URL_SAFE_NO_PAD.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = general_purpose::URL_SAFE_NO_PAD.encode(raw);
        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn malformed_tokens_fail() {
        let cipher = SecretCipher::derive("test-passphrase");
        assert!(cipher.decrypt("not-base64!!!").is_err());
        assert!(cipher.decrypt("").is_err());
        // Valid base64 but shorter than a nonce.
        assert!(cipher.decrypt(&general_purpose::URL_SAFE_NO_PAD.encode(b"tiny")).is_err());
    }

    #[test]
    fn wrong_passphrase_fails() {
        let token = SecretCipher::derive("one").encrypt("secret1").unwrap();
        assert!(SecretCipher::derive("two").decrypt(&token).is_err());
    }
}
