//! AES-256-GCM authenticated encryption of stored secrets
//!
//! Token format: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
//! - IV: 12 bytes, fresh random per token
//! - Auth tag: 16 bytes
//! - Ciphertext: same length as the plaintext
//!
//! A token carries everything except the key, so decrypting needs no other
//! state. Every failure on the way back (bad hex, bad lengths, wrong key,
//! tampering, invalid UTF-8) is a `DecryptionError`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use super::MasterKey;
use crate::error::{PawsError, Result};

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Decoded token: IV, auth tag and ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode(self.iv),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl EncryptedData {
    /// Parse a token of the form `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
    pub fn from_string(token: &str) -> Result<Self> {
        let mut parts = token.trim().split(':');
        let (Some(iv_hex), Some(tag_hex), Some(ct_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PawsError::DecryptionError(
                "Invalid token format: expected iv:tag:ciphertext".to_string(),
            ));
        };

        let iv = decode_fixed::<IV_LEN>(iv_hex, "IV")?;
        let auth_tag = decode_fixed::<TAG_LEN>(tag_hex, "auth tag")?;
        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| PawsError::DecryptionError(format!("Invalid ciphertext hex: {}", e)))?;

        Ok(Self {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(part: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(part)
        .map_err(|e| PawsError::DecryptionError(format!("Invalid {} hex: {}", what, e)))?;

    bytes.as_slice().try_into().map_err(|_| {
        PawsError::DecryptionError(format!(
            "Invalid {} length: expected {}, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}

/// Encrypt plaintext using AES-256-GCM under `key`
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PawsError::EncryptionError(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    // aes-gcm appends the tag to the ciphertext
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| PawsError::EncryptionError(e.to_string()))?;

    let tag_start = sealed
        .len()
        .checked_sub(TAG_LEN)
        .ok_or_else(|| PawsError::EncryptionError("Ciphertext too short".to_string()))?;

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext: sealed,
    })
}

/// Decrypt a parsed token using AES-256-GCM under `key`
pub fn decrypt(encrypted: &EncryptedData, key: &MasterKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PawsError::DecryptionError(e.to_string()))?;

    let mut sealed = Vec::with_capacity(encrypted.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&encrypted.ciphertext);
    sealed.extend_from_slice(&encrypted.auth_tag);

    cipher
        .decrypt(Nonce::from_slice(&encrypted.iv), sealed.as_slice())
        .map_err(|_| {
            PawsError::DecryptionError(
                "authentication failed (wrong master password or corrupted entry)".to_string(),
            )
        })
}

/// Encrypt a secret and return its token
pub fn encrypt_string(plaintext: &str, key: &MasterKey) -> Result<String> {
    Ok(encrypt(plaintext.as_bytes(), key)?.to_string())
}

/// Decrypt a token back into the secret string
pub fn decrypt_string(token: &str, key: &MasterKey) -> Result<String> {
    let encrypted = EncryptedData::from_string(token)?;
    let plaintext = decrypt(&encrypted, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| PawsError::DecryptionError(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::derive_key;

    fn test_key() -> MasterKey {
        derive_key("test-password").unwrap()
    }

    #[test]
    fn test_encrypt_string_decrypt_string_roundtrip() {
        let key = test_key();

        for secret in ["s3cr3t", "", "пароль с пробелами", "!@#$%^&*()-_=+[]{};:,.<>?"] {
            let token = encrypt_string(secret, &key).unwrap();
            assert_eq!(decrypt_string(&token, &key).unwrap(), secret);
        }
    }

    #[test]
    fn test_token_shape() {
        let token = encrypt_string("hello", &test_key()).unwrap();
        let parts: Vec<&str> = token.split(':').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), IV_LEN * 2);
        assert_eq!(parts[1].len(), TAG_LEN * 2);
        assert_eq!(parts[2].len(), "hello".len() * 2);
    }

    #[test]
    fn test_different_ivs_produce_different_tokens() {
        let key = test_key();

        let encrypted1 = encrypt(b"same plaintext", &key).unwrap();
        let encrypted2 = encrypt(b"same plaintext", &key).unwrap();

        assert_ne!(encrypted1.iv, encrypted2.iv);
        assert_ne!(encrypted1.ciphertext, encrypted2.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let key1 = derive_key("passphrase-one").unwrap();
        let key2 = derive_key("passphrase-two").unwrap();

        let token = encrypt_string("secret data", &key1).unwrap();
        let result = decrypt_string(&token, &key2);

        assert!(matches!(result, Err(PawsError::DecryptionError(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails_decryption() {
        let key = test_key();

        let mut encrypted = encrypt(b"secret data", &key).unwrap();
        encrypted.ciphertext[0] ^= 0xFF;

        assert!(decrypt(&encrypted, &key).unwrap_err().is_decryption());
    }

    #[test]
    fn test_tampered_auth_tag_fails_decryption() {
        let key = test_key();

        let mut encrypted = encrypt(b"secret data", &key).unwrap();
        encrypted.auth_tag[0] ^= 0xFF;

        assert!(decrypt(&encrypted, &key).unwrap_err().is_decryption());
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        for token in [
            "invalid",
            "a:b",
            "a:b:c:d",
            "not_hex:not_hex:not_hex",
            "00:00:00",
            "gAAAAABlegacyfernettoken",
        ] {
            let err = EncryptedData::from_string(token).unwrap_err();
            assert!(err.is_decryption(), "{token} gave {err:?}");
        }
    }

    #[test]
    fn test_non_utf8_plaintext_is_decryption_error() {
        let key = test_key();
        let token = encrypt(&[0xFF, 0xFE, 0xFD], &key).unwrap().to_string();

        assert!(decrypt_string(&token, &key).unwrap_err().is_decryption());
    }
}
