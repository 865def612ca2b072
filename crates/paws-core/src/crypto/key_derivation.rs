//! Passphrase-based key derivation using SHA-256
//!
//! The key is a single unsalted SHA-256 digest of the passphrase. The same
//! passphrase yields the same key on every run, so nothing besides the
//! encrypted rows has to be persisted. This is weak against offline
//! brute-force of an exfiltrated database file; it is not a hardened KDF.

use sha2::{Digest, Sha256};

use super::MasterKey;
use crate::error::{PawsError, Result};

/// Derive a 256-bit master key from a passphrase
///
/// # Arguments
/// * `passphrase` - The user's master passphrase, must not be empty
///
/// # Returns
/// A 32-byte master key suitable for AES-256 encryption
pub fn derive_key(passphrase: &str) -> Result<MasterKey> {
    if passphrase.is_empty() {
        return Err(PawsError::InvalidInput(
            "master passphrase must not be empty".to_string(),
        ));
    }

    let digest = Sha256::digest(passphrase.as_bytes());
    MasterKey::from_slice(digest.as_slice())
        .ok_or_else(|| PawsError::KeyDerivationError("Digest has unexpected length".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key() {
        let key = derive_key("test-password-123").unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let key1 = derive_key("test-password-123").unwrap();
        let key2 = derive_key("test-password-123").unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_known_vector() {
        // SHA-256("abc")
        let key = derive_key("abc").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_derive_key_different_passwords() {
        let key1 = derive_key("password1").unwrap();
        let key2 = derive_key("password2").unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let result = derive_key("");
        assert!(matches!(result, Err(PawsError::InvalidInput(_))));
    }
}
