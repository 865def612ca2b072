//! In-memory holders for the session key and decrypted passwords
//!
//! Neither type can be built outside this crate: a `MasterKey` only comes
//! from [`derive_key`](super::derive_key) and a `SecretString` only from a
//! store read. Both wipe their bytes on drop and print as `[REDACTED]`.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256 key derived from the master passphrase
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; 32]);

impl MasterKey {
    /// `None` unless `digest` is exactly 32 bytes
    pub(crate) fn from_slice(digest: &[u8]) -> Option<Self> {
        digest.try_into().ok().map(Self)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// A decrypted password, handed to the caller by `get` / `find_by_service`
///
/// Pass the exposed value straight to the display or clipboard sink and
/// drop this; nothing in the crate keeps a copy.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub(crate) fn new(plaintext: String) -> Self {
        Self(plaintext)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_requires_32_bytes() {
        assert_eq!(MasterKey::from_slice(&[9u8; 32]).unwrap().as_bytes(), &[9u8; 32]);
        assert!(MasterKey::from_slice(&[9u8; 16]).is_none());
        assert!(MasterKey::from_slice(&[9u8; 33]).is_none());
    }

    #[test]
    fn test_debug_never_shows_contents() {
        let key = MasterKey::from_slice(&[7u8; 32]).unwrap();
        assert_eq!(format!("{:?}", key), "MasterKey([REDACTED])");

        let secret = SecretString::new("hunter2".to_string());
        assert_eq!(secret.expose(), "hunter2");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
    }
}
