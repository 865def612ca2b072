//! Cryptographic primitives for credential encryption at rest
//!
//! This module provides:
//! - SHA-256 key derivation from the master passphrase
//! - AES-256-GCM authenticated encryption with self-describing tokens
//! - Zeroize-on-drop holders for the key and decrypted secrets

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{decrypt, decrypt_string, encrypt, encrypt_string, EncryptedData};
pub use key_derivation::derive_key;
pub use secure_memory::{MasterKey, SecretString};
