//! # paws-core
//!
//! Core of the paws password manager:
//! - SHA-256 key derivation from a master passphrase
//! - AES-256-GCM encryption of every stored secret
//! - SQLite credential store with additive schema migration
//! - Random password generator
//! - JSON settings for front-ends

pub mod credential;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod settings;
pub mod storage;

pub use credential::{Credential, CredentialStore, CredentialSummary, ListQuery, SortKey};
pub use crypto::{decrypt_string, derive_key, encrypt_string, MasterKey, SecretString};
pub use error::{PawsError, Result};
pub use generator::{generate, GeneratorOptions};
pub use settings::{Settings, SettingsManager};
