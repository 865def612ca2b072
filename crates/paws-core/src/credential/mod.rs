//! Encrypted credential storage

mod store;
mod types;

pub use store::CredentialStore;
pub use types::*;
