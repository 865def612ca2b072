//! SQLite persistence for credentials
//!
//! Only the schema step lives here; the CRUD queries belong to
//! [`crate::credential::CredentialStore`], which owns the connection.

pub mod schema;

pub use schema::{column_names, ensure_schema, OptionalColumn, OPTIONAL_COLUMNS, TABLE};
