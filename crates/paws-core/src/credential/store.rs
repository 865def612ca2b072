//! SQLite-backed credential store with per-secret encryption

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::types::{
    format_timestamp, parse_timestamp, Credential, CredentialSummary, ListQuery,
};
use crate::crypto::{decrypt_string, derive_key, encrypt_string, MasterKey, SecretString};
use crate::error::{PawsError, Result};
use crate::storage::ensure_schema;

const SUMMARY_COLUMNS: &str = "id, service, username, notes, created_at, updated_at";

/// Encrypted credential store for one passphrase session
///
/// The key is derived once from the passphrase given to [`open`] and lives
/// only inside this instance. Every operation is a single statement in
/// autocommit mode, so each call is atomic on its own.
///
/// [`open`]: CredentialStore::open
pub struct CredentialStore {
    conn: Connection,
    master_key: MasterKey,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("master_key", &self.master_key)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Open (or create) the database at `path`, bringing its schema up to date
    pub fn open(path: impl AsRef<Path>, passphrase: &str) -> Result<Self> {
        let path = path.as_ref();
        let master_key = derive_key(passphrase)?;
        let conn = Connection::open(path)?;

        let store = Self::with_connection(conn, master_key, Some(path.to_path_buf()))?;
        info!("Opened credential store at {:?}", path);
        Ok(store)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory(passphrase: &str) -> Result<Self> {
        let master_key = derive_key(passphrase)?;
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, master_key, None)
    }

    fn with_connection(
        mut conn: Connection,
        master_key: MasterKey,
        path: Option<PathBuf>,
    ) -> Result<Self> {
        ensure_schema(&mut conn)?;
        Ok(Self {
            conn,
            master_key,
            path,
        })
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add a credential and return its new id
    pub fn add(&self, service: &str, username: &str, secret: &str, notes: &str) -> Result<i64> {
        let service = require_service(service)?;
        require_secret(secret)?;

        let token = encrypt_string(secret, &self.master_key)?;
        let now = format_timestamp(Utc::now());

        self.conn.execute(
            "INSERT INTO passwords (service, username, password_enc, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![service, username.trim(), token, notes, now],
        )?;
        let id = self.conn.last_insert_rowid();

        info!("Added credential {} ({})", id, service);
        Ok(id)
    }

    /// Replace a credential's fields.
    ///
    /// With `secret` set to `None` the stored ciphertext is left as is.
    /// `updated_at` is refreshed either way.
    pub fn update(
        &self,
        id: i64,
        service: &str,
        username: &str,
        secret: Option<&str>,
        notes: &str,
    ) -> Result<()> {
        let service = require_service(service)?;
        let now = format_timestamp(Utc::now());

        let changed = match secret {
            Some(secret) => {
                require_secret(secret)?;
                let token = encrypt_string(secret, &self.master_key)?;
                self.conn.execute(
                    "UPDATE passwords
                     SET service = ?1, username = ?2, password_enc = ?3, notes = ?4, updated_at = ?5
                     WHERE id = ?6",
                    params![service, username.trim(), token, notes, now, id],
                )?
            }
            None => self.conn.execute(
                "UPDATE passwords
                 SET service = ?1, username = ?2, notes = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![service, username.trim(), notes, now, id],
            )?,
        };

        if changed == 0 {
            return Err(PawsError::NotFound(id));
        }

        info!(
            "Updated credential {} ({}){}",
            id,
            service,
            if secret.is_some() { ", secret replaced" } else { "" }
        );
        Ok(())
    }

    /// Fetch a credential and decrypt its secret
    pub fn get(&self, id: i64) -> Result<Credential> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SUMMARY_COLUMNS}, password_enc FROM passwords WHERE id = ?1"),
                params![id],
                read_stored,
            )
            .optional()?
            .ok_or(PawsError::NotFound(id))?;

        debug!("Fetched credential {}", id);
        self.open_row(row)
    }

    /// First credential (lowest id) whose service matches exactly
    pub fn find_by_service(&self, service: &str) -> Result<Option<Credential>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SUMMARY_COLUMNS}, password_enc FROM passwords
                     WHERE service = ?1 ORDER BY id LIMIT 1"
                ),
                params![service.trim()],
                read_stored,
            )
            .optional()?;

        match row {
            Some(row) => self.open_row(row).map(Some),
            None => {
                debug!("No credential for service '{}'", service);
                Ok(None)
            }
        }
    }

    /// List credential metadata; secrets are never decrypted here.
    ///
    /// Filtering and ordering happen after the fetch so both fold case with
    /// the same Unicode rules. Ties on the sort key fall back to `id`, in the
    /// same direction as the key.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<CredentialSummary>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SUMMARY_COLUMNS} FROM passwords"))?;
        let rows = stmt
            .query_map([], read_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut summaries: Vec<CredentialSummary> = match query.needle() {
            Some(needle) => rows
                .into_iter()
                .filter(|c| {
                    c.service.to_lowercase().contains(&needle)
                        || c.username.to_lowercase().contains(&needle)
                })
                .collect(),
            None => rows,
        };

        let key = query.sort_by;
        summaries.sort_by(|a, b| {
            let order = key.compare(a, b).then_with(|| a.id.cmp(&b.id));
            if query.ascending {
                order
            } else {
                order.reverse()
            }
        });

        debug!(
            "Listed {} credentials (sort: {} {})",
            summaries.len(),
            key,
            if query.ascending { "asc" } else { "desc" }
        );
        Ok(summaries)
    }

    /// Delete a credential. Deleting a missing id is not an error.
    pub fn delete(&self, id: i64) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM passwords WHERE id = ?1", params![id])?;

        if removed == 0 {
            debug!("Delete of missing credential {} ignored", id);
        } else {
            info!("Deleted credential: {}", id);
        }
        Ok(())
    }

    fn open_row(&self, row: StoredRow) -> Result<Credential> {
        let StoredRow { summary, token } = row;
        let secret = decrypt_string(&token, &self.master_key)?;

        Ok(Credential {
            id: summary.id,
            service: summary.service,
            username: summary.username,
            secret: SecretString::new(secret),
            notes: summary.notes,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
        })
    }
}

/// Summary plus the still-encrypted token
struct StoredRow {
    summary: CredentialSummary,
    token: String,
}

fn read_summary(row: &Row<'_>) -> rusqlite::Result<CredentialSummary> {
    Ok(CredentialSummary {
        id: row.get(0)?,
        service: row.get(1)?,
        username: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        notes: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        created_at: parse_timestamp(row.get::<_, Option<String>>(4)?.as_deref()),
        updated_at: parse_timestamp(row.get::<_, Option<String>>(5)?.as_deref()),
    })
}

fn read_stored(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        summary: read_summary(row)?,
        token: row.get(6)?,
    })
}

fn require_service(service: &str) -> Result<&str> {
    let service = service.trim();
    if service.is_empty() {
        return Err(PawsError::InvalidInput("service must not be empty".to_string()));
    }
    Ok(service)
}

fn require_secret(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(PawsError::InvalidInput("password must not be empty".to_string()));
    }
    Ok(())
}
