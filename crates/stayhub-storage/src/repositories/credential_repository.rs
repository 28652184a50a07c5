//! SQLite implementation of CredentialRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use stayhub_core::{CredentialRepository, PasswordCredential};
use tokio::sync::Mutex;

use super::{format_datetime, parse_datetime};
use crate::Database;

/// SQLite-backed storage for password hashes and token versions.
pub struct SqliteCredentialRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteCredentialRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    async fn get(&self, user_id: &str) -> Result<Option<PasswordCredential>> {
        let db = self.db.lock().await;
        let credential = db
            .connection()
            .query_row(
                "SELECT user_id, password_hash, token_version, updated_at
                 FROM password_credentials WHERE user_id = ?",
                params![user_id],
                |row| {
                    Ok(PasswordCredential {
                        user_id: row.get(0)?,
                        password_hash: row.get(1)?,
                        token_version: row.get(2)?,
                        updated_at: parse_datetime(&row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;
        Ok(credential)
    }

    async fn upsert(&self, credential: &PasswordCredential) -> Result<()> {
        let db = self.db.lock().await;
        upsert_credential(db.connection(), credential)?;
        Ok(())
    }
}

/// Shared with user registration, which writes the credential in the same transaction.
pub(crate) fn upsert_credential(
    conn: &Connection,
    credential: &PasswordCredential,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO password_credentials (user_id, password_hash, token_version, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            password_hash = excluded.password_hash,
            token_version = excluded.token_version,
            updated_at = excluded.updated_at",
        params![
            credential.user_id,
            credential.password_hash,
            credential.token_version,
            format_datetime(&credential.updated_at),
        ],
    )?;
    Ok(())
}
