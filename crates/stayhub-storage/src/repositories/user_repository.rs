//! SQLite implementation of UserRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use stayhub_core::{PasswordCredential, User, UserRepository};
use tokio::sync::Mutex;

use super::credential_repository::upsert_credential;
use super::{format_datetime, map_email_conflict, parse_datetime, parsed_column};
use crate::Database;

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, created_at";

/// SQLite-backed implementation of UserRepository.
pub struct SqliteUserRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteUserRepository {
    /// Create a new SQLite user repository.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            role: parsed_column(row, 4)?,
            created_at: parse_datetime(&row.get::<_, String>(5)?),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get(&self, id: &str) -> Result<Option<User>> {
        let db = self.db.lock().await;
        let user = db
            .connection()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = self.db.lock().await;
        let user = db
            .connection()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                params![email],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn create(&self, user: &User) -> Result<()> {
        let db = self.db.lock().await;
        insert_user(db.connection(), user).map_err(map_email_conflict)?;

        tracing::debug!("[UserRepository] Created user {}", user.id);
        Ok(())
    }

    async fn create_with_credential(
        &self,
        user: &User,
        credential: &PasswordCredential,
    ) -> Result<()> {
        let db = self.db.lock().await;
        db.transaction(|conn| {
            insert_user(conn, user).map_err(map_email_conflict)?;
            upsert_credential(conn, credential)?;
            Ok(())
        })?;

        tracing::debug!("[UserRepository] Registered user {}", user.id);
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let db = self.db.lock().await;
        let rows_affected = db
            .connection()
            .execute(
                "UPDATE users SET email = ?2, first_name = ?3, last_name = ?4, role = ?5 WHERE id = ?1",
                params![
                    user.id,
                    user.email,
                    user.first_name,
                    user.last_name,
                    user.role.as_str(),
                ],
            )
            .map_err(map_email_conflict)?;

        if rows_affected == 0 {
            anyhow::bail!("User not found: {}", user.id);
        }

        Ok(())
    }
}

fn insert_user(conn: &Connection, user: &User) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, first_name, last_name, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.email,
            user.first_name,
            user.last_name,
            user.role.as_str(),
            format_datetime(&user.created_at),
        ],
    )?;
    Ok(())
}
