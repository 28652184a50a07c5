//! SQLite database handle and schema migrations.
//!
//! Migrations live in `migrations/NNN_name.sql` and are listed in
//! [`MIGRATIONS`] in version order. Each one runs once, inside its own
//! transaction together with its `schema_migrations` row, so a failed
//! migration leaves no trace and is retried on the next open.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{debug, error, info};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Wait this long for a competing writer before failing with SQLITE_BUSY.
const BUSY_TIMEOUT_MS: i64 = 5_000;

/// Owns the single SQLite connection. Shared as `Arc<Mutex<Database>>`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database file and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)?;

        debug!("[Database] Opened {:?}", path);
        Self::init(conn)
    }

    /// Fresh private database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("[Database] Opened in-memory database");
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Cascades on property delete depend on this
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self { conn };
        db.apply_pending_migrations()?;
        Ok(db)
    }

    fn apply_pending_migrations(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let current = self.schema_version()?;
        let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
        if pending.is_empty() {
            debug!("[Database] Schema is current at version {}", current);
            return Ok(());
        }

        info!(
            "[Database] Schema at version {}, applying {} migration(s)",
            current,
            pending.len()
        );

        for migration in pending {
            self.transaction(|conn| {
                conn.execute_batch(migration.sql).map_err(|e| {
                    error!(
                        "[Database] Migration {} ({}) failed: {}",
                        migration.version, migration.name, e
                    );
                    anyhow::anyhow!(
                        "Migration {} ({}) failed: {}",
                        migration.version,
                        migration.name,
                        e
                    )
                })?;
                conn.execute(
                    "INSERT INTO schema_migrations (version, name, applied_at)
                     VALUES (?1, ?2, datetime('now'))",
                    params![migration.version, migration.name],
                )?;
                Ok(())
            })?;

            info!(
                "[Database] Applied migration {} ({})",
                migration.version, migration.name
            );
        }

        Ok(())
    }

    /// Highest applied migration, 0 for an empty database.
    pub fn schema_version(&self) -> Result<i64> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` in a transaction; an `Err` from `f` rolls everything back.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}
