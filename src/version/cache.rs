use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::version::error::CacheError;
use crate::version::types::{NpmInfo, NpmVersionInfo};

/// Local copy of npm documents fetched in earlier runs
pub struct Cache {
    conn: Mutex<Connection>,
}

impl Cache {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing npm info cache at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        debug!("Database connection established");

        let cache = Self {
            conn: Mutex::new(conn),
        };

        cache.create_schema()?;
        info!("Cache initialized successfully");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                escaped_name TEXT NOT NULL UNIQUE,
                time_modified TEXT
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                package_id INTEGER NOT NULL,
                version TEXT NOT NULL,
                content_hash TEXT,
                deprecated INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
                UNIQUE(package_id, version)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_package_id ON versions(package_id)",
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS dist_tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                package_id INTEGER NOT NULL,
                tag_name TEXT NOT NULL,
                version TEXT NOT NULL,
                FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
                UNIQUE(package_id, tag_name)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_dist_tags_package_id ON dist_tags(package_id)",
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Returns the stored document, or None if the package was never cached
    pub fn get_npm_info(&self, escaped_name: &str) -> Result<Option<NpmInfo>, CacheError> {
        let conn = self.lock_conn()?;

        let package = conn.query_row(
            "SELECT id, time_modified FROM packages WHERE escaped_name = ?1",
            [escaped_name],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?)),
        );

        let (package_id, time_modified) = match package {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            "SELECT version, content_hash, deprecated FROM versions WHERE package_id = ?1 ORDER BY id",
        )?;
        let versions = stmt
            .query_map([package_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    NpmVersionInfo {
                        content_hash: row.get(1)?,
                        deprecated: row.get(2)?,
                    },
                ))
            })?
            .collect::<Result<IndexMap<_, _>, _>>()?;

        let mut stmt = conn.prepare("SELECT tag_name, version FROM dist_tags WHERE package_id = ?1")?;
        let dist_tags = stmt
            .query_map([package_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<HashMap<String, String>, _>>()?;

        let time_modified = time_modified
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Some(NpmInfo {
            dist_tags,
            versions,
            time_modified,
        }))
    }

    /// Replace the stored document for a package
    pub fn save_npm_info(&self, escaped_name: &str, info: &NpmInfo) -> Result<(), CacheError> {
        debug!(
            "Saving {} versions for {}",
            info.versions.len(),
            escaped_name
        );

        let time_modified = info.time_modified.map(|t| t.to_rfc3339());

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO packages (escaped_name, time_modified)
            VALUES (?1, ?2)
            ON CONFLICT(escaped_name) DO UPDATE SET
                time_modified = excluded.time_modified
            "#,
            (escaped_name, &time_modified),
        )?;

        let package_id: i64 = tx.query_row(
            "SELECT id FROM packages WHERE escaped_name = ?1",
            [escaped_name],
            |row| row.get(0),
        )?;

        tx.execute("DELETE FROM versions WHERE package_id = ?1", [package_id])?;
        tx.execute("DELETE FROM dist_tags WHERE package_id = ?1", [package_id])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO versions (package_id, version, content_hash, deprecated) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (version, meta) in &info.versions {
                stmt.execute((package_id, version, &meta.content_hash, meta.deprecated))?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO dist_tags (package_id, tag_name, version) VALUES (?1, ?2, ?3)",
            )?;
            for (tag_name, version) in &info.dist_tags {
                stmt.execute((package_id, tag_name, version))?;
            }
        }

        tx.commit()?;

        debug!("Successfully saved npm info for {}", escaped_name);
        Ok(())
    }
}
