//! Persistent key/value store for language settings.
//!
//! Writes are staged with [`ConfigStore::set`] and committed by a single
//! [`ConfigStore::save`], so one form submission becomes one logical save.
//! The SQLite backend wraps the pending rows in a transaction: either every
//! staged record becomes durable or none do. Keys already committed by an
//! earlier save are never touched by a later failure.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::SettingsError;
use crate::settings::{LanguageSettings, SettingsKey};

/// Storage contract consumed by the form builder and submission handler.
///
/// `get`/`all` observe staged writes as well as committed ones, matching
/// the read-your-writes behavior of the reference config object.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &SettingsKey) -> Result<Option<LanguageSettings>, SettingsError>;

    /// All records, committed and staged, keyed by settings key.
    fn all(&self) -> Result<BTreeMap<SettingsKey, LanguageSettings>, SettingsError>;

    /// Stage a write. Nothing is durable until `save`.
    fn set(&self, key: &SettingsKey, settings: LanguageSettings) -> Result<(), SettingsError>;

    /// Commit every staged write as one unit. On failure the staged writes
    /// are discarded and nothing from this save is durable.
    fn save(&self) -> Result<(), SettingsError>;
}

/// SQLite-backed config store.
#[derive(Clone)]
pub struct SqliteConfigStore {
    conn: Arc<Mutex<Connection>>,
    pending: Arc<Mutex<BTreeMap<SettingsKey, LanguageSettings>>>,
}

impl SqliteConfigStore {
    /// Open (or create) the store at the given path.
    pub fn open(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS language_settings (
                entity_type TEXT NOT NULL,
                bundle TEXT NOT NULL,
                langcode TEXT NOT NULL,
                language_show INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (entity_type, bundle)
            )",
            [],
        )
        .context("Failed to create language_settings table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            pending: Arc::new(Mutex::new(BTreeMap::new())),
        })
    }

    /// Open an in-process, non-durable store. Used by tests and demos.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

impl ConfigStore for SqliteConfigStore {
    fn get(&self, key: &SettingsKey) -> Result<Option<LanguageSettings>, SettingsError> {
        if let Some(staged) = self.pending.lock().unwrap().get(key) {
            return Ok(Some(staged.clone()));
        }

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT langcode, language_show FROM language_settings
             WHERE entity_type = ?1 AND bundle = ?2",
        )?;

        let settings = stmt
            .query_row(params![key.entity_type(), key.bundle()], |row| {
                Ok(LanguageSettings {
                    langcode: row.get(0)?,
                    language_show: row.get::<_, i64>(1)? != 0,
                })
            })
            .optional()?;

        Ok(settings)
    }

    fn all(&self) -> Result<BTreeMap<SettingsKey, LanguageSettings>, SettingsError> {
        let mut records = BTreeMap::new();
        {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(
                "SELECT entity_type, bundle, langcode, language_show FROM language_settings",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    LanguageSettings {
                        langcode: row.get(2)?,
                        language_show: row.get::<_, i64>(3)? != 0,
                    },
                ))
            })?;
            for row in rows {
                let (entity_type, bundle, settings) = row?;
                let key = SettingsKey::new(entity_type, bundle)?;
                records.insert(key, settings);
            }
        }

        for (key, settings) in self.pending.lock().unwrap().iter() {
            records.insert(key.clone(), settings.clone());
        }
        Ok(records)
    }

    fn set(&self, key: &SettingsKey, settings: LanguageSettings) -> Result<(), SettingsError> {
        self.pending.lock().unwrap().insert(key.clone(), settings);
        Ok(())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let staged = std::mem::take(&mut *self.pending.lock().unwrap());
        if staged.is_empty() {
            return Ok(());
        }

        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN TRANSACTION", [])?;

        let result = write_all(&conn, &staged);
        match result {
            Ok(()) => {
                conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }
}

fn write_all(
    conn: &Connection,
    staged: &BTreeMap<SettingsKey, LanguageSettings>,
) -> Result<(), SettingsError> {
    let now = Utc::now().to_rfc3339();
    for (key, settings) in staged {
        conn.execute(
            "INSERT INTO language_settings (entity_type, bundle, langcode, language_show, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (entity_type, bundle) DO UPDATE SET
                 langcode = excluded.langcode,
                 language_show = excluded.language_show,
                 updated_at = excluded.updated_at",
            params![
                key.entity_type(),
                key.bundle(),
                settings.langcode,
                settings.language_show as i64,
                now
            ],
        )?;
    }
    Ok(())
}

/// In-memory config store with the same staging semantics.
#[derive(Clone, Default)]
pub struct MemoryConfigStore {
    committed: Arc<Mutex<BTreeMap<SettingsKey, LanguageSettings>>>,
    pending: Arc<Mutex<BTreeMap<SettingsKey, LanguageSettings>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed records only, ignoring anything still staged.
    pub fn committed_snapshot(&self) -> BTreeMap<SettingsKey, LanguageSettings> {
        self.committed.lock().unwrap().clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &SettingsKey) -> Result<Option<LanguageSettings>, SettingsError> {
        if let Some(staged) = self.pending.lock().unwrap().get(key) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.committed.lock().unwrap().get(key).cloned())
    }

    fn all(&self) -> Result<BTreeMap<SettingsKey, LanguageSettings>, SettingsError> {
        let mut records = self.committed.lock().unwrap().clone();
        for (key, settings) in self.pending.lock().unwrap().iter() {
            records.insert(key.clone(), settings.clone());
        }
        Ok(records)
    }

    fn set(&self, key: &SettingsKey, settings: LanguageSettings) -> Result<(), SettingsError> {
        self.pending.lock().unwrap().insert(key.clone(), settings);
        Ok(())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let staged = std::mem::take(&mut *self.pending.lock().unwrap());
        self.committed.lock().unwrap().extend(staged);
        Ok(())
    }
}
