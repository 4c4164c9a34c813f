use crate::entities::SwiftCodeEntry;
use crate::error::{RegistryError, Result};
use crate::store::RegistryStore;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "SELECT swift_code, bank_name, address, town_name,
        country_iso2, country_name, is_headquarter
 FROM swift_codes";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // SWIFT codes table
    // NOCASE collation makes the primary key the case-insensitive uniqueness guard
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS swift_codes (
            swift_code TEXT PRIMARY KEY COLLATE NOCASE,
            bank_name TEXT NOT NULL,
            address TEXT,
            town_name TEXT,
            country_iso2 TEXT NOT NULL COLLATE NOCASE,
            country_name TEXT NOT NULL,
            is_headquarter INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_country_iso2 ON swift_codes(country_iso2)",
        [],
    )?;

    Ok(())
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<SwiftCodeEntry> {
    Ok(SwiftCodeEntry {
        swift_code: row.get(0)?,
        bank_name: row.get(1)?,
        address: row.get(2)?,
        town_name: row.get(3)?,
        country_iso2: row.get(4)?,
        country_name: row.get(5)?,
        is_headquarter: row.get(6)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Stored codes are uppercased with full Unicode rules; NOCASE only folds ASCII
fn canonical(value: &str) -> String {
    value.trim().to_uppercase()
}

// ============================================================================
// Queries
// ============================================================================

pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<SwiftCodeEntry>> {
    let sql = format!("{} WHERE swift_code = ?1", SELECT_COLUMNS);
    let entry = conn
        .query_row(&sql, params![canonical(code)], row_to_entry)
        .optional()?;

    Ok(entry)
}

pub fn find_by_country(conn: &Connection, iso2: &str) -> Result<Vec<SwiftCodeEntry>> {
    let sql = format!(
        "{} WHERE country_iso2 = ?1 ORDER BY swift_code",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let entries = stmt
        .query_map(params![canonical(iso2)], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(entries)
}

pub fn find_branches(
    conn: &Connection,
    prefix: &str,
    exclude_code: &str,
) -> Result<Vec<SwiftCodeEntry>> {
    let sql = format!(
        "{} WHERE substr(swift_code, 1, length(?1)) = ?1 COLLATE NOCASE
           AND swift_code <> ?2
         ORDER BY swift_code",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let entries = stmt
        .query_map(params![canonical(prefix), canonical(exclude_code)], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(entries)
}

pub fn exists(conn: &Connection, code: &str) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM swift_codes WHERE swift_code = ?1)",
        params![canonical(code)],
        |row| row.get(0),
    )?;

    Ok(found)
}

pub fn count_entries(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// Writes
// ============================================================================

/// Insert one entry; a duplicate code fails with `Conflict`
pub fn insert_entry(conn: &Connection, entry: &SwiftCodeEntry) -> Result<()> {
    let result = conn.execute(
        "INSERT INTO swift_codes (
            swift_code, bank_name, address, town_name,
            country_iso2, country_name, is_headquarter
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.swift_code,
            entry.bank_name,
            entry.address,
            entry.town_name,
            entry.country_iso2,
            entry.country_name,
            entry.is_headquarter,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_constraint_violation(&e) => Err(RegistryError::duplicate(&entry.swift_code)),
        Err(e) => Err(e.into()),
    }
}

/// Upsert a batch in one transaction; a code already present takes the later
/// row's fields. Returns the number of new codes.
pub fn insert_batch(conn: &Connection, entries: &[SwiftCodeEntry]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;

    {
        let mut present =
            tx.prepare("SELECT EXISTS(SELECT 1 FROM swift_codes WHERE swift_code = ?1)")?;
        let mut stmt = tx.prepare(
            "INSERT INTO swift_codes (
                swift_code, bank_name, address, town_name,
                country_iso2, country_name, is_headquarter
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(swift_code) DO UPDATE SET
                bank_name = excluded.bank_name,
                address = excluded.address,
                town_name = excluded.town_name,
                country_iso2 = excluded.country_iso2,
                country_name = excluded.country_name,
                is_headquarter = excluded.is_headquarter",
        )?;

        for entry in entries {
            let existed: bool =
                present.query_row(params![entry.swift_code], |row| row.get(0))?;
            if !existed {
                inserted += 1;
            }
            stmt.execute(params![
                entry.swift_code,
                entry.bank_name,
                entry.address,
                entry.town_name,
                entry.country_iso2,
                entry.country_name,
                entry.is_headquarter,
            ])?;
        }
    }

    tx.commit()?;

    Ok(inserted)
}

pub fn delete_entry(conn: &Connection, code: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM swift_codes WHERE swift_code = ?1",
        params![canonical(code)],
    )?;

    Ok(removed > 0)
}

// ============================================================================
// Statistics
// ============================================================================

/// Registry-wide counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: i64,
    pub headquarters: i64,
    pub branches: i64,
    pub countries: i64,
}

pub fn registry_stats(conn: &Connection) -> Result<RegistryStats> {
    let stats = conn.query_row(
        "SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN is_headquarter = 1 THEN 1 ELSE 0 END), 0),
            COUNT(DISTINCT country_iso2)
         FROM swift_codes",
        [],
        |row| {
            let total: i64 = row.get(0)?;
            let headquarters: i64 = row.get(1)?;
            Ok(RegistryStats {
                total,
                headquarters,
                branches: total - headquarters,
                countries: row.get(2)?,
            })
        },
    )?;

    Ok(stats)
}

// ============================================================================
// SQLite-backed registry
// ============================================================================

/// `RegistryStore` over a single SQLite connection
///
/// The connection is serialized behind a mutex; every call is one statement
/// or one transaction.
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    /// Wrap an open connection, creating the schema if needed
    pub fn new(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteRegistry {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::new(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RegistryError::Internal("database connection lock poisoned".to_string()))
    }

    pub fn stats(&self) -> Result<RegistryStats> {
        registry_stats(&*self.conn()?)
    }
}

impl RegistryStore for SqliteRegistry {
    fn find_by_code(&self, code: &str) -> Result<Option<SwiftCodeEntry>> {
        find_by_code(&*self.conn()?, code)
    }

    fn find_by_country(&self, iso2: &str) -> Result<Vec<SwiftCodeEntry>> {
        find_by_country(&*self.conn()?, iso2)
    }

    fn find_branches(&self, prefix: &str, exclude_code: &str) -> Result<Vec<SwiftCodeEntry>> {
        find_branches(&*self.conn()?, prefix, exclude_code)
    }

    fn exists(&self, code: &str) -> Result<bool> {
        exists(&*self.conn()?, code)
    }

    fn save(&self, entry: &SwiftCodeEntry) -> Result<()> {
        insert_entry(&*self.conn()?, entry)
    }

    fn save_batch(&self, entries: &[SwiftCodeEntry]) -> Result<usize> {
        insert_batch(&*self.conn()?, entries)
    }

    fn delete(&self, code: &str) -> Result<bool> {
        delete_entry(&*self.conn()?, code)
    }

    fn count(&self) -> Result<i64> {
        count_entries(&*self.conn()?)
    }
}
