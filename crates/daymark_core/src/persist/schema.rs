//! Schema bootstrap for the SQLite blob table.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the version of the last applied step.
//! - Pending steps commit together or not at all.
//! - A connection handed to `SqliteBlobAdapter` always has the `blobs`
//!   table, checked after the steps run.

use log::{error, info};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

/// Table holding one blob row per storage key.
pub const BLOB_TABLE: &str = "blobs";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "create_blobs",
    sql: "CREATE TABLE IF NOT EXISTS blobs (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
    );",
}];

/// Blob database could not be brought to the expected schema.
#[derive(Debug)]
pub enum SchemaError {
    /// Connection could not be opened or configured.
    Connect(rusqlite::Error),
    /// Database was written by a newer build.
    TooNew { found: u32, supported: u32 },
    /// A schema step failed; the pending batch was rolled back.
    Step {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// Version is current but the blob table is absent.
    MissingTable(&'static str),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(err) => write!(f, "cannot open blob database: {err}"),
            Self::TooNew { found, supported } => write!(
                f,
                "blob database schema {found} is newer than this build supports ({supported})"
            ),
            Self::Step {
                version,
                name,
                source,
            } => write!(f, "schema step {version} ({name}) failed: {source}"),
            Self::MissingTable(table) => {
                write!(f, "blob database is missing table `{table}`")
            }
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connect(err) | Self::Step { source: err, .. } => Some(err),
            Self::TooNew { .. } | Self::MissingTable(_) => None,
        }
    }
}

/// Schema version this build writes.
pub fn schema_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Opens a blob database file, bringing its schema up to date.
pub fn open_blob_db(path: impl AsRef<Path>) -> Result<Connection, SchemaError> {
    let path = path.as_ref();
    timed_open("file", || Connection::open(path))
}

/// Opens a private in-memory blob database.
pub fn open_blob_db_in_memory() -> Result<Connection, SchemaError> {
    timed_open("memory", Connection::open_in_memory)
}

/// Applies pending steps and verifies the blob table.
///
/// Returns the number of steps applied.
pub fn ensure_schema(conn: &mut Connection) -> Result<usize, SchemaError> {
    let applied = apply_steps(conn, SCHEMA_STEPS)?;
    if !table_exists(conn, BLOB_TABLE).map_err(SchemaError::Connect)? {
        return Err(SchemaError::MissingTable(BLOB_TABLE));
    }
    Ok(applied)
}

fn timed_open(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> Result<Connection, SchemaError> {
    let started_at = Instant::now();
    let result = connect().map_err(SchemaError::Connect).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(SchemaError::Connect)?;
        let applied = ensure_schema(&mut conn)?;
        Ok((conn, applied))
    });

    let elapsed = started_at.elapsed().as_millis();
    match result {
        Ok((conn, applied)) => {
            info!(
                "event=blob_db_open module=persist status=ok mode={mode} steps_applied={applied} duration_ms={elapsed}"
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=blob_db_open module=persist status=error mode={mode} duration_ms={elapsed} error={err}"
            );
            Err(err)
        }
    }
}

fn apply_steps(conn: &mut Connection, steps: &[SchemaStep]) -> Result<usize, SchemaError> {
    let found: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(SchemaError::Connect)?;
    let supported = steps.last().map_or(0, |step| step.version);
    if found > supported {
        return Err(SchemaError::TooNew { found, supported });
    }

    let pending: Vec<&SchemaStep> = steps.iter().filter(|step| step.version > found).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction().map_err(SchemaError::Connect)?;
    for step in &pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| SchemaError::Step {
                version: step.version,
                name: step.name,
                source,
            })?;
    }
    tx.commit().map_err(SchemaError::Connect)?;
    Ok(pending.len())
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        params![table],
        |row| row.get(0),
    )
}
