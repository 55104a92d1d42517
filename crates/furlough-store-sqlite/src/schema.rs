//! SQL schema for the Furlough SQLite store.
//!
//! Versioned via `PRAGMA user_version`: a fresh database gets the full DDL,
//! an existing one is stepped up release by release by [`migrate`].

/// Per-connection settings. Applied on every open — unlike the DDL, these do
/// not persist in the database file.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL for a fresh database.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS people (
    chat_id       INTEGER PRIMARY KEY,   -- transport-assigned identity
    rank          TEXT NOT NULL,         -- catalog name, lowercase
    surname       TEXT NOT NULL,
    given_name    TEXT NOT NULL,
    handle        TEXT,
    group_number  TEXT NOT NULL,
    registered_at TEXT NOT NULL          -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS leaves (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id     INTEGER NOT NULL REFERENCES people(chat_id) ON DELETE CASCADE,
    kind        TEXT NOT NULL,           -- 'regular' | '24-hour'
    date        TEXT NOT NULL,           -- YYYY-MM-DD
    reason      TEXT,                    -- 'report' | 'dispensation'
    return_info TEXT,
    UNIQUE (chat_id, date)
);

-- Catalog order is rowid (insertion) order.
CREATE TABLE IF NOT EXISTS ranks (
    name TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS leaves_date_idx ON leaves(date);
CREATE INDEX IF NOT EXISTS leaves_chat_idx ON leaves(chat_id);

PRAGMA user_version = 2;
";

/// Version 1 databases predate per-leave reasons and return times.
const V1_TO_V2: &str = "
ALTER TABLE leaves ADD COLUMN reason TEXT;
ALTER TABLE leaves ADD COLUMN return_info TEXT;
PRAGMA user_version = 2;
";

/// Bring a database at any prior schema version up to the current one.
/// Runs inside the store's opening `call`, before any other statement.
pub fn migrate(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.execute_batch(PRAGMAS)?;

  let version: i64 =
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
  match version {
    0 => conn.execute_batch(SCHEMA)?,
    1 => conn.execute_batch(V1_TO_V2)?,
    _ => {}
  }
  Ok(())
}
