//! [`SqliteStore`] — the SQLite implementation of [`LeaveStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use furlough_core::{
  leave::{LeaveRecord, LeaveRow, NewLeave},
  person::{NewPerson, Person, PersonField, RankAdd, RankDelete},
  store::LeaveStore,
};

use crate::{
  Result,
  encode::{RawLeave, RawLeaveRow, RawPerson, encode_date, encode_dt},
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Furlough record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run any pending migration.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  pub(crate) async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        schema::migrate(conn)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }
}

// ─── LeaveStore impl ─────────────────────────────────────────────────────────

impl LeaveStore for SqliteStore {
  type Error = crate::Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn upsert_person(&self, person: NewPerson) -> Result<Person> {
    let NewPerson { chat_id, rank, surname, given_name, handle, group_number } =
      person;
    let person = Person {
      chat_id,
      rank,
      surname,
      given_name,
      handle,
      group_number,
      registered_at: Utc::now(),
    };

    let rank         = person.rank.clone();
    let surname      = person.surname.clone();
    let given_name   = person.given_name.clone();
    let handle       = person.handle.clone();
    let group_number = person.group_number.clone();
    let at_str       = encode_dt(person.registered_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people
             (chat_id, rank, surname, given_name, handle, group_number, registered_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(chat_id) DO UPDATE SET
             rank          = excluded.rank,
             surname       = excluded.surname,
             given_name    = excluded.given_name,
             handle        = excluded.handle,
             group_number  = excluded.group_number,
             registered_at = excluded.registered_at",
          rusqlite::params![
            chat_id,
            rank,
            surname,
            given_name,
            handle,
            group_number,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn person(&self, chat_id: i64) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT chat_id, rank, surname, given_name, handle,
                      group_number, registered_at
               FROM people WHERE chat_id = ?1",
              rusqlite::params![chat_id],
              |row| {
                Ok(RawPerson {
                  chat_id:       row.get(0)?,
                  rank:          row.get(1)?,
                  surname:       row.get(2)?,
                  given_name:    row.get(3)?,
                  handle:        row.get(4)?,
                  group_number:  row.get(5)?,
                  registered_at: row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT chat_id, rank, surname, given_name, handle,
                  group_number, registered_at
           FROM people
           ORDER BY CAST(group_number AS INTEGER), surname, given_name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPerson {
              chat_id:       row.get(0)?,
              rank:          row.get(1)?,
              surname:       row.get(2)?,
              given_name:    row.get(3)?,
              handle:        row.get(4)?,
              group_number:  row.get(5)?,
              registered_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn count_people(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn update_person_field(
    &self,
    chat_id: i64,
    field: PersonField,
    value: String,
  ) -> Result<bool> {
    // The column name comes from the fixed PersonField allow-list, never
    // from caller input.
    let sql =
      format!("UPDATE people SET {} = ?1 WHERE chat_id = ?2", field.as_str());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params![value, chat_id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn delete_person(&self, chat_id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM people WHERE chat_id = ?1",
          rusqlite::params![chat_id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Leave records ─────────────────────────────────────────────────────────

  async fn book_leave(&self, leave: NewLeave) -> Result<LeaveRecord> {
    let NewLeave { chat_id, kind, date, reason, return_info } = leave;

    let kind_str    = kind.as_str();
    let date_str    = encode_date(date);
    let reason_str  = reason.map(|r| r.as_str());
    let return_info_param = return_info.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO leaves (chat_id, kind, date, reason, return_info)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(chat_id, date) DO UPDATE SET
             kind        = excluded.kind,
             reason      = excluded.reason,
             return_info = excluded.return_info
           RETURNING id",
          rusqlite::params![
            chat_id,
            kind_str,
            date_str,
            reason_str,
            return_info_param,
          ],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(LeaveRecord { id, chat_id, kind, date, reason, return_info })
  }

  async fn future_leaves(
    &self,
    chat_id: i64,
    as_of: NaiveDate,
  ) -> Result<Vec<LeaveRecord>> {
    let as_of_str = encode_date(as_of);

    let raws: Vec<RawLeave> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, chat_id, kind, date, reason, return_info
           FROM leaves
           WHERE chat_id = ?1 AND date >= ?2
           ORDER BY date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![chat_id, as_of_str], |row| {
            Ok(RawLeave {
              id:          row.get(0)?,
              chat_id:     row.get(1)?,
              kind:        row.get(2)?,
              date:        row.get(3)?,
              reason:      row.get(4)?,
              return_info: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLeave::into_record).collect()
  }

  async fn delete_leave(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .execute("DELETE FROM leaves WHERE id = ?1", rusqlite::params![id])?,
        )
      })
      .await?;
    Ok(changed > 0)
  }

  async fn leaves_for_date(&self, date: NaiveDate) -> Result<Vec<LeaveRow>> {
    let date_str = encode_date(date);

    let raws: Vec<RawLeaveRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT l.kind, l.reason, l.return_info,
                  p.rank, p.surname, p.given_name, p.handle, p.group_number
           FROM leaves l
           JOIN people p ON p.chat_id = l.chat_id
           WHERE l.date = ?1
           ORDER BY CAST(p.group_number AS INTEGER), p.surname, p.given_name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            Ok(RawLeaveRow {
              kind:         row.get(0)?,
              reason:       row.get(1)?,
              return_info:  row.get(2)?,
              rank:         row.get(3)?,
              surname:      row.get(4)?,
              given_name:   row.get(5)?,
              handle:       row.get(6)?,
              group_number: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLeaveRow::into_row).collect()
  }

  async fn delete_future_leaves(&self, as_of: NaiveDate) -> Result<u64> {
    let as_of_str = encode_date(as_of);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM leaves WHERE date >= ?1",
          rusqlite::params![as_of_str],
        )?)
      })
      .await?;
    Ok(deleted as u64)
  }

  async fn wipe(&self) -> Result<()> {
    // Dropping the tables (rather than deleting rows) also clears the
    // AUTOINCREMENT bookkeeping, so ids restart from 1.
    self
      .conn
      .call(|conn| {
        conn.execute_batch(
          "DROP TABLE IF EXISTS leaves;
           DROP TABLE IF EXISTS people;
           DROP TABLE IF EXISTS ranks;",
        )?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Rank catalog ──────────────────────────────────────────────────────────

  async fn ranks(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM ranks ORDER BY rowid")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn add_rank(&self, name: String) -> Result<RankAdd> {
    let normalized = name.trim().to_lowercase();

    let added = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO ranks (name) VALUES (?1)",
          rusqlite::params![normalized],
        )?)
      })
      .await?;

    Ok(if added > 0 { RankAdd::Added } else { RankAdd::Duplicate })
  }

  async fn delete_rank(&self, name: String) -> Result<RankDelete> {
    let normalized = name.trim().to_lowercase();

    // Existence check, reference count and delete run inside one call, so
    // no other write can interleave.
    let outcome = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM ranks WHERE name = ?1",
            rusqlite::params![normalized],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(RankDelete::NotFound);
        }

        let people: i64 = conn.query_row(
          "SELECT COUNT(*) FROM people WHERE rank = ?1",
          rusqlite::params![normalized],
          |row| row.get(0),
        )?;
        if people > 0 {
          return Ok(RankDelete::InUse { people: people as u64 });
        }

        conn.execute(
          "DELETE FROM ranks WHERE name = ?1",
          rusqlite::params![normalized],
        )?;
        Ok(RankDelete::Deleted)
      })
      .await?;

    Ok(outcome)
  }

  async fn seed_ranks(&self, names: Vec<String>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("INSERT OR IGNORE INTO ranks (name) VALUES (?1)")?;
        for name in &names {
          stmt.execute(rusqlite::params![name.trim().to_lowercase()])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}
