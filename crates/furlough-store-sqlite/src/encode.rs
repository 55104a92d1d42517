//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`.
//! Leave kinds and reasons are stored by their wire tags.

use chrono::{DateTime, NaiveDate, Utc};
use furlough_core::{
  leave::{LeaveKind, LeaveRecord, LeaveRow, Reason},
  person::Person,
};

use crate::{Error, Result};

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_reason(s: Option<&str>) -> Result<Option<Reason>> {
  Ok(s.map(|v| v.parse::<Reason>()).transpose()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub chat_id:       i64,
  pub rank:          String,
  pub surname:       String,
  pub given_name:    String,
  pub handle:        Option<String>,
  pub group_number:  String,
  pub registered_at: String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      chat_id:       self.chat_id,
      rank:          self.rank,
      surname:       self.surname,
      given_name:    self.given_name,
      handle:        self.handle,
      group_number:  self.group_number,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}

/// Raw strings read directly from a `leaves` row.
pub struct RawLeave {
  pub id:          i64,
  pub chat_id:     i64,
  pub kind:        String,
  pub date:        String,
  pub reason:      Option<String>,
  pub return_info: Option<String>,
}

impl RawLeave {
  pub fn into_record(self) -> Result<LeaveRecord> {
    Ok(LeaveRecord {
      id:          self.id,
      chat_id:     self.chat_id,
      kind:        self.kind.parse::<LeaveKind>()?,
      date:        decode_date(&self.date)?,
      reason:      decode_reason(self.reason.as_deref())?,
      return_info: self.return_info,
    })
  }
}

/// Raw strings from a `leaves` row joined with its `people` owner.
pub struct RawLeaveRow {
  pub kind:         String,
  pub reason:       Option<String>,
  pub return_info:  Option<String>,
  pub rank:         String,
  pub surname:      String,
  pub given_name:   String,
  pub handle:       Option<String>,
  pub group_number: String,
}

impl RawLeaveRow {
  pub fn into_row(self) -> Result<LeaveRow> {
    Ok(LeaveRow {
      kind:         self.kind.parse::<LeaveKind>()?,
      reason:       decode_reason(self.reason.as_deref())?,
      return_info:  self.return_info,
      rank:         self.rank,
      surname:      self.surname,
      given_name:   self.given_name,
      handle:       self.handle,
      group_number: self.group_number,
    })
  }
}
