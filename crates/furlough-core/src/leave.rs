//! Leave records — one booked leave event per person per date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Leave kinds ─────────────────────────────────────────────────────────────

/// The two bookable leave subtypes. The serialised tags are wire format for
/// both the database and the listing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveKind {
  #[serde(rename = "regular")]
  Regular,
  #[serde(rename = "24-hour")]
  DayLong,
}

impl LeaveKind {
  /// The discriminant string stored in the `kind` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Regular => "regular",
      Self::DayLong => "24-hour",
    }
  }
}

impl std::str::FromStr for LeaveKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "regular" => Ok(Self::Regular),
      "24-hour" => Ok(Self::DayLong),
      other => Err(Error::UnknownLeaveKind(other.to_owned())),
    }
  }
}

/// Why a 24-hour leave holder is out overnight. Collected only for that
/// kind; regular leave carries no reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
  Report,
  Dispensation,
}

impl Reason {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Report => "report",
      Self::Dispensation => "dispensation",
    }
  }
}

impl std::str::FromStr for Reason {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "report" => Ok(Self::Report),
      "dispensation" => Ok(Self::Dispensation),
      other => Err(Error::UnknownReason(other.to_owned())),
    }
  }
}

/// Fixed return-time labels attached at booking time. Informational only;
/// nothing downstream parses them.
pub mod return_info {
  /// Regular leave, any day.
  pub const REGULAR: &str = "until 21:30";
  /// 24-hour leave booked with reason "report".
  pub const REPORT: &str = "until 06:00";
  /// Saturday's automatic 24-hour pair.
  pub const SATURDAY_AUTO: &str = "until 08:30";
  /// The two choices offered under a dispensation.
  pub const DISPENSATION_EARLY: &str = "until 06:00";
  pub const DISPENSATION_LATE: &str = "until 08:00";
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One booked leave event. At most one exists per (person, date); re-booking
/// the same date overwrites kind, reason and return-info in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRecord {
  pub id:          i64,
  pub chat_id:     i64,
  pub kind:        LeaveKind,
  pub date:        NaiveDate,
  pub reason:      Option<Reason>,
  pub return_info: Option<String>,
}

/// Input to [`crate::store::LeaveStore::book_leave`].
/// The row id is assigned by the store, and preserved when the booking
/// overwrites an existing one.
#[derive(Debug, Clone)]
pub struct NewLeave {
  pub chat_id:     i64,
  pub kind:        LeaveKind,
  pub date:        NaiveDate,
  pub reason:      Option<Reason>,
  pub return_info: Option<String>,
}

/// A leave record joined with its owner, as returned by
/// [`crate::store::LeaveStore::leaves_for_date`].
#[derive(Debug, Clone)]
pub struct LeaveRow {
  pub kind:         LeaveKind,
  pub reason:       Option<Reason>,
  pub return_info:  Option<String>,
  pub rank:         String,
  pub surname:      String,
  pub given_name:   String,
  pub handle:       Option<String>,
  pub group_number: String,
}
