//! Person — a registered participant keyed by chat identity — and the rank
//! catalog that constrains their rank field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Catalog entries seeded into an empty store. Stored lowercase; any cosmetic
/// capitalisation happens at presentation time only.
pub const DEFAULT_RANKS: [&str; 4] =
  ["soldier", "senior soldier", "junior sergeant", "sergeant"];

// ─── Person ──────────────────────────────────────────────────────────────────

/// A registered participant. The chat id is assigned by the transport and is
/// the primary key; re-registration overwrites every other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub chat_id:       i64,
  /// A name from the rank catalog, stored lowercase.
  pub rank:          String,
  pub surname:       String,
  pub given_name:    String,
  /// Transport username, when the transport exposes one.
  pub handle:        Option<String>,
  /// Numeric string; validated on entry, stored as given.
  pub group_number:  String,
  pub registered_at: DateTime<Utc>,
}

/// Input to [`crate::store::LeaveStore::upsert_person`].
/// `registered_at` is always set by the store; it is not accepted from
/// callers.
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub chat_id:      i64,
  pub rank:         String,
  pub surname:      String,
  pub given_name:   String,
  pub handle:       Option<String>,
  pub group_number: String,
}

/// The fixed allow-list of person fields an admin edit may overwrite.
/// Updates never reach any column outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonField {
  Rank,
  Surname,
  GivenName,
  GroupNumber,
}

impl PersonField {
  /// The column discriminant; doubles as the callback payload.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Rank => "rank",
      Self::Surname => "surname",
      Self::GivenName => "given_name",
      Self::GroupNumber => "group_number",
    }
  }
}

impl std::str::FromStr for PersonField {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "rank" => Ok(Self::Rank),
      "surname" => Ok(Self::Surname),
      "given_name" => Ok(Self::GivenName),
      "group_number" => Ok(Self::GroupNumber),
      other => Err(Error::UnknownPersonField(other.to_owned())),
    }
  }
}

// ─── Rank catalog outcomes ───────────────────────────────────────────────────

/// Outcome of adding a rank to the catalog. A duplicate name is an expected
/// condition, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankAdd {
  Added,
  /// The name is already in the catalog; nothing was changed.
  Duplicate,
}

/// Outcome of deleting a rank from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDelete {
  Deleted,
  /// At least one person still holds the rank; nothing was changed.
  InUse { people: u64 },
  NotFound,
}
