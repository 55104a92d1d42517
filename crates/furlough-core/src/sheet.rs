//! The per-date day sheet served to the viewer dashboard.
//!
//! Assembly and name formatting live here so every consumer renders entries
//! the same way; the store only supplies ordered rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::leave::{LeaveKind, LeaveRow, Reason};

/// One listed person on a day sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayEntry {
  pub full_name:    String,
  pub handle:       Option<String>,
  pub group_number: String,
  pub reason:       Option<Reason>,
  pub return_info:  Option<String>,
}

/// The per-kind entry lists. Serialised keys are the wire-format leave-kind
/// tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayLists {
  pub regular:  Vec<DayEntry>,
  #[serde(rename = "24-hour")]
  pub day_long: Vec<DayEntry>,
}

/// The `/api/lists/{date}` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySheet {
  pub request_date:        NaiveDate,
  pub total_registrations: u64,
  pub lists:               DayLists,
}

impl DaySheet {
  /// Assemble a sheet from rows already ordered by (group, surname, given
  /// name); assembly preserves that order within each list.
  pub fn assemble(
    request_date: NaiveDate,
    total_registrations: u64,
    rows: Vec<LeaveRow>,
  ) -> Self {
    let mut lists = DayLists::default();
    for row in rows {
      let entry = DayEntry {
        full_name:    display_name(&row.rank, &row.surname, &row.given_name),
        handle:       row.handle,
        group_number: row.group_number,
        reason:       row.reason,
        return_info:  row.return_info,
      };
      match row.kind {
        LeaveKind::Regular => lists.regular.push(entry),
        LeaveKind::DayLong => lists.day_long.push(entry),
      }
    }
    Self { request_date, total_registrations, lists }
  }
}

/// The single display-formatting rule for listed names: the rank prefix is
/// lowercased (it is stored lowercase already, but legacy rows may differ),
/// the surname capitalised, the given name appended as stored.
pub fn display_name(rank: &str, surname: &str, given_name: &str) -> String {
  format!("{} {} {}", rank.to_lowercase(), capitalize(surname), given_name)
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
