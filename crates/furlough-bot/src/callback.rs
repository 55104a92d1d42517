//! Callback payload grammar.
//!
//! Inline buttons carry a short `tag:value` string; this module is the only
//! place that encodes or parses it. Payloads ride through the transport
//! verbatim, so parsing must tolerate anything a stale keyboard or a forged
//! client may send back.

use chrono::NaiveDate;
use furlough_core::{
  leave::{LeaveKind, Reason},
  person::PersonField,
};

/// Everything an inline button may ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
  /// `day:<yyyy-mm-dd>` — pick this date for the leave being booked.
  Day(NaiveDate),
  /// `calendar` — replace the date shortcuts with the month grid.
  OpenCalendar,
  /// `nav:<yyyy-mm>` — re-render the grid for another month.
  Nav { year: i32, month: u32 },
  /// `type:regular` / `type:24h` — pick the leave kind.
  Kind(LeaveKind),
  /// `type:24h:auto` — Saturday's pre-collapsed 24-hour pair.
  SaturdayAuto,
  /// `reason:<reason>` — why a 24-hour holder is out overnight.
  Reason(Reason),
  /// `time:<label>` — chosen return-time label. Split at the first colon
  /// only; the label itself contains one.
  ReturnTime(String),
  /// `cancel:<id>` — self-cancel one leave record. Valid in any state.
  CancelLeave(i64),
  /// `field:<field>` — admin edit, choose which person field to overwrite.
  EditField(PersonField),
  /// `admin:clear` — bulk-delete records dated today or later.
  AdminClear,
  /// `admin:wipe` — clear every table and re-seed the rank catalog.
  AdminWipe,
  /// `ignore` — inert cell; acknowledged silently.
  Ignore,
}

impl CallbackData {
  pub fn encode(&self) -> String {
    match self {
      Self::Day(date) => format!("day:{}", date.format("%Y-%m-%d")),
      Self::OpenCalendar => "calendar".to_owned(),
      Self::Nav { year, month } => format!("nav:{year}-{month:02}"),
      Self::Kind(LeaveKind::Regular) => "type:regular".to_owned(),
      Self::Kind(LeaveKind::DayLong) => "type:24h".to_owned(),
      Self::SaturdayAuto => "type:24h:auto".to_owned(),
      Self::Reason(reason) => format!("reason:{}", reason.as_str()),
      Self::ReturnTime(label) => format!("time:{label}"),
      Self::CancelLeave(id) => format!("cancel:{id}"),
      Self::EditField(field) => format!("field:{}", field.as_str()),
      Self::AdminClear => "admin:clear".to_owned(),
      Self::AdminWipe => "admin:wipe".to_owned(),
      Self::Ignore => "ignore".to_owned(),
    }
  }

  /// Parse a payload. `None` for anything this bot never emitted.
  pub fn parse(data: &str) -> Option<Self> {
    match data {
      "calendar" => return Some(Self::OpenCalendar),
      "ignore" => return Some(Self::Ignore),
      _ => {}
    }
    let (tag, rest) = data.split_once(':')?;
    match tag {
      "day" => NaiveDate::parse_from_str(rest, "%Y-%m-%d").ok().map(Self::Day),
      "nav" => {
        let (year, month) = rest.split_once('-')?;
        let year = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some(Self::Nav { year, month })
      }
      "type" => match rest {
        "regular" => Some(Self::Kind(LeaveKind::Regular)),
        "24h" => Some(Self::Kind(LeaveKind::DayLong)),
        "24h:auto" => Some(Self::SaturdayAuto),
        _ => None,
      },
      "reason" => rest.parse().ok().map(Self::Reason),
      "time" => Some(Self::ReturnTime(rest.to_owned())),
      "cancel" => rest.parse().ok().map(Self::CancelLeave),
      "field" => rest.parse().ok().map(Self::EditField),
      "admin" => match rest {
        "clear" => Some(Self::AdminClear),
        "wipe" => Some(Self::AdminWipe),
        _ => None,
      },
      _ => None,
    }
  }
}
