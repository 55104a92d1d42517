//! Inline month-grid calendar.
//!
//! Weeks run Monday to Sunday. Days before `today` and the padding cells
//! around the month are inert (`ignore` payload); everything else carries a
//! `day:` payload and is validated again at click time.

use chrono::{Datelike, Months, NaiveDate};

use crate::{
  callback::CallbackData,
  transport::{InlineButton, InlineKeyboard},
};

const MONTH_NAMES: [&str; 12] = [
  "January", "February", "March", "April", "May", "June", "July", "August",
  "September", "October", "November", "December",
];

const WEEKDAY_HEADER: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Render one month as an inline keyboard: a navigation row, a weekday
/// header row, then the day grid. `None` when `year`/`month` is outside
/// chrono's range, which only a forged payload can request.
pub fn month_keyboard(
  year: i32,
  month: u32,
  today: NaiveDate,
) -> Option<InlineKeyboard> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let prev = first.checked_sub_months(Months::new(1))?;
  let next = first.checked_add_months(Months::new(1))?;
  let days_in_month = next.signed_duration_since(first).num_days() as u32;

  let mut keyboard = InlineKeyboard::default()
    .row(vec![
      nav_button("«", prev),
      inert(month_title(year, month)),
      nav_button("»", next),
    ])
    .row(WEEKDAY_HEADER.iter().map(|name| inert(*name)).collect());

  let mut week: Vec<InlineButton> = Vec::with_capacity(7);
  for _ in 0..first.weekday().num_days_from_monday() {
    week.push(inert(" "));
  }
  for day in 1..=days_in_month {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    week.push(if date < today {
      inert(day.to_string())
    } else {
      InlineButton::new(day.to_string(), CallbackData::Day(date).encode())
    });
    if week.len() == 7 {
      keyboard = keyboard.row(std::mem::take(&mut week));
    }
  }
  if !week.is_empty() {
    while week.len() < 7 {
      week.push(inert(" "));
    }
    keyboard = keyboard.row(week);
  }
  Some(keyboard)
}

fn month_title(year: i32, month: u32) -> String {
  let name = (month as usize)
    .checked_sub(1)
    .and_then(|index| MONTH_NAMES.get(index));
  match name {
    Some(name) => format!("{name} {year}"),
    None => format!("{month:02}.{year}"),
  }
}

fn nav_button(label: &str, target: NaiveDate) -> InlineButton {
  let data = CallbackData::Nav { year: target.year(), month: target.month() };
  InlineButton::new(label, data.encode())
}

fn inert(label: impl Into<String>) -> InlineButton {
  InlineButton::new(label, CallbackData::Ignore.encode())
}
