//! Leave booking: date, type, reason, return time.
//!
//! Dates are validated when offered and again when clicked; a keyboard can
//! sit untouched past a deadline, so the click-time verdict is the one that
//! counts.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use furlough_core::{
  leave::{LeaveKind, NewLeave, Reason, return_info},
  policy::Verdict,
  store::LeaveStore,
};

use crate::{
  calendar,
  callback::CallbackData,
  engine::Engine,
  error::{Error, Result},
  flows::{self, main_menu_keyboard},
  session::FlowState,
  transport::{ChatTransport, InlineButton, InlineKeyboard, Markup},
};

const PICK_DATE: &str = "When do you want to go?";
const PICK_REASON: &str = "What is the reason for the 24-hour leave?";
const PICK_RETURN: &str = "When will you be back?";
const DATE_CLOSED: &str = "Submissions for that date are already closed.";
const NO_RECORDS: &str = "No upcoming leave records.";
const RECORD_CANCELLED: &str = "Record cancelled.";
const RECORD_GONE: &str = "That record is already gone.";

// ─── Main menu ───────────────────────────────────────────────────────────────

pub(crate) async fn main_menu_choice<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  text: &str,
  state: &mut FlowState,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  // The person row can vanish under a live session (admin wipe); fall back
  // to registration rather than booking for a missing owner.
  if engine.store.person(chat_id).await.map_err(Error::store)?.is_none() {
    return flows::registration::begin(engine, chat_id, state).await;
  }
  match text {
    flows::BOOK_LEAVE => offer_dates(engine, chat_id, state, now).await,
    flows::MY_RECORDS => my_records(engine, chat_id, now).await,
    _ => {
      engine.send(chat_id, flows::MAIN_MENU, Some(main_menu_keyboard())).await
    }
  }
}

async fn offer_dates<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  state: &mut FlowState,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let today = engine.policy.today(now);
  let tomorrow = today + Days::new(1);
  let mut keyboard =
    InlineKeyboard::default().row(vec![day_button("Tomorrow", tomorrow)]);
  if let Verdict::SameDay { open: true } = engine.policy.verdict(now, today) {
    keyboard = keyboard.row(vec![day_button("Today", today)]);
  }
  let keyboard = keyboard.row(vec![InlineButton::new(
    "Open calendar",
    CallbackData::OpenCalendar.encode(),
  )]);
  *state = FlowState::ChoosingDate;
  engine.send(chat_id, PICK_DATE, Some(Markup::Inline(keyboard))).await
}

fn day_button(label: &str, date: NaiveDate) -> InlineButton {
  InlineButton::new(
    format!("{label}, {}", date.format("%d.%m")),
    CallbackData::Day(date).encode(),
  )
}

async fn my_records<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let today = engine.policy.today(now);
  let records =
    engine.store.future_leaves(chat_id, today).await.map_err(Error::store)?;
  if records.is_empty() {
    return engine.send(chat_id, NO_RECORDS, None).await;
  }
  let mut lines = vec!["Your upcoming leaves:".to_owned()];
  let mut keyboard = InlineKeyboard::default();
  for record in &records {
    let mut line =
      format!("{} {}", record.date.format("%d.%m.%Y"), record.kind.as_str());
    if let Some(info) = &record.return_info {
      line.push_str(&format!(" ({info})"));
    }
    lines.push(line);
    keyboard = keyboard.row(vec![InlineButton::new(
      format!("Cancel {}", record.date.format("%d.%m")),
      CallbackData::CancelLeave(record.id).encode(),
    )]);
  }
  engine
    .send(chat_id, lines.join("\n"), Some(Markup::Inline(keyboard)))
    .await
}

// ─── Date selection ──────────────────────────────────────────────────────────

pub(crate) async fn pick_date<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  date: NaiveDate,
  state: &mut FlowState,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if !engine.policy.verdict(now, date).is_open() {
    return engine.ack(callback_id, Some(DATE_CLOSED)).await;
  }
  *state = FlowState::ChoosingType { date };
  engine.ack(callback_id, None).await?;
  engine
    .send(
      chat_id,
      type_prompt(date),
      Some(Markup::Inline(type_keyboard(date))),
    )
    .await
}

pub(crate) async fn show_calendar<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  message_id: i64,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let today = engine.policy.today(now);
  render_calendar(
    engine,
    chat_id,
    callback_id,
    message_id,
    today.year(),
    today.month(),
    today,
  )
  .await
}

pub(crate) async fn navigate_calendar<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  message_id: i64,
  year: i32,
  month: u32,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let today = engine.policy.today(now);
  render_calendar(engine, chat_id, callback_id, message_id, year, month, today)
    .await
}

async fn render_calendar<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  message_id: i64,
  year: i32,
  month: u32,
  today: NaiveDate,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let Some(keyboard) = calendar::month_keyboard(year, month, today) else {
    // Only a forged nav payload can point outside chrono's range.
    return engine.ack(callback_id, None).await;
  };
  engine.ack(callback_id, None).await?;
  engine.edit(chat_id, message_id, PICK_DATE, Some(keyboard)).await
}

fn type_prompt(date: NaiveDate) -> String {
  let mut text =
    format!("Leave on {}. Choose the type:", date.format("%d.%m.%Y"));
  match date.weekday() {
    Weekday::Sat => {
      text.push_str("\nRegular leave departs at 17:00 on Saturdays.");
    }
    Weekday::Sun => {
      text.push_str("\nRegular leave departs at 09:00 on Sundays.");
    }
    _ => {}
  }
  text
}

/// Saturday swaps the plain 24-hour button for the pre-collapsed pair.
fn type_keyboard(date: NaiveDate) -> InlineKeyboard {
  let day_long = if date.weekday() == Weekday::Sat {
    InlineButton::new("24-hour (report)", CallbackData::SaturdayAuto.encode())
  } else {
    InlineButton::new("24-hour", CallbackData::Kind(LeaveKind::DayLong).encode())
  };
  InlineKeyboard::default()
    .row(vec![InlineButton::new(
      "Regular",
      CallbackData::Kind(LeaveKind::Regular).encode(),
    )])
    .row(vec![day_long])
}

// ─── Type, reason, return time ───────────────────────────────────────────────

pub(crate) async fn pick_kind<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  date: NaiveDate,
  kind: LeaveKind,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  match kind {
    LeaveKind::Regular => {
      let leave = NewLeave {
        chat_id,
        kind: LeaveKind::Regular,
        date,
        reason: None,
        return_info: Some(return_info::REGULAR.to_owned()),
      };
      complete(engine, chat_id, callback_id, leave, state).await
    }
    LeaveKind::DayLong => {
      *state = FlowState::ChoosingReason { date };
      engine.ack(callback_id, None).await?;
      engine
        .send(chat_id, PICK_REASON, Some(Markup::Inline(reason_keyboard())))
        .await
    }
  }
}

pub(crate) async fn saturday_auto<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  date: NaiveDate,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let leave = NewLeave {
    chat_id,
    kind: LeaveKind::DayLong,
    date,
    reason: Some(Reason::Report),
    return_info: Some(return_info::SATURDAY_AUTO.to_owned()),
  };
  complete(engine, chat_id, callback_id, leave, state).await
}

pub(crate) async fn pick_reason<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  date: NaiveDate,
  reason: Reason,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  match reason {
    Reason::Report => {
      let leave = NewLeave {
        chat_id,
        kind: LeaveKind::DayLong,
        date,
        reason: Some(Reason::Report),
        return_info: Some(return_info::REPORT.to_owned()),
      };
      complete(engine, chat_id, callback_id, leave, state).await
    }
    Reason::Dispensation => {
      *state = FlowState::ChoosingReturnTime { date, reason };
      engine.ack(callback_id, None).await?;
      engine
        .send(chat_id, PICK_RETURN, Some(Markup::Inline(return_keyboard())))
        .await
    }
  }
}

pub(crate) async fn pick_return_time<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  date: NaiveDate,
  reason: Reason,
  label: String,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let offered =
    [return_info::DISPENSATION_EARLY, return_info::DISPENSATION_LATE];
  if !offered.contains(&label.as_str()) {
    // The keyboard only offers the two labels; anything else is forged.
    return engine.ack(callback_id, None).await;
  }
  let leave = NewLeave {
    chat_id,
    kind: LeaveKind::DayLong,
    date,
    reason: Some(reason),
    return_info: Some(label),
  };
  complete(engine, chat_id, callback_id, leave, state).await
}

fn reason_keyboard() -> InlineKeyboard {
  InlineKeyboard::default()
    .row(vec![InlineButton::new(
      "Report",
      CallbackData::Reason(Reason::Report).encode(),
    )])
    .row(vec![InlineButton::new(
      "Has dispensation",
      CallbackData::Reason(Reason::Dispensation).encode(),
    )])
}

fn return_keyboard() -> InlineKeyboard {
  let button = |label: &str| {
    InlineButton::new(label, CallbackData::ReturnTime(label.to_owned()).encode())
  };
  InlineKeyboard::default().row(vec![
    button(return_info::DISPENSATION_EARLY),
    button(return_info::DISPENSATION_LATE),
  ])
}

/// Book (or overwrite) the record and return to the menu.
async fn complete<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  leave: NewLeave,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let record = engine.store.book_leave(leave).await.map_err(Error::store)?;
  *state = FlowState::MainMenu;
  engine.ack(callback_id, None).await?;
  let mut text = format!(
    "Booked: {} leave on {}",
    record.kind.as_str(),
    record.date.format("%d.%m.%Y"),
  );
  if let Some(reason) = record.reason {
    text.push_str(&format!(", reason: {}", reason.as_str()));
  }
  if let Some(info) = &record.return_info {
    text.push_str(&format!(", back {info}"));
  }
  text.push('.');
  engine.send(chat_id, text, Some(main_menu_keyboard())).await
}

// ─── Standing callbacks ──────────────────────────────────────────────────────

/// `cancel:<id>`, valid in any state: the buttons ride on the "My records"
/// message, which outlives the conversation that produced it. Only the
/// caller's own upcoming records qualify.
pub(crate) async fn cancel_leave<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  leave_id: i64,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let today = engine.policy.today(now);
  let mine = engine
    .store
    .future_leaves(chat_id, today)
    .await
    .map_err(Error::store)?
    .iter()
    .any(|record| record.id == leave_id);
  let deleted = if mine {
    engine.store.delete_leave(leave_id).await.map_err(Error::store)?
  } else {
    false
  };
  let notice = if deleted { RECORD_CANCELLED } else { RECORD_GONE };
  engine.ack(callback_id, Some(notice)).await
}
