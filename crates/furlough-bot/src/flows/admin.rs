//! Admin dialogues: profile edits, bulk deletion, full wipe.
//!
//! `/edit` and `/admin` gate on the allowlist at entry; the panel's
//! standing callbacks gate again when pressed, since the buttons outlive
//! the command that produced them.

use chrono::{DateTime, Utc};
use furlough_core::{
  person::{DEFAULT_RANKS, Person, PersonField},
  store::LeaveStore,
};

use crate::{
  callback::CallbackData,
  engine::Engine,
  error::{Error, Result},
  flows,
  session::FlowState,
  transport::{ChatTransport, InlineButton, InlineKeyboard, Markup},
};

const DENIED: &str = "This command is for administrators.";
const ASK_ID: &str = "Send the chat id of the person to edit.";
const BAD_ID: &str = "Chat ids are numeric. Try again:";
const NOT_FOUND: &str = "No one is registered under that id.";
const ASK_VALUE: &str = "Send the new value.";
const UPDATED: &str = "Updated.";
const PANEL: &str = "Admin panel:";
const WIPED: &str = "All data wiped. Default ranks restored.";

// ─── Profile edit ────────────────────────────────────────────────────────────

/// `/edit`.
pub(crate) async fn edit_entry<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if !engine.is_admin(chat_id) {
    return engine.send(chat_id, DENIED, None).await;
  }
  *state = FlowState::EditAwaitingId;
  engine.send(chat_id, ASK_ID, None).await
}

pub(crate) async fn id_input<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  text: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let Ok(target) = text.parse::<i64>() else {
    return engine.send(chat_id, BAD_ID, None).await;
  };
  match engine.store.person(target).await.map_err(Error::store)? {
    Some(person) => {
      *state = FlowState::EditChoosingField { target };
      engine
        .send(chat_id, summary(&person), Some(Markup::Inline(field_keyboard())))
        .await
    }
    None => {
      *state = FlowState::MainMenu;
      engine.send(chat_id, NOT_FOUND, None).await
    }
  }
}

pub(crate) async fn pick_field<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  target: i64,
  field: PersonField,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  *state = FlowState::EditAwaitingValue { target, field };
  engine.ack(callback_id, None).await?;
  engine.send(chat_id, ASK_VALUE, None).await
}

/// The replacement value is written verbatim; admin edits bypass the
/// registration validators.
pub(crate) async fn value_input<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  target: i64,
  field: PersonField,
  text: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let updated = engine
    .store
    .update_person_field(target, field, text.to_owned())
    .await
    .map_err(Error::store)?;
  *state = FlowState::MainMenu;
  let reply = if updated { UPDATED } else { NOT_FOUND };
  engine.send(chat_id, reply, Some(flows::main_menu_keyboard())).await
}

fn summary(person: &Person) -> String {
  format!(
    "{} {} {}, group {}. What should change?",
    person.rank, person.surname, person.given_name, person.group_number,
  )
}

fn field_keyboard() -> InlineKeyboard {
  let button = |label: &str, field: PersonField| {
    InlineButton::new(label, CallbackData::EditField(field).encode())
  };
  InlineKeyboard::default()
    .row(vec![
      button("Rank", PersonField::Rank),
      button("Surname", PersonField::Surname),
    ])
    .row(vec![
      button("Given name", PersonField::GivenName),
      button("Group", PersonField::GroupNumber),
    ])
}

// ─── Panel ───────────────────────────────────────────────────────────────────

/// `/admin`: the panel itself changes no state; its buttons are standing
/// callbacks.
pub(crate) async fn panel<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if !engine.is_admin(chat_id) {
    return engine.send(chat_id, DENIED, None).await;
  }
  let keyboard = InlineKeyboard::default()
    .row(vec![InlineButton::new(
      "Delete future records",
      CallbackData::AdminClear.encode(),
    )])
    .row(vec![InlineButton::new(
      "Wipe all data",
      CallbackData::AdminWipe.encode(),
    )]);
  engine.send(chat_id, PANEL, Some(Markup::Inline(keyboard))).await
}

/// `admin:clear` — drop every record dated today or later.
pub(crate) async fn clear_future<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if !engine.is_admin(chat_id) {
    return engine.ack(callback_id, Some(DENIED)).await;
  }
  let today = engine.policy.today(now);
  let removed =
    engine.store.delete_future_leaves(today).await.map_err(Error::store)?;
  engine.ack(callback_id, None).await?;
  engine
    .send(chat_id, format!("Removed {removed} upcoming records."), None)
    .await
}

/// `admin:wipe` — clear every table, then restore the default rank catalog
/// so registration still has something to offer.
pub(crate) async fn wipe<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if !engine.is_admin(chat_id) {
    return engine.ack(callback_id, Some(DENIED)).await;
  }
  engine.store.wipe().await.map_err(Error::store)?;
  engine
    .store
    .seed_ranks(DEFAULT_RANKS.map(str::to_owned).to_vec())
    .await
    .map_err(Error::store)?;
  tracing::info!(chat_id, "store wiped by admin");
  engine.ack(callback_id, None).await?;
  engine.send(chat_id, WIPED, None).await
}
