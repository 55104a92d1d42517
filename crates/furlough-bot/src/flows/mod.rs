//! Conversation flows, one module per dialogue, plus the prompts and
//! transitions they share.

pub(crate) mod admin;
pub(crate) mod booking;
pub(crate) mod registration;

use furlough_core::store::LeaveStore;

use crate::{
  engine::Engine,
  error::{Error, Result},
  session::FlowState,
  transport::{ChatTransport, Markup},
};

/// Main-menu reply-keyboard labels. Pressing one sends the label back as
/// plain text, so dispatch matches on these exact strings.
pub(crate) const BOOK_LEAVE: &str = "Book leave";
pub(crate) const MY_RECORDS: &str = "My records";

pub(crate) const MAIN_MENU: &str = "What would you like to do?";
pub(crate) const CANCELLED: &str = "Cancelled. Back to the main menu.";
pub(crate) const NOT_REGISTERED: &str =
  "Nothing to cancel. Send /start to register first.";
pub(crate) const USE_THE_BUTTONS: &str =
  "Use the buttons above, or send /cancel to start over.";
pub(crate) const SESSION_EXPIRED: &str =
  "That keyboard has expired. Start again from the menu.";

pub(crate) fn main_menu_keyboard() -> Markup {
  Markup::reply(&[&[BOOK_LEAVE, MY_RECORDS]])
}

/// `/cancel`: drop any scratch state. Registered chats land back at the
/// menu; unregistered ones go idle.
pub(crate) async fn cancel<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let registered =
    engine.store.person(chat_id).await.map_err(Error::store)?.is_some();
  if registered {
    *state = FlowState::MainMenu;
    engine.send(chat_id, CANCELLED, Some(main_menu_keyboard())).await
  } else {
    *state = FlowState::Idle;
    engine.send(chat_id, NOT_REGISTERED, None).await
  }
}

/// A callback that no longer matches the session, pressed on a keyboard
/// that outlived its conversation.
pub(crate) async fn expired<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  callback_id: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let registered =
    engine.store.person(chat_id).await.map_err(Error::store)?.is_some();
  *state = if registered { FlowState::MainMenu } else { FlowState::Idle };
  engine.ack(callback_id, Some(SESSION_EXPIRED)).await
}
