//! Transport-neutral chat abstraction.
//!
//! The engine never talks to a messaging network directly; it emits prompts
//! through [`ChatTransport`] and consumes [`Inbound`] events someone else
//! decoded. [`crate::telegram::TelegramClient`] is the production
//! implementation; tests substitute a recording double.

use std::future::Future;

// ─── Outbound markup ─────────────────────────────────────────────────────────

/// A single inline button: the visible label plus the callback payload the
/// transport echoes back when it is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
  pub text: String,
  pub data: String,
}

impl InlineButton {
  pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
    Self { text: text.into(), data: data.into() }
  }
}

/// Rows of inline buttons attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineKeyboard {
  pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
  pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
    self.rows.push(buttons);
    self
  }
}

/// Keyboard variants a message may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
  /// Reply keyboard: rows of plain text buttons shown in place of the
  /// input field. Pressing one sends its label as an ordinary text message.
  Reply(Vec<Vec<String>>),
  /// Inline keyboard attached to the message itself.
  Inline(InlineKeyboard),
  /// Remove whatever reply keyboard the chat currently shows.
  Remove,
}

impl Markup {
  pub fn reply(rows: &[&[&str]]) -> Self {
    Self::Reply(
      rows
        .iter()
        .map(|row| row.iter().map(|label| label.to_string()).collect())
        .collect(),
    )
  }
}

// ─── Inbound events ──────────────────────────────────────────────────────────

/// The slash commands the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Start,
  Cancel,
  Edit,
  Admin,
}

impl Command {
  /// Parse a leading slash command, tolerating a `@botname` suffix and
  /// trailing arguments. Unknown commands return `None` and are treated as
  /// plain text upstream.
  pub fn parse(text: &str) -> Option<Self> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = match name.split_once('@') {
      Some((bare, _)) => bare,
      None => name,
    };
    match name {
      "start" => Some(Self::Start),
      "cancel" => Some(Self::Cancel),
      "edit" => Some(Self::Edit),
      "admin" => Some(Self::Admin),
      _ => None,
    }
  }
}

/// One decoded inbound event for one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
  pub chat_id: i64,
  /// Transport username, when the transport exposes one. Captured into the
  /// Person row at registration time.
  pub handle:  Option<String>,
  pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
  Command(Command),
  Text(String),
  /// A button press on an inline keyboard. `id` must be acknowledged
  /// exactly once; `message_id` addresses the message carrying the
  /// keyboard for in-place edits.
  Callback { id: String, message_id: i64, data: String },
}

// ─── Transport trait ─────────────────────────────────────────────────────────

/// Outbound side of a chat transport.
///
/// Implementations must be cheap to clone or share; the engine holds one
/// instance for all chats.
pub trait ChatTransport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Deliver a new message, optionally with a keyboard.
  fn send(
    &self,
    chat_id: i64,
    text: String,
    markup: Option<Markup>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the text and inline keyboard of a previously sent message.
  fn edit(
    &self,
    chat_id: i64,
    message_id: i64,
    text: String,
    keyboard: Option<InlineKeyboard>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Answer a callback query, optionally with a short notice shown to the
  /// user. Required after every callback even when nothing else happens.
  fn ack(
    &self,
    callback_id: String,
    notice: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::Command;

  #[test]
  fn commands_parse_with_suffix_and_arguments() {
    assert_eq!(Command::parse("/start"), Some(Command::Start));
    assert_eq!(Command::parse("/start@furlough_bot"), Some(Command::Start));
    assert_eq!(Command::parse("/cancel now"), Some(Command::Cancel));
    assert_eq!(Command::parse("/edit"), Some(Command::Edit));
    assert_eq!(Command::parse("/admin"), Some(Command::Admin));
  }

  #[test]
  fn non_commands_do_not_parse() {
    assert_eq!(Command::parse("start"), None);
    assert_eq!(Command::parse("/unknown"), None);
    assert_eq!(Command::parse(""), None);
    assert_eq!(Command::parse("   "), None);
  }
}
