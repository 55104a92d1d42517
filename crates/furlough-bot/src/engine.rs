//! Event dispatch: one inbound event in, one state transition plus prompts
//! out.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use furlough_core::{policy::DeadlinePolicy, store::LeaveStore};

use crate::{
  callback::CallbackData,
  error::{Error, Result},
  flows,
  session::{FlowState, SessionMap},
  transport::{
    ChatTransport, Command, Inbound, InboundPayload, InlineKeyboard, Markup,
  },
};

/// The conversation engine. One instance serves every chat; generic over
/// the store and the transport so tests can substitute both.
pub struct Engine<S, C> {
  pub(crate) store:  Arc<S>,
  pub(crate) chat:   C,
  pub(crate) policy: DeadlinePolicy,
  admins:            HashSet<i64>,
  sessions:          SessionMap,
}

impl<S, C> Engine<S, C>
where
  S: LeaveStore,
  C: ChatTransport,
{
  pub fn new(
    store: Arc<S>,
    chat: C,
    policy: DeadlinePolicy,
    admins: HashSet<i64>,
  ) -> Self {
    Self { store, chat, policy, admins, sessions: SessionMap::new() }
  }

  pub fn is_admin(&self, chat_id: i64) -> bool {
    self.admins.contains(&chat_id)
  }

  /// Drive one inbound event to completion.
  pub async fn handle(&self, inbound: Inbound) -> Result<()> {
    self.handle_at(inbound, Utc::now()).await
  }

  /// [`Engine::handle`] with an explicit clock; the deterministic seam.
  ///
  /// The chat's session lock is held for the whole event, so one chat's
  /// events apply in arrival order.
  pub async fn handle_at(
    &self,
    inbound: Inbound,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let Inbound { chat_id, handle, payload } = inbound;
    let session = self.sessions.session(chat_id);
    let mut state = session.lock().await;

    match payload {
      InboundPayload::Command(command) => {
        self.on_command(chat_id, command, &mut state).await
      }
      InboundPayload::Text(text) => {
        self.on_text(chat_id, handle, &text, &mut state, now).await
      }
      InboundPayload::Callback { id, message_id, data } => {
        self
          .on_callback(chat_id, &id, message_id, &data, &mut state, now)
          .await
      }
    }
  }

  // ── Dispatch ──

  async fn on_command(
    &self,
    chat_id: i64,
    command: Command,
    state: &mut FlowState,
  ) -> Result<()> {
    match command {
      Command::Start => flows::registration::start(self, chat_id, state).await,
      Command::Cancel => flows::cancel(self, chat_id, state).await,
      Command::Edit => flows::admin::edit_entry(self, chat_id, state).await,
      Command::Admin => flows::admin::panel(self, chat_id).await,
    }
  }

  async fn on_text(
    &self,
    chat_id: i64,
    handle: Option<String>,
    text: &str,
    state: &mut FlowState,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let text = text.trim();
    match state.clone() {
      FlowState::Idle => {
        flows::registration::first_contact(self, chat_id, text, state, now)
          .await
      }
      FlowState::MainMenu => {
        flows::booking::main_menu_choice(self, chat_id, text, state, now).await
      }
      FlowState::AwaitingRank => {
        flows::registration::rank_input(self, chat_id, text, state).await
      }
      FlowState::AwaitingSurname { rank } => {
        flows::registration::surname_input(self, chat_id, rank, text, state)
          .await
      }
      FlowState::AwaitingGivenName { rank, surname } => {
        flows::registration::given_name_input(
          self, chat_id, rank, surname, text, state,
        )
        .await
      }
      FlowState::AwaitingGroup { rank, surname, given_name } => {
        flows::registration::group_input(
          self, chat_id, handle, rank, surname, given_name, text, state,
        )
        .await
      }
      FlowState::EditAwaitingId => {
        flows::admin::id_input(self, chat_id, text, state).await
      }
      FlowState::EditAwaitingValue { target, field } => {
        flows::admin::value_input(self, chat_id, target, field, text, state)
          .await
      }
      // These states only answer buttons; nudge without losing progress.
      FlowState::ChoosingDate
      | FlowState::ChoosingType { .. }
      | FlowState::ChoosingReason { .. }
      | FlowState::ChoosingReturnTime { .. }
      | FlowState::EditChoosingField { .. } => {
        self.send(chat_id, flows::USE_THE_BUTTONS, None).await
      }
    }
  }

  async fn on_callback(
    &self,
    chat_id: i64,
    callback_id: &str,
    message_id: i64,
    data: &str,
    state: &mut FlowState,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let Some(data) = CallbackData::parse(data) else {
      tracing::warn!(chat_id, data, "unparseable callback payload");
      return self.ack(callback_id, None).await;
    };

    // Standing callbacks, valid whatever the session is doing.
    match data {
      CallbackData::Ignore => return self.ack(callback_id, None).await,
      CallbackData::CancelLeave(leave_id) => {
        return flows::booking::cancel_leave(
          self, chat_id, callback_id, leave_id, now,
        )
        .await;
      }
      CallbackData::AdminClear => {
        return flows::admin::clear_future(self, chat_id, callback_id, now)
          .await;
      }
      CallbackData::AdminWipe => {
        return flows::admin::wipe(self, chat_id, callback_id).await;
      }
      _ => {}
    }

    match (state.clone(), data) {
      (FlowState::ChoosingDate, CallbackData::Day(date)) => {
        flows::booking::pick_date(self, chat_id, callback_id, date, state, now)
          .await
      }
      (FlowState::ChoosingDate, CallbackData::OpenCalendar) => {
        flows::booking::show_calendar(
          self, chat_id, callback_id, message_id, now,
        )
        .await
      }
      (FlowState::ChoosingDate, CallbackData::Nav { year, month }) => {
        flows::booking::navigate_calendar(
          self, chat_id, callback_id, message_id, year, month, now,
        )
        .await
      }
      (FlowState::ChoosingType { date }, CallbackData::Kind(kind)) => {
        flows::booking::pick_kind(self, chat_id, callback_id, date, kind, state)
          .await
      }
      (FlowState::ChoosingType { date }, CallbackData::SaturdayAuto) => {
        flows::booking::saturday_auto(self, chat_id, callback_id, date, state)
          .await
      }
      (FlowState::ChoosingReason { date }, CallbackData::Reason(reason)) => {
        flows::booking::pick_reason(
          self, chat_id, callback_id, date, reason, state,
        )
        .await
      }
      (
        FlowState::ChoosingReturnTime { date, reason },
        CallbackData::ReturnTime(label),
      ) => {
        flows::booking::pick_return_time(
          self, chat_id, callback_id, date, reason, label, state,
        )
        .await
      }
      (
        FlowState::EditChoosingField { target },
        CallbackData::EditField(field),
      ) => {
        flows::admin::pick_field(
          self, chat_id, callback_id, target, field, state,
        )
        .await
      }
      _ => flows::expired(self, chat_id, callback_id, state).await,
    }
  }

  // ── Transport helpers ──

  pub(crate) async fn send(
    &self,
    chat_id: i64,
    text: impl Into<String>,
    markup: Option<Markup>,
  ) -> Result<()> {
    self.chat.send(chat_id, text.into(), markup).await.map_err(Error::chat)
  }

  pub(crate) async fn edit(
    &self,
    chat_id: i64,
    message_id: i64,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboard>,
  ) -> Result<()> {
    self
      .chat
      .edit(chat_id, message_id, text.into(), keyboard)
      .await
      .map_err(Error::chat)
  }

  pub(crate) async fn ack(
    &self,
    callback_id: &str,
    notice: Option<&str>,
  ) -> Result<()> {
    self
      .chat
      .ack(callback_id.to_owned(), notice.map(str::to_owned))
      .await
      .map_err(Error::chat)
  }
}
