//! Per-chat conversation state.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use furlough_core::{leave::Reason, person::PersonField};

/// Where a chat currently sits in its dialogue, plus the scratch data
/// collected so far. Scratch travels inside the variant so abandoning a
/// flow drops it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
  /// Nothing in progress; the chat is not registered (or never spoke).
  #[default]
  Idle,
  /// Registered and parked at the main menu.
  MainMenu,

  // ── Registration ──
  AwaitingRank,
  AwaitingSurname { rank: String },
  AwaitingGivenName { rank: String, surname: String },
  AwaitingGroup { rank: String, surname: String, given_name: String },

  // ── Leave booking ──
  ChoosingDate,
  ChoosingType { date: NaiveDate },
  ChoosingReason { date: NaiveDate },
  ChoosingReturnTime { date: NaiveDate, reason: Reason },

  // ── Admin edit ──
  EditAwaitingId,
  EditChoosingField { target: i64 },
  EditAwaitingValue { target: i64, field: PersonField },
}

/// Hands out one lock per chat. A handler holds the chat's lock for the
/// whole update, so one chat's events apply in arrival order while distinct
/// chats interleave freely.
#[derive(Default)]
pub struct SessionMap {
  inner: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<FlowState>>>>,
}

impl SessionMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// The session handle for `chat_id`, created as [`FlowState::Idle`] on
  /// first sight.
  pub fn session(&self, chat_id: i64) -> Arc<tokio::sync::Mutex<FlowState>> {
    let mut map = match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    map.entry(chat_id).or_default().clone()
  }
}
