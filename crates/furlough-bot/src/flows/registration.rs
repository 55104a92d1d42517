//! Registration: four questions, validated one at a time.
//!
//! Scratch accumulates inside the state variants, so a failed answer
//! re-prompts without losing what came before and `/cancel` drops the lot.

use chrono::{DateTime, Utc};
use furlough_core::{person::NewPerson, store::LeaveStore, validate};

use crate::{
  engine::Engine,
  error::{Error, Result},
  flows::{self, main_menu_keyboard},
  session::FlowState,
  transport::{ChatTransport, Markup},
};

const GREETING: &str = "Welcome! Let's get you registered. Pick your rank:";
const WELCOME_BACK: &str = "You're already registered.";
const ASK_SURNAME: &str = "Your surname?";
const ASK_GIVEN_NAME: &str = "Your given name?";
const ASK_GROUP: &str = "Your group number?";
const BAD_RANK: &str = "Pick a rank from the keyboard below.";
const BAD_SURNAME: &str =
  "Letters only (hyphen and apostrophe allowed). Your surname?";
const BAD_GIVEN_NAME: &str =
  "Letters only (dot and hyphen allowed). Your given name?";
const BAD_GROUP: &str = "Group number is 1 to 4 digits. Try again:";
const REGISTERED: &str = "Registration complete.";

/// `/start`. Registered chats jump straight to the menu, dropping any
/// scratch; fresh ones get the rank question.
pub(crate) async fn start<S, C>(
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
    engine
      .send(
        chat_id,
        format!("{WELCOME_BACK} {}", flows::MAIN_MENU),
        Some(main_menu_keyboard()),
      )
      .await
  } else {
    begin(engine, chat_id, state).await
  }
}

/// Plain text from an idle session. Registered chats get their menu back
/// (the session map empties on restart); everyone else starts registration.
pub(crate) async fn first_contact<S, C>(
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
  let registered =
    engine.store.person(chat_id).await.map_err(Error::store)?.is_some();
  if registered {
    *state = FlowState::MainMenu;
    flows::booking::main_menu_choice(engine, chat_id, text, state, now).await
  } else {
    begin(engine, chat_id, state).await
  }
}

/// Ask the rank question with the catalog as a reply keyboard.
pub(crate) async fn begin<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let ranks = engine.store.ranks().await.map_err(Error::store)?;
  let rows = ranks.into_iter().map(|rank| vec![rank]).collect();
  *state = FlowState::AwaitingRank;
  engine.send(chat_id, GREETING, Some(Markup::Reply(rows))).await
}

pub(crate) async fn rank_input<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  text: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  let ranks = engine.store.ranks().await.map_err(Error::store)?;
  match validate::match_rank(&ranks, text) {
    Some(rank) => {
      *state = FlowState::AwaitingSurname { rank: rank.to_owned() };
      engine.send(chat_id, ASK_SURNAME, Some(Markup::Remove)).await
    }
    None => engine.send(chat_id, BAD_RANK, None).await,
  }
}

pub(crate) async fn surname_input<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  rank: String,
  text: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if validate::valid_surname(text) {
    *state =
      FlowState::AwaitingGivenName { rank, surname: text.to_owned() };
    engine.send(chat_id, ASK_GIVEN_NAME, None).await
  } else {
    engine.send(chat_id, BAD_SURNAME, None).await
  }
}

pub(crate) async fn given_name_input<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  rank: String,
  surname: String,
  text: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if validate::valid_given_name(text) {
    *state = FlowState::AwaitingGroup {
      rank,
      surname,
      given_name: text.to_owned(),
    };
    engine.send(chat_id, ASK_GROUP, None).await
  } else {
    engine.send(chat_id, BAD_GIVEN_NAME, None).await
  }
}

pub(crate) async fn group_input<S, C>(
  engine: &Engine<S, C>,
  chat_id: i64,
  handle: Option<String>,
  rank: String,
  surname: String,
  given_name: String,
  text: &str,
  state: &mut FlowState,
) -> Result<()>
where
  S: LeaveStore,
  C: ChatTransport,
{
  if !validate::valid_group_number(text) {
    return engine.send(chat_id, BAD_GROUP, None).await;
  }
  engine
    .store
    .upsert_person(NewPerson {
      chat_id,
      rank,
      surname,
      given_name,
      handle,
      group_number: text.to_owned(),
    })
    .await
    .map_err(Error::store)?;
  tracing::info!(chat_id, "person registered");
  *state = FlowState::MainMenu;
  engine
    .send(
      chat_id,
      format!("{REGISTERED} {}", flows::MAIN_MENU),
      Some(main_menu_keyboard()),
    )
    .await
}
