//! Handlers for `/api/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/users` | All registered people |
//! | `PUT`  | `/api/users/{id}` | Partial update; 404 if not registered |

use axum::{
  Json,
  extract::{Path, State},
};
use furlough_bot::transport::ChatTransport;
use furlough_core::{
  person::{Person, PersonField},
  store::LeaveStore,
};
use serde::Deserialize;

use crate::{AppState, auth::ApiKey, error::ApiError};

/// `GET /api/users`
pub async fn list<S, C>(
  _key: ApiKey,
  State(state): State<AppState<S, C>>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let people = state
    .store
    .people()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(people))
}

/// Partial update body; absent fields stay untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub rank:         Option<String>,
  pub surname:      Option<String>,
  pub given_name:   Option<String>,
  pub group_number: Option<String>,
}

/// `PUT /api/users/{id}` — apply the provided fields verbatim and return
/// the updated person.
pub async fn update<S, C>(
  _key: ApiKey,
  State(state): State<AppState<S, C>>,
  Path(chat_id): Path<i64>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Person>, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let fields = [
    (PersonField::Rank, body.rank),
    (PersonField::Surname, body.surname),
    (PersonField::GivenName, body.given_name),
    (PersonField::GroupNumber, body.group_number),
  ];
  for (field, value) in fields {
    let Some(value) = value else { continue };
    let applied = state
      .store
      .update_person_field(chat_id, field, value)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    if !applied {
      return Err(not_registered(chat_id));
    }
  }
  let person = state
    .store
    .person(chat_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_registered(chat_id))?;
  Ok(Json(person))
}

fn not_registered(chat_id: i64) -> ApiError {
  ApiError::NotFound(format!("no person with chat id {chat_id}"))
}
