//! Handlers for `/api/ranks` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/api/ranks` | The catalog, in display order |
//! | `POST`   | `/api/ranks` | Body: `{"name":"..."}`; duplicate → 409 |
//! | `DELETE` | `/api/ranks/{name}` | Unknown → 404; held by anyone → 409 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use furlough_bot::transport::ChatTransport;
use furlough_core::{
  person::{RankAdd, RankDelete},
  store::LeaveStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, auth::ApiKey, error::ApiError};

/// The `GET /api/ranks` payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct RankCatalog {
  pub ranks: Vec<String>,
}

/// `GET /api/ranks`
pub async fn list<S, C>(
  _key: ApiKey,
  State(state): State<AppState<S, C>>,
) -> Result<Json<RankCatalog>, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let ranks = state
    .store
    .ranks()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(RankCatalog { ranks }))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /api/ranks` — 201 on insert, 409 on duplicate.
pub async fn create<S, C>(
  _key: ApiKey,
  State(state): State<AppState<S, C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let added = state
    .store
    .add_rank(body.name.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  match added {
    RankAdd::Added => {
      Ok((StatusCode::CREATED, Json(json!({ "name": body.name }))))
    }
    RankAdd::Duplicate => {
      Err(ApiError::Conflict(format!("rank {:?} already exists", body.name)))
    }
  }
}

/// `DELETE /api/ranks/{name}` — refused while any registered person holds
/// the rank.
pub async fn remove<S, C>(
  _key: ApiKey,
  State(state): State<AppState<S, C>>,
  Path(name): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let deleted = state
    .store
    .delete_rank(name.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  match deleted {
    RankDelete::Deleted => Ok(StatusCode::NO_CONTENT),
    RankDelete::NotFound => {
      Err(ApiError::NotFound(format!("no rank {name:?}")))
    }
    RankDelete::InUse { people } => Err(ApiError::Conflict(format!(
      "rank {name:?} is held by {people} registered people"
    ))),
  }
}
