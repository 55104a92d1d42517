//! Telegram webhook intake.

use axum::{Json, extract::State};
use furlough_bot::{telegram::Update, transport::ChatTransport};
use furlough_core::store::LeaveStore;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `POST /webhook` — one Bot API update per request.
///
/// Replies `{"ok": true}` whenever the update was consumed, including ones
/// that carry nothing actionable. Failures map to a generic 500 with the
/// cause in the log only; the transport retries on 5xx.
pub async fn handler<S, C>(
  State(state): State<AppState<S, C>>,
  Json(update): Json<Update>,
) -> Result<Json<Value>, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let Some(inbound) = update.into_inbound() else {
    return Ok(Json(json!({ "ok": true })));
  };
  let chat_id = inbound.chat_id;
  if let Err(error) = state.engine.handle(inbound).await {
    tracing::error!(chat_id, %error, "failed to process update");
    return Err(ApiError::Internal);
  }
  Ok(Json(json!({ "ok": true })))
}
