//! Shared-secret gate for the `/api` routes.
//!
//! The viewer dashboard presents the configured secret in an `X-API-Key`
//! header. The webhook and the health probe are deliberately not gated; the
//! webhook is called by the chat platform, the probe by infrastructure.

use axum::{extract::FromRequestParts, http::request::Parts};
use furlough_bot::transport::ChatTransport;
use furlough_core::store::LeaveStore;

use crate::{AppState, error::ApiError};

/// Header carrying the listing-API secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor proving the request carried the configured API key.
///
/// Gated handlers take an `ApiKey` argument; extraction rejects with 403
/// before the handler body runs.
pub struct ApiKey;

impl<S, C> FromRequestParts<AppState<S, C>> for ApiKey
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, C>,
  ) -> Result<Self, Self::Rejection> {
    let presented = parts
      .headers
      .get(API_KEY_HEADER)
      .and_then(|value| value.to_str().ok());
    match presented {
      Some(key) if key == state.config.api_key => Ok(Self),
      _ => Err(ApiError::Forbidden),
    }
  }
}
