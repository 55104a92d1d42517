//! Handler for the `/api/lists/{date}` day sheet.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use furlough_bot::transport::ChatTransport;
use furlough_core::{sheet::DaySheet, store::LeaveStore};

use crate::{AppState, auth::ApiKey, error::ApiError};

/// `GET /api/lists/{date}` — everyone going on leave on `date`, split by
/// leave kind, plus the unit headcount.
pub async fn day_sheet<S, C>(
  _key: ApiKey,
  State(state): State<AppState<S, C>>,
  Path(date): Path<String>,
) -> Result<Json<DaySheet>, ApiError>
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
    .map_err(|_| ApiError::BadRequest(format!("invalid date: {date}")))?;
  let rows = state
    .store
    .leaves_for_date(date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let total = state
    .store
    .count_people()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(DaySheet::assemble(date, total, rows)))
}
