//! HTTP facade for the furlough service.
//!
//! Exposes an axum [`Router`] with three surfaces: the Telegram webhook that
//! feeds the conversation engine, the `X-API-Key`-gated listing API consumed
//! by the viewer dashboard, and a health probe. Generic over the store and
//! the chat transport so tests drive the full stack in memory.

pub mod auth;
pub mod error;
pub mod lists;
pub mod ranks;
pub mod users;
pub mod webhook;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderName, Method},
  routing::{delete, get, post, put},
};
use furlough_bot::{Engine, transport::ChatTransport};
use furlough_core::store::LeaveStore;
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `FURLOUGH_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Externally reachable base URL; the webhook is registered under it.
  pub public_url: String,
  pub bot_token:  String,
  /// Shared secret the dashboard presents in `X-API-Key`.
  pub api_key:    String,
  /// Chat ids allowed to use /edit and /admin.
  #[serde(default)]
  pub admin_ids:  Vec<i64>,
  pub store_path: PathBuf,
  /// Fixed UTC offset of the organisation's wall clock, in hours.
  #[serde(default = "default_tz_offset")]
  pub tz_offset_hours:      i32,
  #[serde(default = "default_same_day_cutoff")]
  pub same_day_cutoff_hour: u32,
  #[serde(default = "default_weekend_cutoff")]
  pub weekend_cutoff_hour:  u32,
}

fn default_tz_offset() -> i32 {
  3
}

fn default_same_day_cutoff() -> u32 {
  16
}

fn default_weekend_cutoff() -> u32 {
  17
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: LeaveStore, C: ChatTransport> {
  pub store:  Arc<S>,
  pub engine: Arc<Engine<S, C>>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the service.
///
/// The `/api` subtree carries CORS for the dashboard's cross-origin fetches;
/// the webhook and health probe sit outside it.
pub fn router<S, C>(state: AppState<S, C>) -> Router
where
  S: LeaveStore + Clone + Send + Sync + 'static,
  C: ChatTransport + Clone + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::OPTIONS,
      Method::PUT,
      Method::POST,
      Method::DELETE,
    ])
    .allow_headers([HeaderName::from_static(auth::API_KEY_HEADER)]);

  let api = Router::new()
    .route("/lists/{date}", get(lists::day_sheet::<S, C>))
    .route("/users",        get(users::list::<S, C>))
    .route("/users/{id}",   put(users::update::<S, C>))
    .route("/ranks",        get(ranks::list::<S, C>).post(ranks::create::<S, C>))
    .route("/ranks/{name}", delete(ranks::remove::<S, C>))
    .layer(cors);

  Router::new()
    .route("/webhook", post(webhook::handler::<S, C>))
    .route("/health",  get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str {
  "ok"
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::{collections::HashSet, convert::Infallible, sync::Mutex};

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::NaiveDate;
  use furlough_bot::transport::{InlineKeyboard, Markup};
  use furlough_core::{
    leave::{LeaveKind, NewLeave, Reason},
    person::{DEFAULT_RANKS, NewPerson},
    policy::DeadlinePolicy,
  };
  use furlough_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  // ── Test double ─────────────────────────────────────────────────────────────

  #[derive(Clone, Default)]
  struct RecordingChat {
    sent: Arc<Mutex<Vec<String>>>,
  }

  impl RecordingChat {
    fn texts(&self) -> Vec<String> {
      self.sent.lock().unwrap().clone()
    }
  }

  impl ChatTransport for RecordingChat {
    type Error = Infallible;

    async fn send(
      &self,
      _chat_id: i64,
      text: String,
      _markup: Option<Markup>,
    ) -> Result<(), Infallible> {
      self.sent.lock().unwrap().push(text);
      Ok(())
    }

    async fn edit(
      &self,
      _chat_id: i64,
      _message_id: i64,
      _text: String,
      _keyboard: Option<InlineKeyboard>,
    ) -> Result<(), Infallible> {
      Ok(())
    }

    async fn ack(
      &self,
      _callback_id: String,
      _notice: Option<String>,
    ) -> Result<(), Infallible> {
      Ok(())
    }
  }

  // ── Fixtures ────────────────────────────────────────────────────────────────

  async fn make_state() -> (AppState<SqliteStore, RecordingChat>, RecordingChat)
  {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    store.seed_ranks(DEFAULT_RANKS.map(str::to_owned).to_vec()).await.unwrap();
    let chat = RecordingChat::default();
    let policy = DeadlinePolicy::from_hours(3, 16, 17).unwrap();
    let engine =
      Engine::new(store.clone(), chat.clone(), policy, HashSet::from([900]));
    let state = AppState {
      store,
      engine: Arc::new(engine),
      config: Arc::new(ServerConfig {
        host:                 "127.0.0.1".to_owned(),
        port:                 8080,
        public_url:           "http://localhost:8080".to_owned(),
        bot_token:            "test-token".to_owned(),
        api_key:              "sekret".to_owned(),
        admin_ids:            vec![900],
        store_path:           PathBuf::from(":memory:"),
        tz_offset_hours:      3,
        same_day_cutoff_hour: 16,
        weekend_cutoff_hour:  17,
      }),
    };
    (state, chat)
  }

  async fn seed_person(state: &AppState<SqliteStore, RecordingChat>) {
    state
      .store
      .upsert_person(NewPerson {
        chat_id:      1001,
        rank:         "soldier".to_owned(),
        surname:      "Shevchenko".to_owned(),
        given_name:   "Taras".to_owned(),
        handle:       Some("taras_s".to_owned()),
        group_number: "311".to_owned(),
      })
      .await
      .unwrap();
  }

  async fn request(
    state: AppState<SqliteStore, RecordingChat>,
    method: &str,
    uri: &str,
    key: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
      builder = builder.header(auth::API_KEY_HEADER, key);
    }
    let request = match body {
      Some(value) => builder
        .header("content-type", "application/json")
        .body(Body::from(value.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state).oneshot(request).await.unwrap()
  }

  async fn body_json(response: axum::response::Response) -> Value {
    let bytes =
      axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Health and auth ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_answers_without_a_key() {
    let (state, _) = make_state().await;
    let response = request(state, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes =
      axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
  }

  #[tokio::test]
  async fn api_routes_refuse_missing_or_wrong_keys() {
    let (state, _) = make_state().await;
    let response = request(state.clone(), "GET", "/api/ranks", None, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
      request(state, "GET", "/api/ranks", Some("wrong"), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
  }

  // ── Day sheet ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn day_sheet_splits_entries_by_kind() {
    let (state, _) = make_state().await;
    seed_person(&state).await;
    state
      .store
      .book_leave(NewLeave {
        chat_id:     1001,
        kind:        LeaveKind::DayLong,
        date:        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        reason:      Some(Reason::Report),
        return_info: Some("until 06:00".to_owned()),
      })
      .await
      .unwrap();

    let response =
      request(state, "GET", "/api/lists/2024-03-15", Some("sekret"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = body_json(response).await;
    assert_eq!(sheet["request_date"], "2024-03-15");
    assert_eq!(sheet["total_registrations"], 1);
    assert_eq!(sheet["lists"]["regular"], json!([]));
    let entry = &sheet["lists"]["24-hour"][0];
    assert_eq!(entry["full_name"], "soldier Shevchenko Taras");
    assert_eq!(entry["group_number"], "311");
    assert_eq!(entry["reason"], "report");
    assert_eq!(entry["return_info"], "until 06:00");
  }

  #[tokio::test]
  async fn day_sheet_rejects_malformed_dates() {
    let (state, _) = make_state().await;
    let response =
      request(state, "GET", "/api/lists/2024-13-01", Some("sekret"), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn users_can_be_listed_and_edited() {
    let (state, _) = make_state().await;
    seed_person(&state).await;

    let response =
      request(state.clone(), "GET", "/api/users", Some("sekret"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let people = body_json(response).await;
    assert_eq!(people.as_array().unwrap().len(), 1);
    assert_eq!(people[0]["surname"], "Shevchenko");

    let response = request(
      state.clone(),
      "PUT",
      "/api/users/1001",
      Some("sekret"),
      Some(json!({ "surname": "Franko", "group_number": "312" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let person = body_json(response).await;
    assert_eq!(person["surname"], "Franko");
    assert_eq!(person["group_number"], "312");
    assert_eq!(person["given_name"], "Taras");

    let response = request(
      state,
      "PUT",
      "/api/users/424242",
      Some("sekret"),
      Some(json!({ "surname": "Franko" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  // ── Ranks ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn rank_catalog_create_and_delete() {
    let (state, _) = make_state().await;
    seed_person(&state).await;

    let response =
      request(state.clone(), "GET", "/api/ranks", Some("sekret"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = body_json(response).await;
    assert_eq!(catalog["ranks"].as_array().unwrap().len(), 4);

    let response = request(
      state.clone(),
      "POST",
      "/api/ranks",
      Some("sekret"),
      Some(json!({ "name": "cadet" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = request(
      state.clone(),
      "POST",
      "/api/ranks",
      Some("sekret"),
      Some(json!({ "name": "cadet" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response =
      request(state.clone(), "DELETE", "/api/ranks/cadet", Some("sekret"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response =
      request(state.clone(), "DELETE", "/api/ranks/cadet", Some("sekret"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The seeded person holds "soldier".
    let response =
      request(state, "DELETE", "/api/ranks/soldier", Some("sekret"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
  }

  // ── Webhook ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn webhook_updates_drive_the_engine() {
    let (state, chat) = make_state().await;

    for (update_id, text) in
      ["/start", "soldier", "Shevchenko", "Taras", "311"].iter().enumerate()
    {
      let response = request(
        state.clone(),
        "POST",
        "/webhook",
        None,
        Some(json!({
          "update_id": update_id,
          "message": {
            "message_id": update_id,
            "chat": { "id": 1001 },
            "from": { "username": "taras_s" },
            "text": text,
          },
        })),
      )
      .await;
      assert_eq!(response.status(), StatusCode::OK);
      assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    let person = state.store.person(1001).await.unwrap().unwrap();
    assert_eq!(person.surname, "Shevchenko");
    assert_eq!(person.handle.as_deref(), Some("taras_s"));
    assert!(chat.texts().last().unwrap().contains("Registration complete."));
  }

  #[tokio::test]
  async fn webhook_drops_updates_without_content() {
    let (state, chat) = make_state().await;
    let response = request(
      state,
      "POST",
      "/webhook",
      None,
      Some(json!({ "update_id": 9 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
    assert!(chat.texts().is_empty());
  }
}
