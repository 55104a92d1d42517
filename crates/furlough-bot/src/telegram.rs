//! Telegram Bot API client and wire types.
//!
//! The outbound half implements [`ChatTransport`] over `sendMessage`,
//! `editMessageText` and `answerCallbackQuery`; `setWebhook` is called once
//! at startup. The inbound half is the [`Update`] payload the webhook
//! receives, with a lossy conversion into the engine's [`Inbound`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::transport::{
  ChatTransport, Command, Inbound, InboundPayload, InlineKeyboard, Markup,
};

/// Failures talking to the Bot API.
#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
  #[error("telegram rejected {method}: {description}")]
  Api { method: &'static str, description: String },
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Outbound Bot API client.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramClient {
  client: Client,
  base:   String,
}

impl TelegramClient {
  pub fn new(token: &str) -> Result<Self, Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base: format!("https://api.telegram.org/bot{token}"),
    })
  }

  fn url(&self, method: &str) -> String {
    format!("{}/{}", self.base, method)
  }

  /// POST one Bot API method and check the `ok` envelope.
  async fn call(
    &self,
    method: &'static str,
    body: serde_json::Value,
  ) -> Result<(), Error> {
    let reply: ApiReply = self
      .client
      .post(self.url(method))
      .json(&body)
      .send()
      .await?
      .json()
      .await?;
    if reply.ok {
      Ok(())
    } else {
      Err(Error::Api {
        method,
        description: reply.description.unwrap_or_default(),
      })
    }
  }

  /// `setWebhook` — point the Bot API at our webhook endpoint.
  pub async fn set_webhook(&self, url: &str) -> Result<(), Error> {
    self.call("setWebhook", json!({ "url": url })).await
  }
}

impl ChatTransport for TelegramClient {
  type Error = Error;

  async fn send(
    &self,
    chat_id: i64,
    text: String,
    markup: Option<Markup>,
  ) -> Result<(), Error> {
    let mut body = json!({ "chat_id": chat_id, "text": text });
    if let Some(markup) = markup {
      body["reply_markup"] = encode_markup(&markup);
    }
    self.call("sendMessage", body).await
  }

  async fn edit(
    &self,
    chat_id: i64,
    message_id: i64,
    text: String,
    keyboard: Option<InlineKeyboard>,
  ) -> Result<(), Error> {
    let mut body = json!({
      "chat_id":    chat_id,
      "message_id": message_id,
      "text":       text,
    });
    if let Some(keyboard) = keyboard {
      body["reply_markup"] = inline_markup(&keyboard);
    }
    self.call("editMessageText", body).await
  }

  async fn ack(
    &self,
    callback_id: String,
    notice: Option<String>,
  ) -> Result<(), Error> {
    let mut body = json!({ "callback_query_id": callback_id });
    if let Some(text) = notice {
      body["text"] = json!(text);
    }
    self.call("answerCallbackQuery", body).await
  }
}

fn encode_markup(markup: &Markup) -> serde_json::Value {
  match markup {
    Markup::Reply(rows) => json!({
      "keyboard": rows
        .iter()
        .map(|row| {
          row.iter().map(|label| json!({ "text": label })).collect::<Vec<_>>()
        })
        .collect::<Vec<_>>(),
      "resize_keyboard": true,
    }),
    Markup::Inline(keyboard) => inline_markup(keyboard),
    Markup::Remove => json!({ "remove_keyboard": true }),
  }
}

fn inline_markup(keyboard: &InlineKeyboard) -> serde_json::Value {
  json!({
    "inline_keyboard": keyboard
      .rows
      .iter()
      .map(|row| {
        row
          .iter()
          .map(|button| {
            json!({ "text": button.text, "callback_data": button.data })
          })
          .collect::<Vec<_>>()
      })
      .collect::<Vec<_>>(),
  })
}

#[derive(Debug, Deserialize)]
struct ApiReply {
  ok:          bool,
  description: Option<String>,
}

// ─── Inbound wire types ──────────────────────────────────────────────────────

/// One Bot API update, as delivered to the webhook. Only the fields this
/// bot acts on are decoded; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct Update {
  pub update_id:      i64,
  pub message:        Option<Message>,
  pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
  pub message_id: i64,
  pub chat:       Chat,
  pub from:       Option<User>,
  pub text:       Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
  pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
  pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
  pub id:      String,
  pub from:    User,
  pub message: Option<Message>,
  pub data:    Option<String>,
}

impl Update {
  /// Convert to the engine's transport-neutral event. Updates carrying
  /// neither text nor a callback become `None` and are dropped at the
  /// webhook.
  pub fn into_inbound(self) -> Option<Inbound> {
    if let Some(query) = self.callback_query {
      let message = query.message?;
      let data = query.data?;
      return Some(Inbound {
        chat_id: message.chat.id,
        handle:  query.from.username,
        payload: InboundPayload::Callback {
          id: query.id,
          message_id: message.message_id,
          data,
        },
      });
    }
    let message = self.message?;
    let text = message.text?;
    let payload = match Command::parse(&text) {
      Some(command) => InboundPayload::Command(command),
      None => InboundPayload::Text(text),
    };
    Some(Inbound {
      chat_id: message.chat.id,
      handle: message.from.and_then(|user| user.username),
      payload,
    })
  }
}
