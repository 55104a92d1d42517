//! Error type shared across the chat engine.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced while driving a chat flow.
///
/// The engine is generic over both its store and its transport, so their
/// concrete error types are erased here. Validation problems are not errors:
/// the flows answer those with a re-prompt message instead.
#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("chat transport error: {0}")]
  Chat(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn chat<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Chat(Box::new(err))
  }
}
