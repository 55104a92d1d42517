//! Error types for `furlough-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown leave kind: {0:?}")]
  UnknownLeaveKind(String),

  #[error("unknown reason code: {0:?}")]
  UnknownReason(String),

  #[error("unknown person field: {0:?}")]
  UnknownPersonField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
