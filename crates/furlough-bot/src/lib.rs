//! Chat-flow engine for the furlough bot.
//!
//! The bot walks each chat through short, state-machine driven dialogues:
//! one-time registration, booking a leave request, editing profile fields and
//! a handful of admin commands. All state transitions go through
//! [`Engine::handle`], which keeps one [`session::FlowState`] per chat and
//! talks to the outside world only via the [`transport::ChatTransport`]
//! trait, so the whole engine is testable without a network.

pub mod calendar;
pub mod callback;
pub mod engine;
pub mod error;
pub mod flows;
pub mod session;
pub mod telegram;
pub mod transport;

pub use engine::Engine;
pub use error::{Error, Result};
pub use session::FlowState;
pub use transport::{ChatTransport, Command, Inbound, InboundPayload, Markup};
