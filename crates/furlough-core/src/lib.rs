//! Core types and trait definitions for the Furlough leave-scheduling
//! service.
//!
//! This crate is deliberately free of HTTP, chat-transport and database
//! dependencies. All other crates depend on it; it depends on nothing
//! proprietary.

pub mod error;
pub mod leave;
pub mod person;
pub mod policy;
pub mod sheet;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
