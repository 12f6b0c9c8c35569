//! Core of the dog-walk bot: walk log, reminder throttling and scheduling,
//! message text, and the chat commands.
//!
//! Telegram lives behind the messaging port and is implemented in
//! `toby-telegram`.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod scheduler;
pub mod store;
pub mod throttle;

pub use errors::{Error, Result};
