//! Messenger abstractions (Telegram today, anything with a text send tomorrow).

#[cfg(test)]
pub(crate) mod fake;
pub mod port;
pub mod timeout;
pub mod types;
