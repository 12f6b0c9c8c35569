use std::fmt;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Opaque walker identity. Telegram user ids are stored as their decimal text;
/// synthetic daily walkers use whatever id the config gives them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WalkerId(pub String);

impl WalkerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WalkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WalkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
