use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

use crate::{domain::ChatId, errors::Error, throttle::QuietHours, Result};

/// Typed configuration, loaded once at start-up.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub broadcast_chat_id: ChatId,
    pub send_timeout: Duration,
    pub ask_enabled: bool,

    // Storage
    pub db_path: PathBuf,

    // Reminders
    pub notification_interval: Duration,
    pub check_interval: Duration,
    pub desired_walk_interval_hours: f64,
    pub quiet_hours: QuietHours,

    // Synthetic entries recorded every day at a fixed hour
    pub daily_walkers: Vec<DailyWalker>,
}

/// A walker recorded unconditionally once per day at `hour:00` local time.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DailyWalker {
    pub id: String,
    pub display_name: String,
    pub hour: u32,
}

impl Config {
    /// Load from the process environment, after merging a `.env` file from the
    /// working directory (existing variables win).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| get("TELEGRAM_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let broadcast_chat_id = get("GROUP_CHAT_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("GROUP_CHAT_ID environment variable is required".to_string())
            })
            .and_then(|raw| parse_value::<i64>("GROUP_CHAT_ID", &raw))
            .map(ChatId)?;

        let send_timeout =
            Duration::from_secs(positive(&get, "SEND_TIMEOUT_SECONDS", 15)?);
        let ask_enabled = match get("ASK_ENABLED") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::Config(format!("ASK_ENABLED: expected a boolean, got {raw:?}"))
            })?,
            None => true,
        };

        let db_path = get("TOBY_DB_PATH")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("toby.db"));

        let notification_interval =
            Duration::from_secs(positive(&get, "NOTIFICATION_INTERVAL_MINUTES", 30)? * 60);
        let check_interval = Duration::from_secs(positive(&get, "CHECK_INTERVAL_SECONDS", 10)?);

        let desired_walk_interval_hours = match get("DESIRED_WALK_INTERVAL_HOURS") {
            Some(raw) => parse_value::<f64>("DESIRED_WALK_INTERVAL_HOURS", &raw)?,
            None => 6.0,
        };
        if !desired_walk_interval_hours.is_finite() || desired_walk_interval_hours < 0.0 {
            return Err(Error::Config(format!(
                "DESIRED_WALK_INTERVAL_HOURS must be a non-negative number, got {desired_walk_interval_hours}"
            )));
        }

        let quiet_hours = match get("QUIET_HOURS") {
            Some(raw) => parse_quiet_hours(&raw)?,
            None => QuietHours::new(5, 8)?,
        };

        let daily_walkers = match get("DAILY_WALKERS").and_then(non_empty) {
            Some(raw) => parse_daily_walkers(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            telegram_bot_token,
            broadcast_chat_id,
            send_timeout,
            ask_enabled,
            db_path,
            notification_interval,
            check_interval,
            desired_walk_interval_hours,
            quiet_hours,
            daily_walkers,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Hand-rolled config so tests do not depend on the environment.
    pub(crate) fn for_tests() -> Self {
        Self {
            telegram_bot_token: "x".to_string(),
            broadcast_chat_id: ChatId(-100),
            send_timeout: Duration::from_secs(1),
            ask_enabled: true,
            db_path: PathBuf::from(":memory:"),
            notification_interval: Duration::from_secs(30 * 60),
            check_interval: Duration::from_secs(10),
            desired_walk_interval_hours: 6.0,
            quiet_hours: QuietHours::new(5, 8).unwrap(),
            daily_walkers: Vec::new(),
        }
    }
}

/// Parse `start-end` (hours of day, inclusive).
pub fn parse_quiet_hours(raw: &str) -> Result<QuietHours> {
    let Some((a, b)) = raw.trim().split_once('-') else {
        return Err(Error::Config(format!(
            "QUIET_HOURS: expected `start-end`, got {raw:?}"
        )));
    };
    let start = parse_value::<u32>("QUIET_HOURS", a.trim())?;
    let end = parse_value::<u32>("QUIET_HOURS", b.trim())?;
    QuietHours::new(start, end)
}

/// Parse the JSON list of daily synthetic walkers.
pub fn parse_daily_walkers(raw: &str) -> Result<Vec<DailyWalker>> {
    let walkers: Vec<DailyWalker> = serde_json::from_str(raw)?;
    for w in &walkers {
        if w.id.trim().is_empty() {
            return Err(Error::Config("DAILY_WALKERS: walker missing id".to_string()));
        }
        if w.hour > 23 {
            return Err(Error::Config(format!(
                "DAILY_WALKERS: hour {} for {} is out of range 0-23",
                w.hour, w.display_name
            )));
        }
    }
    Ok(walkers)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        return &s[1..s.len() - 1];
    }
    s
}

fn positive<F>(get: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let v = match get(key) {
        Some(raw) => parse_value::<u64>(key, &raw)?,
        None => default,
    };
    if v == 0 {
        return Err(Error::Config(format!("{key} must be greater than zero")));
    }
    Ok(v)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("{key}: invalid value {raw:?}")))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
