//! Settings loading and validation.
//!
//! Settings come from an optional YAML file (path in `FRIETBOT_CONFIG`). Every key has a
//! default, so an absent file means the stock Friday schedule. A malformed or inconsistent
//! file is a [`ConfigError`] and stops the process before any actor starts.

use crate::gateway::{ChannelId, Member};
use crate::schedule::CycleSchedule;
use chrono::{Duration, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the path of the settings file.
pub const CONFIG_ENV: &str = "FRIETBOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// The file layout, before validation.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSettings {
    timezone: String,
    order_day: String,
    order_time: String,
    close_offset_minutes: i64,
    reset_offset_minutes: i64,
    clear_offset_minutes: i64,
    manual_reopen_minutes: i64,
    report_channel: String,
    broadcast_delay_ms: u64,
    actor_buffer: usize,
    members: Vec<RawMember>,
}

/// A workspace member listed in the file, for running without a chat transport.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMember {
    id: String,
    name: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            timezone: "Europe/Amsterdam".to_string(),
            order_day: "Friday".to_string(),
            order_time: "11:00".to_string(),
            close_offset_minutes: 60,
            reset_offset_minutes: 180,
            clear_offset_minutes: 240,
            manual_reopen_minutes: 30,
            report_channel: "friet-bestelling".to_string(),
            broadcast_delay_ms: 100,
            actor_buffer: 32,
            members: Vec::new(),
        }
    }
}

/// Validated runtime settings.
#[derive(Clone, Debug)]
pub struct Settings {
    pub schedule: CycleSchedule,
    /// How long a manual reopen keeps ordering open.
    pub manual_reopen: Duration,
    /// Where the closing report goes.
    pub report_channel: ChannelId,
    /// Pause between two invitations of the same broadcast.
    pub broadcast_delay: std::time::Duration,
    /// Channel capacity of every actor.
    pub actor_buffer: usize,
    /// Roster served by the log gateway; a real transport lists members itself.
    pub members: Vec<Member>,
}

impl Default for Settings {
    fn default() -> Self {
        let raw = RawSettings::default();
        Self {
            schedule: CycleSchedule::default(),
            manual_reopen: Duration::minutes(raw.manual_reopen_minutes),
            report_channel: ChannelId::new(raw.report_channel),
            broadcast_delay: std::time::Duration::from_millis(raw.broadcast_delay_ms),
            actor_buffer: raw.actor_buffer,
            members: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the file named by `FRIETBOT_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_yaml::from_str(content)?;
        validate(raw)
    }
}

fn validate(raw: RawSettings) -> Result<Settings, ConfigError> {
    let tz: Tz = raw
        .timezone
        .parse()
        .map_err(|_| ConfigError::UnknownTimezone(raw.timezone.clone()))?;

    let order_day: Weekday = raw
        .order_day
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("order_day: unknown weekday {:?}", raw.order_day)))?;

    let order_time = NaiveTime::parse_from_str(&raw.order_time, "%H:%M").map_err(|e| {
        ConfigError::Invalid(format!("order_time: {:?} is not HH:MM ({e})", raw.order_time))
    })?;

    let week = 7 * 24 * 60;
    if !(0 < raw.close_offset_minutes
        && raw.close_offset_minutes < raw.reset_offset_minutes
        && raw.reset_offset_minutes < raw.clear_offset_minutes
        && raw.clear_offset_minutes < week)
    {
        return Err(ConfigError::Invalid(format!(
            "offsets must satisfy 0 < close ({}) < reset ({}) < clear ({}) < one week",
            raw.close_offset_minutes, raw.reset_offset_minutes, raw.clear_offset_minutes
        )));
    }

    if raw.manual_reopen_minutes <= 0 {
        return Err(ConfigError::Invalid(
            "manual_reopen_minutes must be > 0".to_string(),
        ));
    }

    if raw.report_channel.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "report_channel must not be empty".to_string(),
        ));
    }

    if raw.actor_buffer == 0 {
        return Err(ConfigError::Invalid("actor_buffer must be > 0".to_string()));
    }

    if let Some(member) = raw.members.iter().find(|m| m.id.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "members: {:?} has an empty id",
            member.name
        )));
    }

    Ok(Settings {
        schedule: CycleSchedule {
            order_day,
            order_time,
            close_offset: Duration::minutes(raw.close_offset_minutes),
            reset_offset: Duration::minutes(raw.reset_offset_minutes),
            clear_offset: Duration::minutes(raw.clear_offset_minutes),
            tz,
        },
        manual_reopen: Duration::minutes(raw.manual_reopen_minutes),
        report_channel: ChannelId::new(raw.report_channel),
        broadcast_delay: std::time::Duration::from_millis(raw.broadcast_delay_ms),
        actor_buffer: raw.actor_buffer,
        members: raw
            .members
            .iter()
            .map(|m| Member::person(&m.id, &m.name))
            .collect(),
    })
}
