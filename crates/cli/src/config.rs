use gatepass_core::assignment::{ASSIGNMENT_LOOKBACK_HOURS, MAX_ASSIGNMENT_LOOKBACK_HOURS};
use gatepass_core::edit_window::{EditPolicy, EDIT_WINDOW_HOURS};
use gatepass_core::insights::{validate_page_size, DEFAULT_PAGE_SIZE};

use crate::logging::LogFormat;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Tool configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Edit window and site clock used for classification.
    pub policy: EditPolicy,
    /// Default lookback for unassigned-document searches.
    pub assignment_lookback_hours: u32,
    /// Rows per insights page.
    pub page_size: usize,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                              | Default |
    /// |--------------------------------------|---------|
    /// | `GATEPASS_EDIT_WINDOW_HOURS`         | `24`    |
    /// | `GATEPASS_ASSIGNMENT_LOOKBACK_HOURS` | `8`     |
    /// | `GATEPASS_SITE_UTC_OFFSET_MINUTES`   | `0`     |
    /// | `GATEPASS_PAGE_SIZE`                 | `20`    |
    /// | `GATEPASS_LOG_FORMAT`                | `text`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let edit_window_hours: i64 =
            parse_or(&lookup, "GATEPASS_EDIT_WINDOW_HOURS", EDIT_WINDOW_HOURS)?;
        let utc_offset_minutes: i32 = parse_or(&lookup, "GATEPASS_SITE_UTC_OFFSET_MINUTES", 0)?;
        let policy = EditPolicy::new(edit_window_hours, utc_offset_minutes).map_err(|e| {
            ConfigError::Invalid {
                key: "GATEPASS_EDIT_WINDOW_HOURS / GATEPASS_SITE_UTC_OFFSET_MINUTES",
                value: format!("{edit_window_hours} / {utc_offset_minutes}"),
                reason: e.to_string(),
            }
        })?;

        let assignment_lookback_hours: u32 = parse_or(
            &lookup,
            "GATEPASS_ASSIGNMENT_LOOKBACK_HOURS",
            ASSIGNMENT_LOOKBACK_HOURS,
        )?;
        if !(1..=MAX_ASSIGNMENT_LOOKBACK_HOURS).contains(&assignment_lookback_hours) {
            return Err(ConfigError::Invalid {
                key: "GATEPASS_ASSIGNMENT_LOOKBACK_HOURS",
                value: assignment_lookback_hours.to_string(),
                reason: format!("must be between 1 and {MAX_ASSIGNMENT_LOOKBACK_HOURS}"),
            });
        }

        let page_size: usize = parse_or(&lookup, "GATEPASS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let page_size = validate_page_size(page_size).map_err(|e| ConfigError::Invalid {
            key: "GATEPASS_PAGE_SIZE",
            value: page_size.to_string(),
            reason: e.to_string(),
        })?;

        let log_format = match lookup("GATEPASS_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "GATEPASS_LOG_FORMAT",
                value: raw.clone(),
                reason,
            })?,
        };

        Ok(Self {
            policy,
            assignment_lookback_hours,
            page_size,
            log_format,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
