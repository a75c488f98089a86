use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;

use deskpilot_core::DeskpilotError;
use deskpilot_tools::CalendarConfig;

/// Environment-driven server settings. Every knob has a default except the
/// oracle API key.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub oracle_base_url: String,
    pub oracle_api_key: String,
    pub oracle_model: String,
    pub oracle_timeout: Duration,
    /// Ceiling for one whole run; a run that blows it is a failed exchange.
    pub run_timeout: Duration,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub meeting_minutes: i64,
    pub buffer_minutes: i64,
    pub max_step_retries: u32,
    pub max_transitions: usize,
    /// Threads persist here as JSONL when set; in memory otherwise.
    pub checkpoint_dir: Option<PathBuf>,
    pub recall_url: Option<String>,
    pub recall_api_key: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, DeskpilotError> {
        let oracle_api_key = optional("DESKPILOT_ORACLE_API_KEY").ok_or_else(|| {
            DeskpilotError::InvalidConfig("DESKPILOT_ORACLE_API_KEY is not set".to_string())
        })?;

        Ok(Self {
            bind: parsed("DESKPILOT_BIND", SocketAddr::from(([127, 0, 0, 1], 8080)))?,
            oracle_base_url: text("DESKPILOT_ORACLE_BASE_URL", "https://api.openai.com/v1"),
            oracle_api_key,
            oracle_model: text("DESKPILOT_ORACLE_MODEL", "gpt-4o-mini"),
            oracle_timeout: Duration::from_secs(parsed("DESKPILOT_ORACLE_TIMEOUT_SECS", 60u64)?),
            run_timeout: Duration::from_secs(parsed("DESKPILOT_RUN_TIMEOUT_SECS", 120u64)?),
            day_start_hour: parsed("DESKPILOT_DAY_START_HOUR", 9u32)?,
            day_end_hour: parsed("DESKPILOT_DAY_END_HOUR", 17u32)?,
            meeting_minutes: parsed("DESKPILOT_MEETING_MINUTES", 60i64)?,
            buffer_minutes: parsed("DESKPILOT_BUFFER_MINUTES", 15i64)?,
            max_step_retries: parsed("DESKPILOT_MAX_STEP_RETRIES", 3u32)?,
            max_transitions: parsed("DESKPILOT_MAX_TRANSITIONS", 50usize)?,
            checkpoint_dir: optional("DESKPILOT_CHECKPOINT_DIR").map(PathBuf::from),
            recall_url: optional("DESKPILOT_RECALL_URL"),
            recall_api_key: optional("DESKPILOT_RECALL_API_KEY"),
        })
    }

    /// Scheduling shape for the booking tool and its calendar.
    pub fn calendar(&self) -> Result<CalendarConfig, DeskpilotError> {
        let day_start = NaiveTime::from_hms_opt(self.day_start_hour, 0, 0).ok_or_else(|| {
            DeskpilotError::InvalidConfig(format!(
                "DESKPILOT_DAY_START_HOUR must be 0..=23, got {}",
                self.day_start_hour
            ))
        })?;
        let day_end = NaiveTime::from_hms_opt(self.day_end_hour, 0, 0).ok_or_else(|| {
            DeskpilotError::InvalidConfig(format!(
                "DESKPILOT_DAY_END_HOUR must be 0..=23, got {}",
                self.day_end_hour
            ))
        })?;
        if day_start >= day_end {
            return Err(DeskpilotError::InvalidConfig(format!(
                "working hours end ({}) must come after their start ({})",
                self.day_end_hour, self.day_start_hour
            )));
        }
        if self.meeting_minutes <= 0 {
            return Err(DeskpilotError::InvalidConfig(
                "DESKPILOT_MEETING_MINUTES must be positive".to_string(),
            ));
        }
        if self.buffer_minutes < 0 {
            return Err(DeskpilotError::InvalidConfig(
                "DESKPILOT_BUFFER_MINUTES cannot be negative".to_string(),
            ));
        }

        Ok(CalendarConfig {
            day_start,
            day_end,
            meeting_minutes: self.meeting_minutes,
            buffer_minutes: self.buffer_minutes,
        })
    }
}

fn text(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, DeskpilotError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            DeskpilotError::InvalidConfig(format!("{key} could not be parsed from '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServerConfig {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            oracle_base_url: "https://api.openai.com/v1".to_string(),
            oracle_api_key: "test-key".to_string(),
            oracle_model: "gpt-4o-mini".to_string(),
            oracle_timeout: Duration::from_secs(60),
            run_timeout: Duration::from_secs(120),
            day_start_hour: 9,
            day_end_hour: 17,
            meeting_minutes: 60,
            buffer_minutes: 15,
            max_step_retries: 3,
            max_transitions: 50,
            checkpoint_dir: None,
            recall_url: None,
            recall_api_key: None,
        }
    }

    #[test]
    fn default_hours_build_a_calendar() {
        let calendar = base_config().calendar().unwrap();
        assert_eq!(calendar.day_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(calendar.day_end, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
    }

    #[test]
    fn inverted_hours_are_rejected() {
        let mut config = base_config();
        config.day_start_hour = 18;
        config.day_end_hour = 9;
        assert!(matches!(
            config.calendar(),
            Err(DeskpilotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        let mut config = base_config();
        config.day_end_hour = 24;
        assert!(matches!(
            config.calendar(),
            Err(DeskpilotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_length_meetings_are_rejected() {
        let mut config = base_config();
        config.meeting_minutes = 0;
        assert!(matches!(
            config.calendar(),
            Err(DeskpilotError::InvalidConfig(_))
        ));
    }
}
