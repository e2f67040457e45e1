//! Process settings.

use clap::Args;
use emulator_broker::BrokerConfig;
use std::fmt;
use std::str::FromStr;

/// Log verbosity, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `tracing` filter directive for this level.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            // tracing has no level above error
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(format!(
                "Invalid log level: {s}. Must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Settings shared by every command.
#[derive(Args, Clone, Debug)]
pub struct Settings {
    /// Kafka bootstrap servers (comma-separated, e.g., "localhost:9092")
    #[arg(
        long,
        env = "KAFKA_BOOTSTRAP_SERVERS",
        default_value = "localhost:9092",
        global = true
    )]
    pub kafka_bootstrap_servers: String,

    /// SASL username (used only together with a password)
    #[arg(long, env = "KAFKA_USERNAME", global = true)]
    pub kafka_username: Option<String>,

    /// SASL password
    #[arg(long, env = "KAFKA_PASSWORD", hide_env_values = true, global = true)]
    pub kafka_password: Option<String>,

    /// Log level: DEBUG, INFO, WARNING, ERROR or CRITICAL (case-insensitive)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO", global = true)]
    pub log_level: LogLevel,

    /// Include thread ids and targets in log lines
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Force DEBUG logging regardless of --log-level
    #[arg(long, global = true)]
    pub debug: bool,
}

impl Settings {
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// Parse a duration like "90", "90s", "30m" or "1h" into whole seconds.
pub fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Empty duration string".to_string());
    }

    let (digits, multiplier) = if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes, 60)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else {
        (s, 1)
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid duration value: {s}"))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Duration too large: {s}"))
}

impl From<&Settings> for BrokerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            bootstrap_servers: settings.kafka_bootstrap_servers.clone(),
            username: settings.kafka_username.clone(),
            password: settings.kafka_password.clone(),
            ..BrokerConfig::default()
        }
    }
}
