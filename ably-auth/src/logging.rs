// Logging setup and helpers for keeping credentials out of logs

use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }
}

impl LogConfig {
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct LogConfigBuilder {
    level: Option<LogLevel>,
    format: Option<LogFormat>,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn build(self) -> LogConfig {
        let default = LogConfig::default();
        LogConfig {
            level: self.level.unwrap_or(default.level),
            format: self.format.unwrap_or(default.format),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Install a global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// if a subscriber was already installed.
pub fn init_logging(config: LogConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    let installed = match config.format {
        LogFormat::Json => subscriber.json().try_init().is_ok(),
        LogFormat::Pretty => subscriber.try_init().is_ok(),
    };

    if installed {
        info!(level = config.level.as_str(), "Logging initialized");
    }
    installed
}

/// Render an API key with its secret hidden: `appId.keyId:***`
pub fn redact_key(key: &str) -> String {
    match key.split_once(':') {
        Some((name, _)) => format!("{}:***", name),
        None => "***".to_string(),
    }
}

/// Render a token showing only its first few characters
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "***".to_string()
    } else {
        format!("{}***", prefix)
    }
}

/// Correlation id attached to the log lines of one token acquisition
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
