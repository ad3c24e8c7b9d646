mod config;
mod error;
mod install;
mod object;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerTimeZone, LoggerTimer};

/// Installs the global tracing subscriber described by `cfg`.
///
/// Must be called once, before the async runtime starts worker threads when
/// `LoggerTimeZone::Local` is used: the local UTC offset can only be detected
/// reliably while the process is still single-threaded.
///
/// # Examples
/// ```rust
/// use stackhook_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("Failed to initialize logger");
///
/// tracing::info!("logger initialized");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => install::logger_text(cfg),
        LoggerFormat::Json => install::logger_json(cfg),
        LoggerFormat::Journald => install::logger_journald(cfg),
    }
}
