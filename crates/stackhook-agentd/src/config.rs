//! Process configuration, read once from the environment at startup.
use std::{path::PathBuf, str::FromStr, time::Duration};

use stackhook_model::Branch;
use stackhook_observe::{LoggerConfig, LoggerFormat, LoggerLevel, LoggerTimeZone};
use thiserror::Error;

pub const DEFAULT_URL_VALIDITY: Duration = Duration::from_secs(120);
/// Longest accepted link lifetime (one week).
pub const MAX_URL_VALIDITY: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_SSH_KEY_PATH: &str = "/app/ssh_key";
pub const DEFAULT_STACK_SCRIPT: &str = "./stack.sh";
pub const LISTEN_PORT: u16 = 9999;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AgentConfig {
    pub branch: Branch,
    pub url_validity: Duration,
    /// Public base URL deploy links are built on, without trailing `/`.
    pub public_url: String,
    pub webhook_secret: String,
    pub stack_dir: String,
    pub stack_name: String,
    pub stack_script: PathBuf,
    pub ssh_host: String,
    pub ssh_user: String,
    pub ssh_port: u16,
    pub ssh_key_path: PathBuf,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub logger: LoggerConfig,
    /// Problems that fell back to a default; logged once the logger is up.
    pub warnings: Vec<String>,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let mut warnings = Vec::new();

        let branch = match get("BRANCH") {
            Some(raw) => Branch::new(raw).map_err(|e| invalid("BRANCH", e))?,
            None => Branch::default(),
        };

        let url_validity = match get("URL_VALIDITY") {
            None => DEFAULT_URL_VALIDITY,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 && secs <= MAX_URL_VALIDITY.as_secs() => {
                    Duration::from_secs(secs)
                }
                _ => {
                    warnings.push(format!(
                        "URL_VALIDITY={raw:?} is not a number of seconds in 1..={}, using {}",
                        MAX_URL_VALIDITY.as_secs(),
                        DEFAULT_URL_VALIDITY.as_secs()
                    ));
                    DEFAULT_URL_VALIDITY
                }
            },
        };

        let public_url = required("HOST")?.trim().trim_end_matches('/').to_string();
        let ssh_port = parse("SSH_PORT", &required("SSH_PORT")?)?;
        if ssh_port == 0 {
            return Err(invalid("SSH_PORT", "port 0"));
        }

        let logger = LoggerConfig {
            level: match get("LOG_LEVEL") {
                Some(raw) => parse::<LoggerLevel>("LOG_LEVEL", &raw)?,
                None => LoggerLevel::default(),
            },
            format: match get("LOG_FORMAT") {
                Some(raw) => parse::<LoggerFormat>("LOG_FORMAT", &raw)?,
                None => LoggerFormat::default(),
            },
            tz: match get("LOG_TZ") {
                Some(raw) => parse::<LoggerTimeZone>("LOG_TZ", &raw)?,
                None => LoggerTimeZone::default(),
            },
            ..Default::default()
        };

        Ok(Self {
            branch,
            url_validity,
            public_url,
            webhook_secret: required("WEBHOOK_SECRET")?,
            stack_dir: required("STACK_DIR")?,
            stack_name: required("STACK_NAME")?,
            stack_script: get("STACK_SCRIPT")
                .unwrap_or_else(|| DEFAULT_STACK_SCRIPT.into())
                .into(),
            ssh_host: required("SSH_HOST")?,
            ssh_user: required("SSH_USER")?,
            ssh_port,
            ssh_key_path: get("SSH_KEY_PATH")
                .unwrap_or_else(|| DEFAULT_SSH_KEY_PATH.into())
                .into(),
            telegram_token: required("TELEGRAM_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            logger,
            warnings,
        })
    }
}

// Secrets stay out of logs and panic messages.
impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("branch", &self.branch)
            .field("url_validity", &self.url_validity)
            .field("public_url", &self.public_url)
            .field("stack_dir", &self.stack_dir)
            .field("stack_name", &self.stack_name)
            .field("stack_script", &self.stack_script)
            .field("ssh_host", &self.ssh_host)
            .field("ssh_user", &self.ssh_user)
            .field("ssh_port", &self.ssh_port)
            .field("ssh_key_path", &self.ssh_key_path)
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    raw.trim().parse().map_err(|e| invalid(var, e))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("HOST", "https://deploy.example.com/"),
            ("WEBHOOK_SECRET", "s3cret"),
            ("STACK_DIR", "/srv/web"),
            ("STACK_NAME", "web"),
            ("SSH_HOST", "10.0.0.5"),
            ("SSH_USER", "deploy"),
            ("SSH_PORT", "22"),
            ("TELEGRAM_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AgentConfig, ConfigError> {
        AgentConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply() {
        let cfg = load(&base()).unwrap();

        assert_eq!(cfg.branch.as_str(), "master");
        assert_eq!(cfg.url_validity, Duration::from_secs(120));
        assert_eq!(cfg.public_url, "https://deploy.example.com");
        assert_eq!(cfg.ssh_port, 22);
        assert_eq!(cfg.ssh_key_path, PathBuf::from("/app/ssh_key"));
        assert_eq!(cfg.stack_script, PathBuf::from("./stack.sh"));
        assert_eq!(cfg.logger.format, LoggerFormat::Text);
        assert_eq!(cfg.logger.level.as_str(), "info");
        assert_eq!(cfg.logger.tz, LoggerTimeZone::Utc);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn each_required_variable_is_enforced() {
        for key in base().keys() {
            let mut vars = base();
            vars.remove(key);

            match load(&vars) {
                Err(ConfigError::Missing(name)) => assert_eq!(name, *key),
                other => panic!("expected Missing({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = base();
        vars.insert("WEBHOOK_SECRET", "  ");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Missing("WEBHOOK_SECRET"))
        ));
    }

    #[test]
    fn bad_validity_falls_back_with_warning() {
        for raw in ["0", "soon", "-5", "604801", "18446744073709551615"] {
            let mut vars = base();
            vars.insert("URL_VALIDITY", raw);
            let cfg = load(&vars).unwrap();

            assert_eq!(cfg.url_validity, DEFAULT_URL_VALIDITY, "{raw}");
            assert_eq!(cfg.warnings.len(), 1);
        }

        let mut vars = base();
        vars.insert("URL_VALIDITY", "300");
        assert_eq!(load(&vars).unwrap().url_validity, Duration::from_secs(300));

        vars.insert("URL_VALIDITY", "604800");
        assert_eq!(load(&vars).unwrap().url_validity, MAX_URL_VALIDITY);
    }

    #[test]
    fn invalid_values_are_errors() {
        for (key, raw) in [
            ("SSH_PORT", "ssh"),
            ("SSH_PORT", "70000"),
            ("SSH_PORT", "0"),
            ("BRANCH", "bad branch"),
            ("LOG_FORMAT", "xml"),
            ("LOG_LEVEL", "stackhook=loud"),
            ("LOG_TZ", "mars"),
        ] {
            let mut vars = base();
            vars.insert(key, raw);

            match load(&vars) {
                Err(ConfigError::Invalid { var, .. }) => assert_eq!(var, key),
                other => panic!("expected Invalid({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = base();
        vars.insert("BRANCH", "main");
        vars.insert("SSH_KEY_PATH", "/keys/id_ed25519");
        vars.insert("STACK_SCRIPT", "/opt/stack.sh");
        vars.insert("LOG_FORMAT", "json");
        vars.insert("LOG_LEVEL", "stackhook_core=debug,info");
        vars.insert("LOG_TZ", "local");
        let cfg = load(&vars).unwrap();

        assert_eq!(cfg.branch.as_str(), "main");
        assert_eq!(cfg.ssh_key_path, PathBuf::from("/keys/id_ed25519"));
        assert_eq!(cfg.stack_script, PathBuf::from("/opt/stack.sh"));
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.logger.level.as_str(), "stackhook_core=debug,info");
        assert_eq!(cfg.logger.tz, LoggerTimeZone::Local);
    }

    #[test]
    fn debug_hides_secrets() {
        let dump = format!("{:?}", load(&base()).unwrap());
        assert!(!dump.contains("s3cret"));
        assert!(!dump.contains("123:abc"));
    }
}
