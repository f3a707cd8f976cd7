use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// What happens to a contractor's concepts (and their payments) when the
/// contractor is deleted. Project links and stored documents are always removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContractorDeletePolicy {
    /// Keep the concepts with no contractor reference.
    #[default]
    Orphan,
    /// Delete the concepts and their payments in the same transaction.
    Cascade,
    /// Refuse the deletion while the contractor still has concepts.
    Restrict,
}

impl ContractorDeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractorDeletePolicy::Orphan => "orphan",
            ContractorDeletePolicy::Cascade => "cascade",
            ContractorDeletePolicy::Restrict => "restrict",
        }
    }
}

impl FromStr for ContractorDeletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Ok(ContractorDeletePolicy::Orphan),
            "cascade" => Ok(ContractorDeletePolicy::Cascade),
            "restrict" => Ok(ContractorDeletePolicy::Restrict),
            _ => Err(ConfigError::Invalid {
                key: "CONTRACTOR_DELETE_POLICY",
                value: s.to_string(),
            }),
        }
    }
}

/// Byte caps applied while draining a multipart contractor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest single part, file or text field.
    pub max_part_bytes: usize,
    /// Largest sum of every part in one request.
    pub max_form_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_part_bytes: 10 * 1024 * 1024,
            max_form_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub storage_root: PathBuf,
    /// URL prefix the stored documents are served under.
    pub storage_public_path: String,
    pub delete_policy: ContractorDeletePolicy,
    pub run_migrations: bool,
    /// Enables the response cache when set.
    pub redis_url: Option<String>,
    pub upload_limits: UploadLimits,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (the process
    /// environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 8080,
        };

        let delete_policy = match lookup("CONTRACTOR_DELETE_POLICY") {
            Some(raw) => raw.parse()?,
            None => ContractorDeletePolicy::default(),
        };

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(raw) => parse_flag("RUN_MIGRATIONS", &raw)?,
            None => false,
        };

        let defaults = UploadLimits::default();
        let upload_limits = UploadLimits {
            max_part_bytes: parse_bytes(&lookup, "UPLOAD_MAX_PART_BYTES", defaults.max_part_bytes)?,
            max_form_bytes: parse_bytes(&lookup, "UPLOAD_MAX_FORM_BYTES", defaults.max_form_bytes)?,
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            storage_root: lookup("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            storage_public_path: lookup("STORAGE_PUBLIC_PATH")
                .unwrap_or_else(|| "/storage".to_string()),
            delete_policy,
            run_migrations,
            redis_url: lookup("REDIS_URL").filter(|v| !v.trim().is_empty()),
            upload_limits,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_bytes<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|bytes| *bytes > 0)
            .ok_or(ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
