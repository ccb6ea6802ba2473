/*!
 * Mediator Configuration
 *
 * Read once at startup and shared immutably afterwards.
 */

use super::errors::{ConfigError, ConfigResult};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SANDBOX_ROOT: &str = "/workspace/test-files";
pub const DEFAULT_COLLECTOR_URL: &str = "http://localhost:8082/events";
pub const DEFAULT_ISSUER: &str = "https://ssf-lab-mcp-server.example.com";
pub const DEFAULT_AUDIENCE: &str = "https://ssf-lab-receiver.example.com";
pub const DEFAULT_SUBJECT_EMAIL: &str = "lab-student@example.com";
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_SENSITIVE_PATTERNS: [&str; 5] =
    [".secret", ".credentials", "/secure/", "api-key", "password"];

/// Configuration for path sandboxing, classification and event delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediatorConfig {
    /// Directory outside of which file content is never returned
    pub sandbox_root: PathBuf,

    /// Directory listed when the caller gives no path
    pub default_list_dir: PathBuf,

    /// Collector endpoint; `None` disables delivery (local records remain)
    pub collector_url: Option<String>,

    /// Case-insensitive substrings marking a path as sensitive
    pub sensitive_patterns: Vec<String>,

    pub issuer: String,
    pub audience: String,
    pub subject_email: String,

    /// Hard bound on a single delivery attempt (default: 2s)
    pub delivery_timeout: Duration,

    /// Apply the read sandbox denial to listings as well (default: false)
    pub sandbox_listings: bool,
}

impl MediatorConfig {
    /// Create configuration with the lab defaults
    pub fn new() -> Self {
        Self {
            sandbox_root: PathBuf::from(DEFAULT_SANDBOX_ROOT),
            default_list_dir: PathBuf::from(DEFAULT_SANDBOX_ROOT),
            collector_url: Some(DEFAULT_COLLECTOR_URL.to_string()),
            sensitive_patterns: DEFAULT_SENSITIVE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            subject_email: DEFAULT_SUBJECT_EMAIL.to_string(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            sandbox_listings: false,
        }
    }

    /// Load defaults overlaid with `SSF_*` environment variables
    ///
    /// Environment variables:
    /// - SSF_SANDBOX_ROOT, SSF_DEFAULT_LIST_DIR
    /// - SSF_COLLECTOR_URL (empty or `off` disables delivery)
    /// - SSF_SENSITIVE_PATTERNS (comma-separated)
    /// - SSF_ISSUER, SSF_AUDIENCE, SSF_SUBJECT_EMAIL
    /// - SSF_DELIVERY_TIMEOUT_MS
    /// - SSF_SANDBOX_LISTINGS (true/false/1/0)
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(root) = lookup("SSF_SANDBOX_ROOT") {
            config.sandbox_root = PathBuf::from(&root);
            // Listing follows the sandbox unless set explicitly below
            config.default_list_dir = PathBuf::from(root);
        }
        if let Some(dir) = lookup("SSF_DEFAULT_LIST_DIR") {
            config.default_list_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("SSF_COLLECTOR_URL") {
            let trimmed = url.trim();
            config.collector_url = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("off") {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(raw) = lookup("SSF_SENSITIVE_PATTERNS") {
            config.sensitive_patterns = parse_patterns(&raw)?;
        }
        if let Some(issuer) = lookup("SSF_ISSUER") {
            config.issuer = issuer;
        }
        if let Some(audience) = lookup("SSF_AUDIENCE") {
            config.audience = audience;
        }
        if let Some(email) = lookup("SSF_SUBJECT_EMAIL") {
            config.subject_email = email;
        }
        if let Some(raw) = lookup("SSF_DELIVERY_TIMEOUT_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "SSF_DELIVERY_TIMEOUT_MS",
                    value: raw.clone(),
                })?;
            config.delivery_timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("SSF_SANDBOX_LISTINGS") {
            config.sandbox_listings = parse_bool("SSF_SANDBOX_LISTINGS", &raw)?;
        }

        Ok(config)
    }

    pub fn with_sandbox_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.default_list_dir = root.clone();
        self.sandbox_root = root;
        self
    }

    pub fn with_default_list_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_list_dir = dir.into();
        self
    }

    pub fn with_collector_url(mut self, url: Option<String>) -> Self {
        self.collector_url = url;
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub fn with_sandbox_listings(mut self, enabled: bool) -> Self {
        self.sandbox_listings = enabled;
        self
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_patterns(raw: &str) -> ConfigResult<Vec<String>> {
    let patterns: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if patterns.is_empty() {
        return Err(ConfigError::EmptyPatterns);
    }
    Ok(patterns)
}

fn parse_bool(key: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
