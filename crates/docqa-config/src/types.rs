//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]        # listener, staging, upload limits
//! [session]       # inactivity timeout, session bound, cookie
//! [llm]           # generation backend
//! [extraction]    # empty-text policy
//! [logging]       # log file location
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default upload size limit (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default inactivity timeout in seconds.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 120;

/// Default bound on live session records.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "docqa_session";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocqaConfig {
    pub server: Option<ServerConfig>,
    pub session: Option<SessionConfig>,
    pub llm: Option<LlmConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub logging: Option<LoggingConfig>,
}

impl DocqaConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Merging is per section: a section present in `other` replaces the
    /// whole section here.
    pub fn merge(&mut self, other: DocqaConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
        if other.llm.is_some() {
            self.llm = other.llm;
        }
        if other.extraction.is_some() {
            self.extraction = other.extraction;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// LLM section, or defaults.
    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    /// Extraction section, or defaults.
    pub fn extraction(&self) -> ExtractionConfig {
        self.extraction.clone().unwrap_or_default()
    }

    /// Logging section, or defaults.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Reject values no component can run with.
    pub fn validate(&self) -> Result<()> {
        let server = self.server();
        if server.max_upload_bytes == 0 {
            return Err(ConfigError::invalid("server.max_upload_bytes", "must be positive"));
        }

        let session = self.session();
        if session.timeout_secs == 0 {
            return Err(ConfigError::invalid("session.timeout_secs", "must be positive"));
        }
        if session.max_sessions == 0 {
            return Err(ConfigError::invalid("session.max_sessions", "must be positive"));
        }
        if session.cookie_name.is_empty()
            || !session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        {
            return Err(ConfigError::invalid(
                "session.cookie_name",
                "must be non-empty and use only letters, digits, '_' or '-'",
            ));
        }

        let llm = self.llm();
        if llm.model.trim().is_empty() {
            return Err(ConfigError::invalid("llm.model", "must not be empty"));
        }
        if llm.summary_max_tokens == 0 || llm.answer_max_tokens == 0 {
            return Err(ConfigError::invalid(
                "llm.summary_max_tokens/answer_max_tokens",
                "must be positive",
            ));
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Where uploads are staged before extraction. Defaults to a directory
    /// under the system temp dir.
    pub staging_dir: Option<PathBuf>,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            staging_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_logging: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity timeout in seconds.
    pub timeout_secs: u64,
    /// Upper bound on session records kept in memory.
    pub max_sessions: usize,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Supported generation backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Openai,
    Ollama,
    Mock,
}

impl Backend {
    /// Default environment variable holding this backend's API key.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Backend::Openai => Some("OPENAI_API_KEY"),
            Backend::Ollama | Backend::Mock => None,
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Openai => "OpenAI",
            Backend::Ollama => "Ollama",
            Backend::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Backend::Openai),
            "ollama" => Ok(Backend::Ollama),
            "mock" => Ok(Backend::Mock),
            other => Err(ConfigError::invalid(
                "llm.backend",
                format!("unknown backend '{}' (expected openai, ollama or mock)", other),
            )),
        }
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: Backend,
    /// API base URL; the backend's default when unset.
    pub base_url: Option<String>,
    pub model: String,
    /// Environment variable holding the API key; the backend's default
    /// when unset.
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries on network failures.
    pub max_retries: u32,
    pub summary_max_tokens: u32,
    pub answer_max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            api_key_env: None,
            timeout_secs: 300,
            max_retries: 2,
            summary_max_tokens: 150,
            answer_max_tokens: 50,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// The environment variable to read the API key from, if any.
    pub fn resolved_api_key_env(&self) -> Option<String> {
        self.api_key_env
            .clone()
            .or_else(|| self.backend.env_var().map(str::to_string))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Treat documents that yield no text as extraction failures.
    pub reject_empty_text: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a daily-rotated JSON log file.
    pub file: bool,
    /// Directory for log files; `<config dir>/logs` when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DocqaConfig::from_toml("").unwrap();
        assert_eq!(config, DocqaConfig::new());

        assert_eq!(config.server().port, 5000);
        assert_eq!(config.server().bind, "127.0.0.1");
        assert_eq!(config.server().max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.session().timeout_secs, 120);
        assert_eq!(config.session().cookie_name, "docqa_session");
        assert_eq!(config.llm().backend, Backend::Openai);
        assert_eq!(config.llm().summary_max_tokens, 150);
        assert_eq!(config.llm().answer_max_tokens, 50);
        assert!(!config.extraction().reject_empty_text);
        assert!(config.logging().file);
    }

    #[test]
    fn test_full_config_parses() {
        let config = DocqaConfig::from_toml(
            r#"
[server]
bind = "0.0.0.0"
port = 8080
staging_dir = "/var/tmp/docqa"
max_upload_bytes = 1024
request_logging = false

[session]
timeout_secs = 30
max_sessions = 50
cookie_name = "sid"

[llm]
backend = "ollama"
base_url = "http://gpu-box:11434/v1"
model = "llama3"
timeout_secs = 60
summary_max_tokens = 200
answer_max_tokens = 40
temperature = 0.1

[extraction]
reject_empty_text = true

[logging]
file = false
"#,
        )
        .unwrap();

        let server = config.server();
        assert_eq!(server.bind, "0.0.0.0");
        assert_eq!(server.port, 8080);
        assert_eq!(server.staging_dir, Some(PathBuf::from("/var/tmp/docqa")));
        assert!(!server.request_logging);

        assert_eq!(config.session().timeout_secs, 30);
        assert_eq!(config.session().cookie_name, "sid");

        let llm = config.llm();
        assert_eq!(llm.backend, Backend::Ollama);
        assert_eq!(llm.base_url.as_deref(), Some("http://gpu-box:11434/v1"));
        assert_eq!(llm.temperature, Some(0.1));
        assert_eq!(llm.resolved_api_key_env(), None);

        assert!(config.extraction().reject_empty_text);
        assert!(!config.logging().file);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config = DocqaConfig::from_toml("[session]\ntimeout_secs = 10\n").unwrap();
        let session = config.session();
        assert_eq!(session.timeout_secs, 10);
        assert_eq!(session.max_sessions, DEFAULT_MAX_SESSIONS);
    }

    #[test]
    fn test_unknown_backend_fails_to_parse() {
        let err = DocqaConfig::from_toml("[llm]\nbackend = \"palm\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("OpenAI".parse::<Backend>().unwrap(), Backend::Openai);
        assert_eq!("mock".parse::<Backend>().unwrap(), Backend::Mock);
        assert!("palm".parse::<Backend>().is_err());
    }

    #[test]
    fn test_api_key_env_resolution() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.resolved_api_key_env().as_deref(), Some("OPENAI_API_KEY"));

        llm.api_key_env = Some("MY_KEY".to_string());
        assert_eq!(llm.resolved_api_key_env().as_deref(), Some("MY_KEY"));
    }

    #[test]
    fn test_merge_replaces_present_sections() {
        let mut base = DocqaConfig::from_toml("[server]\nport = 8080\n[session]\ntimeout_secs = 60\n")
            .unwrap();
        let overlay = DocqaConfig::from_toml("[server]\nport = 3000\n").unwrap();

        base.merge(overlay);
        assert_eq!(base.server().port, 3000);
        assert_eq!(base.session().timeout_secs, 60);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = DocqaConfig::from_toml("[session]\ntimeout_secs = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session.timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_bad_cookie_name() {
        let config = DocqaConfig::from_toml("[session]\ncookie_name = \"a b;c\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }
}
