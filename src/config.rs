//! Runtime configuration.
//!
//! Credentials come from the environment (see [`crate::cli::Cli`]) and are
//! validated into [`Credentials`]. Everything else has a sensible default
//! and can be overridden by an optional YAML file:
//!
//! ```yaml
//! language: en
//! page_size: 20
//! top_n: 5
//! model: gpt-4-turbo
//! daily_at: "09:00"
//! ```
//!
//! The schedule [`Cadence`] is resolved here, once, from the OS family so
//! the scheduler itself never inspects the platform.

use crate::error::{DigestError, Result};
use crate::scheduler::Cadence;
use chrono::NaiveTime;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// OS family that gets the per-minute development cadence.
pub const DEV_CADENCE_OS: &str = "macos";

/// The two API keys, read once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub news_api_key: String,
}

impl Credentials {
    /// Fails with [`DigestError::MissingCredential`] when either key is
    /// absent or blank.
    pub fn new(openai_api_key: Option<String>, news_api_key: Option<String>) -> Result<Self> {
        fn require(value: Option<String>, name: &'static str) -> Result<String> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(DigestError::MissingCredential(name))
        }
        Ok(Self {
            openai_api_key: require(openai_api_key, "OPENAI_API_KEY")?,
            news_api_key: require(news_api_key, "NEWS_API_KEY")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("news_api_key", &"<redacted>")
            .finish()
    }
}

/// Tunables with their defaults; any subset may appear in the YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Free-text query sent to the news search.
    pub query: String,
    pub language: String,
    pub page_size: u32,
    /// How many ranked articles get summarized.
    pub top_n: usize,
    /// Completion model identifier.
    pub model: String,
    pub news_api_url: String,
    pub completion_api_base: String,
    /// Local wall-clock time of the daily run, `HH:MM`.
    pub daily_at: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query: "trending".to_string(),
            language: "en".to_string(),
            page_size: 20,
            top_n: 5,
            model: "gpt-4-turbo".to_string(),
            news_api_url: "https://newsapi.org/v2/everything".to_string(),
            completion_api_base: "https://api.openai.com/v1".to_string(),
            daily_at: "09:00".to_string(),
            poll_interval_secs: 60,
            request_timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or return the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let parsed = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded settings file");
                parsed
            }
            None => {
                debug!("No settings file given; using defaults");
                Self::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // An empty file deserializes to `null`.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(DigestError::Config("top_n must be at least 1".into()));
        }
        if !(1..=100).contains(&self.page_size) {
            return Err(DigestError::Config("page_size must be between 1 and 100".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(DigestError::Config("poll_interval_secs must be positive".into()));
        }
        if self.query.trim().is_empty() {
            return Err(DigestError::Config("query must not be empty".into()));
        }
        self.daily_time()?;
        Ok(())
    }

    pub fn daily_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.daily_at, "%H:%M").map_err(|e| {
            DigestError::Config(format!("daily_at {:?} is not HH:MM: {e}", self.daily_at))
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Every minute on [`DEV_CADENCE_OS`], otherwise daily at `daily_at`.
    pub fn cadence_for(&self, os: &str) -> Result<Cadence> {
        if os == DEV_CADENCE_OS {
            Ok(Cadence::EveryMinute)
        } else {
            Ok(Cadence::DailyAt(self.daily_time()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.query, "trending");
        assert_eq!(s.language, "en");
        assert_eq!(s.page_size, 20);
        assert_eq!(s.top_n, 5);
        assert_eq!(s.model, "gpt-4-turbo");
        assert_eq!(s.poll_interval(), Duration::from_secs(60));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let s = Settings::from_yaml("language: de\npage_size: 50\n").unwrap();
        assert_eq!(s.language, "de");
        assert_eq!(s.page_size, 50);
        assert_eq!(s.top_n, 5);
        assert_eq!(s.daily_at, "09:00");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_yaml_key_rejected() {
        assert!(Settings::from_yaml("pagesize: 10\n").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let s = Settings { top_n: 0, ..Settings::default() };
        assert!(s.validate().is_err());

        let s = Settings { page_size: 0, ..Settings::default() };
        assert!(s.validate().is_err());

        let s = Settings { daily_at: "9am".to_string(), ..Settings::default() };
        assert!(matches!(s.validate(), Err(DigestError::Config(_))));
    }

    #[test]
    fn test_cadence_for_platform() {
        let s = Settings::default();
        assert_eq!(s.cadence_for("macos").unwrap(), Cadence::EveryMinute);
        assert_eq!(
            s.cadence_for("linux").unwrap(),
            Cadence::DailyAt(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
        assert_eq!(
            s.cadence_for("windows").unwrap(),
            Cadence::DailyAt(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_credentials_required() {
        let err = Credentials::new(None, Some("news".into())).unwrap_err();
        assert!(matches!(err, DigestError::MissingCredential("OPENAI_API_KEY")));

        let err = Credentials::new(Some("sk".into()), Some("  ".into())).unwrap_err();
        assert!(matches!(err, DigestError::MissingCredential("NEWS_API_KEY")));

        assert!(Credentials::new(Some("sk".into()), Some("news".into())).is_ok());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new(Some("sk-secret".into()), Some("news-secret".into())).unwrap();
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("secret"));
    }
}
