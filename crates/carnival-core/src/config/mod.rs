//! Client configuration.
//!
//! Every Carnival client needs the same three things: where the hosted
//! backend lives, the public anon key it accepts, and how long the editor
//! waits after the last keystroke before saving.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Quiet period before an edit is persisted.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// Public, safe-to-ship client configuration. Secrets never live here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_autosave_delay", with = "duration_ms")]
    pub autosave_delay: Duration,
}

impl ClientConfig {
    pub fn new(supabase_url: impl Into<String>, supabase_anon_key: impl Into<String>) -> Result<Self> {
        let supabase_url = normalize_text_option(Some(supabase_url.into()))
            .ok_or_else(|| Error::Config("Supabase URL must not be empty".to_string()))?;
        if !is_http_url(&supabase_url) {
            return Err(Error::Config(
                "Supabase URL must include http:// or https://".to_string(),
            ));
        }
        let supabase_anon_key = normalize_text_option(Some(supabase_anon_key.into()))
            .ok_or_else(|| Error::Config("Supabase anon key must not be empty".to_string()))?;

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
        })
    }

    #[must_use]
    pub const fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `CARNIVAL_AUTOSAVE_MS`.
    ///
    /// Returns `Ok(None)` when neither Supabase variable is set.
    pub fn from_env() -> Result<Option<Self>> {
        let url = normalize_text_option(std::env::var("SUPABASE_URL").ok());
        let anon_key = normalize_text_option(std::env::var("SUPABASE_ANON_KEY").ok());
        let delay = parse_autosave_delay(std::env::var("CARNIVAL_AUTOSAVE_MS").ok())?;

        match (url, anon_key) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => {
                Ok(Some(Self::new(url, anon_key)?.with_autosave_delay(delay)))
            }
            _ => Err(Error::Config(
                "SUPABASE_URL and SUPABASE_ANON_KEY must be set together".to_string(),
            )),
        }
    }

    /// Project URL without any service path.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.supabase_url
            .strip_suffix("/rest/v1")
            .unwrap_or(&self.supabase_url)
    }

    /// Base URL of the REST data API, e.g. `https://x.supabase.co/rest/v1`.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url())
    }
}

/// Trim optional text, treating blank values as unset.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Parse an autosave delay in milliseconds, falling back to the default.
pub fn parse_autosave_delay(raw: Option<String>) -> Result<Duration> {
    let Some(raw) = normalize_text_option(raw) else {
        return Ok(DEFAULT_AUTOSAVE_DELAY);
    };
    let millis = raw.parse::<u64>().map_err(|_| {
        Error::Config(format!("Autosave delay must be a whole number of ms, got '{raw}'"))
    })?;
    if millis == 0 {
        return Err(Error::Config("Autosave delay must be positive".to_string()));
    }
    Ok(Duration::from_millis(millis))
}

const fn default_autosave_delay() -> Duration {
    DEFAULT_AUTOSAVE_DELAY
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
