//! Site configuration, read from the environment

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{AtelierError, Result};
use crate::repository::GalleryOptions;
use crate::security::RateLimitConfig;
use atelier_backend::config::ClientOptions;

/// Session file below the user's state directory
const SESSION_FILE: &str = "atelier/session.json";

#[derive(Debug, Clone)]
pub struct AtelierConfig {
    pub url: Url,
    pub anon_key: String,
    pub rate_limit: RateLimitConfig,
    pub gallery: GalleryOptions,
    /// Where the CMS session is kept between runs
    pub session_file: Option<PathBuf>,
}

impl AtelierConfig {
    /// Creates a configuration with defaults, validating the URL
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|err| AtelierError::Config(format!("invalid backend URL {:?}: {}", url, err)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AtelierError::Config(format!(
                "backend URL must use http or https, got {}",
                url.scheme()
            )));
        }
        if anon_key.trim().is_empty() {
            return Err(AtelierError::Config("anon key cannot be empty".to_string()));
        }

        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            rate_limit: RateLimitConfig::default(),
            gallery: GalleryOptions::default(),
            session_file: None,
        })
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional `ATELIER_*`
    /// overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AtelierError::Config(format!("{} environment variable not found", key)))
        };
        let number = |key: &str| -> Result<Option<u64>> {
            match lookup(key) {
                Some(value) => value.trim().parse::<u64>().map(Some).map_err(|_| {
                    AtelierError::Config(format!("{} must be a number, got {:?}", key, value))
                }),
                None => Ok(None),
            }
        };

        let mut config = Self::new(&required("SUPABASE_URL")?, &required("SUPABASE_ANON_KEY")?)?;

        if let Some(max) = number("ATELIER_RATE_LIMIT_MAX")? {
            if max == 0 {
                return Err(AtelierError::Config(
                    "ATELIER_RATE_LIMIT_MAX must be at least 1".to_string(),
                ));
            }
            config.rate_limit.max_attempts = max as usize;
        }
        if let Some(secs) = number("ATELIER_RATE_LIMIT_WINDOW_SECS")? {
            config.rate_limit.window = Duration::from_secs(secs);
        }
        if let Some(bucket) = lookup("ATELIER_GALLERY_BUCKET").filter(|b| !b.trim().is_empty()) {
            config.gallery.bucket = bucket.trim().to_string();
        }
        if let Some(bytes) = number("ATELIER_MAX_UPLOAD_BYTES")? {
            config.gallery.max_upload_bytes = bytes;
        }
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let state_dir = non_empty("XDG_STATE_HOME")
            .map(PathBuf::from)
            .or_else(|| non_empty("HOME").map(|home| PathBuf::from(home).join(".local/state")));
        config.session_file = non_empty("ATELIER_SESSION_FILE")
            .map(PathBuf::from)
            .or_else(|| state_dir.map(|dir| dir.join(SESSION_FILE)));

        Ok(config)
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_gallery(mut self, gallery: GalleryOptions) -> Self {
        self.gallery = gallery;
        self
    }

    /// Options for the backend client
    pub fn client_options(&self) -> ClientOptions {
        match &self.session_file {
            Some(path) => ClientOptions::default().with_session_file(path),
            None => ClientOptions::default(),
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AtelierConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://atelier.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.base_url(), "https://atelier.supabase.co");
        assert_eq!(config.rate_limit.max_attempts, 3);
        assert_eq!(config.rate_limit.window, Duration::from_secs(600));
        assert_eq!(config.gallery.bucket, "gallery");
        assert_eq!(config.gallery.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.session_file.is_none());
    }

    #[test]
    fn test_session_file_defaults_to_state_dir() {
        let base = [
            ("SUPABASE_URL", "https://atelier.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ];

        let config =
            AtelierConfig::from_lookup(lookup(&[base[0], base[1], ("HOME", "/home/lea")])).unwrap();
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/home/lea/.local/state/atelier/session.json"))
        );

        let config = AtelierConfig::from_lookup(lookup(&[
            base[0],
            base[1],
            ("HOME", "/home/lea"),
            ("XDG_STATE_HOME", "/var/state"),
        ]))
        .unwrap();
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/var/state/atelier/session.json"))
        );

        let config = AtelierConfig::from_lookup(lookup(&[
            base[0],
            base[1],
            ("HOME", "/home/lea"),
            ("ATELIER_SESSION_FILE", "/tmp/s.json"),
        ]))
        .unwrap();
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_overrides() {
        let config = AtelierConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("ATELIER_RATE_LIMIT_MAX", "5"),
            ("ATELIER_RATE_LIMIT_WINDOW_SECS", "900"),
            ("ATELIER_GALLERY_BUCKET", "photos"),
            ("ATELIER_SESSION_FILE", "/tmp/atelier-session.json"),
        ]))
        .unwrap();

        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert_eq!(config.gallery.bucket, "photos");
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/tmp/atelier-session.json"))
        );
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let err = AtelierConfig::from_lookup(lookup(&[("SUPABASE_ANON_KEY", "anon")])).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));

        assert!(AtelierConfig::new("not a url", "anon").is_err());
        assert!(AtelierConfig::new("ftp://example.com", "anon").is_err());
        assert!(AtelierConfig::new("https://example.com", " ").is_err());

        let err = AtelierConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://atelier.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("ATELIER_RATE_LIMIT_MAX", "three"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AtelierError::Config(_)));
    }
}
