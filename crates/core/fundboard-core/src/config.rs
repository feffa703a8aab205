//! Configuration management and environment variable loading

use crate::{FundboardError, Result};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Default port for the REST API
pub const DEFAULT_PORT: u16 = 3000;

/// Default quiet period before an edited draft is auto-saved
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

/// Default request body ceiling for pitch-deck uploads (25 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Read the nearest `.env` into the process environment.
///
/// Searches the working directory and its parents. Not finding a file is
/// fine; a file that does not parse is a [`FundboardError::Config`].
///
/// ```no_run
/// fundboard_core::load_env().ok();
/// let key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!(path = %path.display(), "Environment file loaded");
            Ok(())
        }
        Err(dotenvy::Error::Io(_)) => {
            tracing::debug!("No .env file, relying on the process environment");
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(FundboardError::config(format!(
            ".env syntax error in `{}` at index {}",
            line, pos
        ))),
        Err(e) => Err(FundboardError::config(format!("Cannot read .env: {}", e))),
    }
}

/// Read an explicit env file; unlike [`load_env`] a missing file is an error
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    dotenvy::from_path(path).map_err(|e| {
        FundboardError::config(format!("Cannot read env file {}: {}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), "Environment file loaded");
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Variable that must be present and non-blank
pub fn get_required_env(key: &str) -> Result<String> {
    env_value(key).ok_or_else(|| {
        FundboardError::config(format!(
            "{} must be set (run generate-config to create a .env)",
            key
        ))
    })
}

/// Variable with a fallback for unset or blank values
pub fn get_env_or(key: &str, default: &str) -> String {
    env_value(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Boolean flag; unrecognized spellings fall back to `default`
pub fn get_env_bool(key: &str, default: bool) -> bool {
    env_value(key).and_then(|v| parse_bool(&v)).unwrap_or(default)
}

/// Numeric setting; unparsable values fall back to `default`
pub fn get_env_int<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Fail with one error naming every unset variable
pub fn validate_env(required_vars: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required_vars
        .iter()
        .copied()
        .filter(|var| env_value(var).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FundboardError::config(format!(
            "Unset environment variables: {}",
            missing.join(", ")
        )))
    }
}

/// A configured API session token and the user it authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// Plain bearer token as presented by clients
    pub token: String,
    /// User identity the token maps to
    pub user_id: String,
}

/// Parse `token=user_id` pairs separated by commas
pub fn parse_token_grants(raw: &str) -> Result<Vec<TokenGrant>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, user_id) = entry.split_once('=').ok_or_else(|| {
                FundboardError::config(format!(
                    "Invalid FUNDBOARD_API_TOKENS entry (expected token=user_id): {}",
                    entry.chars().take(4).collect::<String>() + "..."
                ))
            })?;
            let (token, user_id) = (token.trim(), user_id.trim());
            if token.is_empty() || user_id.is_empty() {
                return Err(FundboardError::config(
                    "FUNDBOARD_API_TOKENS entries need both a token and a user id",
                ));
            }
            Ok(TokenGrant {
                token: token.to_string(),
                user_id: user_id.to_string(),
            })
        })
        .collect()
}

/// Settings for the per-user profile editor
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Quiet period after the latest edit before the draft is auto-saved
    pub autosave_debounce: Duration,
    /// Write the draft to the store as soon as an extraction is parsed
    pub persist_after_extraction: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            persist_after_extraction: true,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct FundboardConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Enable permissive CORS for browser clients
    pub enable_cors: bool,
    /// Request body ceiling applied by the HTTP layer
    pub max_upload_bytes: usize,
    /// Session tokens; empty means development mode
    pub api_tokens: Vec<TokenGrant>,
    /// Profile editor behavior
    pub editor: EditorConfig,
}

impl Default for FundboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            api_tokens: Vec::new(),
            editor: EditorConfig::default(),
        }
    }
}

impl FundboardConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("FUNDBOARD_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                FundboardError::config(format!("FUNDBOARD_PORT is not a valid port: {}", raw))
            })?,
            None => defaults.port,
        };

        let max_upload_bytes = lookup("FUNDBOARD_MAX_UPLOAD_BYTES")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        let debounce_ms = lookup("FUNDBOARD_AUTOSAVE_DEBOUNCE_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_AUTOSAVE_DEBOUNCE_MS);

        let api_tokens = match lookup("FUNDBOARD_API_TOKENS") {
            Some(raw) => parse_token_grants(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            host: lookup("FUNDBOARD_HOST").unwrap_or(defaults.host),
            port,
            enable_cors: lookup("FUNDBOARD_ENABLE_CORS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.enable_cors),
            max_upload_bytes,
            api_tokens,
            editor: EditorConfig {
                autosave_debounce: Duration::from_millis(debounce_ms),
                persist_after_extraction: lookup("FUNDBOARD_PERSIST_AFTER_EXTRACTION")
                    .and_then(|v| parse_bool(&v))
                    .unwrap_or(defaults.editor.persist_after_extraction),
            },
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_helpers() {
        env::set_var("FUNDBOARD_TEST_FLAG", "Yes");
        env::set_var("FUNDBOARD_TEST_COUNT", " 42 ");
        env::set_var("FUNDBOARD_TEST_BLANK", "   ");

        assert!(get_env_bool("FUNDBOARD_TEST_FLAG", false));
        assert!(get_env_bool("FUNDBOARD_TEST_UNSET_FLAG", true));
        assert_eq!(get_env_int("FUNDBOARD_TEST_COUNT", 0u32), 42);
        assert_eq!(get_env_int("FUNDBOARD_TEST_FLAG", 7u32), 7);
        assert_eq!(get_env_or("FUNDBOARD_TEST_BLANK", "fallback"), "fallback");
        assert!(get_required_env("FUNDBOARD_TEST_BLANK").is_err());

        let err = validate_env(&["FUNDBOARD_TEST_FLAG", "FUNDBOARD_TEST_BLANK", "FUNDBOARD_TEST_UNSET"])
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("FUNDBOARD_TEST_BLANK, FUNDBOARD_TEST_UNSET"));
        assert!(!message.contains("FUNDBOARD_TEST_FLAG"));

        env::remove_var("FUNDBOARD_TEST_FLAG");
        env::remove_var("FUNDBOARD_TEST_COUNT");
        env::remove_var("FUNDBOARD_TEST_BLANK");
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = FundboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert!(config.api_tokens.is_empty());
        assert!(config.editor.persist_after_extraction);
        assert_eq!(
            config.editor.autosave_debounce,
            Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS)
        );
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = FundboardConfig::from_lookup(lookup_from(&[
            ("FUNDBOARD_HOST", "0.0.0.0"),
            ("FUNDBOARD_PORT", "8080"),
            ("FUNDBOARD_AUTOSAVE_DEBOUNCE_MS", "250"),
            ("FUNDBOARD_PERSIST_AFTER_EXTRACTION", "no"),
            ("FUNDBOARD_API_TOKENS", "abc=user-1, def=user-2"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.editor.autosave_debounce, Duration::from_millis(250));
        assert!(!config.editor.persist_after_extraction);
        assert_eq!(config.api_tokens.len(), 2);
        assert_eq!(config.api_tokens[1].user_id, "user-2");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = FundboardConfig::from_lookup(lookup_from(&[("FUNDBOARD_PORT", "http")]));
        assert!(matches!(result, Err(FundboardError::Config(_))));
    }

    #[test]
    fn test_malformed_token_entry() {
        assert!(parse_token_grants("no-separator").is_err());
        assert!(parse_token_grants("=user").is_err());
        assert!(parse_token_grants("").unwrap().is_empty());
    }
}
