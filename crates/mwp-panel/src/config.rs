use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Which retry behaviour the query layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProfile {
    Development,
    Production,
}

impl BuildProfile {
    /// Debug builds behave like a dev server, release builds like production.
    pub fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl FromStr for BuildProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidProfile(s.to_string())),
        }
    }
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub session_path: PathBuf,
    pub profile: BuildProfile,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported base URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("MWP_PROFILE must be `development` or `production`, got {0:?}")]
    InvalidProfile(String),
}

impl Config {
    /// Read `MWP_API_BASE_URL`, `MWP_SESSION_FILE` and `MWP_PROFILE`,
    /// honouring a `.env` file in the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|_| None)
    }

    /// Like [`Config::from_env`], but `overrides` is consulted first, so a
    /// command-line value replaces a broken environment value before it is
    /// parsed.
    pub fn from_env_with(
        overrides: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_layers(overrides, |var| env::var(var).ok())
    }

    /// Resolve each variable from `first`, falling back to `second`.
    pub fn from_layers(
        first: impl Fn(&str) -> Option<String>,
        second: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|var| first(var).or_else(|| second(var)))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("MWP_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let session_path = lookup("MWP_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_session_path(lookup("HOME")));
        let profile = match lookup("MWP_PROFILE") {
            Some(p) if !p.trim().is_empty() => p.parse()?,
            _ => BuildProfile::from_build(),
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            session_path,
            profile,
        })
    }
}

fn default_session_path(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(".config/mwp/session.toml"),
        None => PathBuf::from("mwp-session.toml"),
    }
}

/// Check that the base URL is absolute http(s) and strip any trailing slash
/// so resource paths can be appended verbatim.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup(&[("HOME", "/home/admin")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.session_path,
            PathBuf::from("/home/admin/.config/mwp/session.toml")
        );
        assert_eq!(config.profile, BuildProfile::from_build());
    }

    #[test]
    fn override_layer_hides_broken_env() {
        let env = lookup(&[
            ("MWP_PROFILE", "staging"),
            ("MWP_API_BASE_URL", "ftp://nope"),
            ("MWP_SESSION_FILE", "/tmp/env.toml"),
        ]);
        let flags = lookup(&[
            ("MWP_PROFILE", "dev"),
            ("MWP_API_BASE_URL", "http://10.0.0.1:8080/api"),
        ]);

        let config = Config::from_layers(flags, env).unwrap();
        assert_eq!(config.profile, BuildProfile::Development);
        assert_eq!(config.base_url, "http://10.0.0.1:8080/api");
        assert_eq!(config.session_path, PathBuf::from("/tmp/env.toml"));
    }

    #[test]
    fn session_file_falls_back_to_cwd_without_home() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.session_path, PathBuf::from("mwp-session.toml"));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("MWP_API_BASE_URL", "https://vpn.example.com/api/"),
            ("MWP_SESSION_FILE", "/tmp/s.toml"),
            ("MWP_PROFILE", "production"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://vpn.example.com/api");
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.toml"));
        assert_eq!(config.profile, BuildProfile::Production);
    }

    #[test_case("Development", Some(BuildProfile::Development) ; "capitalised")]
    #[test_case("prod", Some(BuildProfile::Production) ; "short form")]
    #[test_case("staging", None ; "unknown")]
    fn parses_profile(input: &str, expected: Option<BuildProfile>) {
        assert_eq!(input.parse::<BuildProfile>().ok(), expected);
    }

    #[test_case("/api" ; "relative")]
    #[test_case("ftp://example.com/api" ; "wrong scheme")]
    #[test_case("not a url" ; "garbage")]
    fn rejects_bad_base_urls(input: &str) {
        assert!(normalize_base_url(input).is_err());
    }
}
