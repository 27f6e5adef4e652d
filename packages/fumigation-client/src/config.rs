use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Which client the library is running as.
///
/// Web honours "remember me"; mobile always persists the session durably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Web,
    Mobile,
}

impl Platform {
    pub fn default_timeout(&self) -> Duration {
        match self {
            Platform::Web => Duration::from_secs(10),
            Platform::Mobile => Duration::from_secs(15),
        }
    }
}

impl FromStr for Platform {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "mobile" => Ok(Platform::Mobile),
            other => Err(ClientError::Config(format!("unknown platform '{}'", other))),
        }
    }
}

/// Shape of the `Authorization` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthHeaderStyle {
    /// `"<tokenType> <token>"`
    #[default]
    Prefixed,
    /// The bare token
    Raw,
}

impl FromStr for AuthHeaderStyle {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefixed" | "bearer" => Ok(AuthHeaderStyle::Prefixed),
            "raw" => Ok(AuthHeaderStyle::Raw),
            other => Err(ClientError::Config(format!(
                "unknown auth header style '{}'",
                other
            ))),
        }
    }
}

/// Language of user-facing failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl FromStr for Locale {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            other => Err(ClientError::Config(format!("unknown locale '{}'", other))),
        }
    }
}

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub platform: Platform,
    pub timeout: Duration,
    pub refresh_interval: Duration,
    pub storage_dir: PathBuf,
    pub auth_header: AuthHeaderStyle,
    pub locale: Locale,
    /// Keep the login password in memory for silent re-authentication when
    /// the backend does not issue refresh tokens.
    pub cache_password: bool,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let platform = Platform::default();
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            platform,
            timeout: platform.default_timeout(),
            refresh_interval: Duration::from_secs(600),
            storage_dir: PathBuf::from(".fumigation"),
            auth_header: AuthHeaderStyle::default(),
            locale: Locale::default(),
            cache_password: true,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(None)
    }

    /// Like [`from_env`](Self::from_env), with `api_url` taking precedence over
    /// `FUMIGATION_API_URL`.
    pub fn from_env_with(api_url: Option<String>) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let api_url = match api_url {
            Some(url) => url,
            None => env::var("FUMIGATION_API_URL")
                .map_err(|_| ClientError::Config("FUMIGATION_API_URL must be set".into()))?,
        };

        let platform = match env::var("FUMIGATION_PLATFORM") {
            Ok(value) => value.parse()?,
            Err(_) => Platform::default(),
        };

        let mut config = Self::new(api_url).with_platform(platform);

        if let Ok(secs) = env::var("FUMIGATION_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_secs("FUMIGATION_TIMEOUT_SECS", &secs)?);
        }
        if let Ok(secs) = env::var("FUMIGATION_REFRESH_INTERVAL_SECS") {
            config.refresh_interval =
                Duration::from_secs(parse_secs("FUMIGATION_REFRESH_INTERVAL_SECS", &secs)?);
        }
        if let Ok(dir) = env::var("FUMIGATION_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Ok(style) = env::var("FUMIGATION_AUTH_HEADER") {
            config.auth_header = style.parse()?;
        }
        if let Ok(locale) = env::var("FUMIGATION_LOCALE") {
            config.locale = locale.parse()?;
        }
        if let Ok(flag) = env::var("FUMIGATION_CACHE_PASSWORD") {
            config.cache_password = parse_bool("FUMIGATION_CACHE_PASSWORD", &flag)?;
        }

        Ok(config)
    }

    /// Switch platform; also resets the timeout to the platform default.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self.timeout = platform.default_timeout();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_auth_header(mut self, style: AuthHeaderStyle) -> Self {
        self.auth_header = style;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_cache_password(mut self, enabled: bool) -> Self {
        self.cache_password = enabled;
        self
    }

    /// Join a request path onto the API base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ClientError::Config(format!("{} must be greater than zero", name))),
        Ok(secs) => Ok(secs),
        Err(_) => Err(ClientError::Config(format!(
            "{} must be a whole number of seconds",
            name
        ))),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ClientError::Config(format!("{} must be true or false", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_sets_default_timeout() {
        let web = ClientConfig::new("https://api.example.com");
        assert_eq!(web.timeout, Duration::from_secs(10));

        let mobile = web.with_platform(Platform::Mobile);
        assert_eq!(mobile.timeout, Duration::from_secs(15));
    }

    #[test]
    fn url_for_joins_without_double_slash() {
        let config = ClientConfig::new("https://api.example.com/api/");
        assert_eq!(
            config.url_for("/auth/login"),
            "https://api.example.com/api/auth/login"
        );
        assert_eq!(config.url_for("users"), "https://api.example.com/api/users");
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!("MOBILE".parse::<Platform>().unwrap(), Platform::Mobile);
        assert_eq!("Bearer".parse::<AuthHeaderStyle>().unwrap(), AuthHeaderStyle::Prefixed);
        assert_eq!("es".parse::<Locale>().unwrap(), Locale::Es);
        assert!("desktop".parse::<Platform>().is_err());
    }

    #[test]
    fn parse_secs_rejects_zero_and_garbage() {
        assert_eq!(parse_secs("X", " 30 ").unwrap(), 30);
        assert!(matches!(parse_secs("X", "0"), Err(ClientError::Config(_))));
        assert!(matches!(parse_secs("X", "-5"), Err(ClientError::Config(_))));
        assert!(matches!(parse_secs("X", "soon"), Err(ClientError::Config(_))));
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("X", "yes").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
