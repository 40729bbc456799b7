use std::time::Duration;
use url::Url;

/// Base URL the REST API lives under when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:25546/api";
/// Root URL serving media and the liveness probe.
pub const DEFAULT_MEDIA_URL: &str = "http://localhost:25546";

const API_URL_VAR: &str = "AVTOSHKOLA_API_URL";
const MEDIA_URL_VAR: &str = "AVTOSHKOLA_MEDIA_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide client configuration.
///
/// The endpoints are environment-supplied at start time; there is no runtime
/// reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL the REST API lives under, without a trailing slash.
    pub api_url: Url,
    /// Root URL for media and the liveness probe.
    pub media_url: Url,
    /// Per-request timeout applied to the HTTP client.
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_url: Url, media_url: Url) -> Config {
        Config {
            api_url,
            media_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the configuration from `AVTOSHKOLA_API_URL` and
    /// `AVTOSHKOLA_MEDIA_URL`, falling back to the local development
    /// endpoints. An unparseable value falls back too, with a warning.
    pub fn from_env() -> Config {
        Config::new(
            url_from_env(API_URL_VAR, DEFAULT_API_URL),
            url_from_env(MEDIA_URL_VAR, DEFAULT_MEDIA_URL),
        )
    }

    pub fn timeout(self, timeout: Duration) -> Config {
        Config { timeout, ..self }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new(default_url(DEFAULT_API_URL), default_url(DEFAULT_MEDIA_URL))
    }
}

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("hard-coded default URL is valid")
}

fn url_from_env(var: &str, fallback: &str) -> Url {
    match std::env::var(var) {
        Ok(raw) => match Url::parse(&raw) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("Ignoring malformed {} ({}): {}", var, raw, err);
                default_url(fallback)
            }
        },
        Err(_) => default_url(fallback),
    }
}
