use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PAGE_SIZE: usize = 3;
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1000;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: usize,
    pub redirect_delay: Duration,
    pub timeout: Option<Duration>,
    pub access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            timeout: None,
            access_token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    pub fn new_from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("COURSE_API_URL") {
            config.base_url = parse_base_url("COURSE_API_URL", &url)?;
        }

        if let Some(size) = parse_var::<usize>(&lookup, "COURSE_PAGE_SIZE")? {
            if size == 0 {
                return Err(ClientError::Config("COURSE_PAGE_SIZE must be at least 1".to_string()));
            }
            config.page_size = size;
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "COURSE_REDIRECT_DELAY_MS")? {
            config.redirect_delay = Duration::from_millis(ms);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "COURSE_HTTP_TIMEOUT_SECS")? {
            config.timeout = Some(Duration::from_secs(secs));
        }

        config.access_token = lookup("COURSE_API_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    /// Replace the backend url, checked like `COURSE_API_URL`.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ClientError> {
        self.base_url = parse_base_url("base url", url)?;
        Ok(self)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ClientError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{} is not a valid number: {}", key, raw))),
    }
}

fn parse_base_url(source: &str, url: &str) -> Result<String, ClientError> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::Config(format!(
            "{} must be an http(s) url, got {}",
            source, url
        )));
    }
    Ok(trim_base_url(url))
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
