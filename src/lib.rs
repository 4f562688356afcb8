//! Client for the Civo cloud API.
//!
//! Covers the template resource, used to describe the bootable images that
//! instances are created from. Responses are passed through as raw JSON.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

pub mod filter;
pub mod templates;

pub const DEFAULT_API_URL: &str = "https://api.civo.com/v2";

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_url")]
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            token: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    fn default_url() -> String {
        String::from(DEFAULT_API_URL)
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn build(&self) -> Client {
        tracing::debug!("building client for {}", self.url);
        let mut headers: HeaderMap = self
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                    reqwest::header::HeaderValue::from_bytes(value.as_bytes()).unwrap(),
                )
            })
            .collect();
        if let Some(ref token) = self.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_bytes(format!("bearer {token}").as_bytes()).unwrap(),
            );
        }
        Client {
            http: reqwest::Client::new(),
            url: self.url.clone(),
            headers,
        }
    }
}

impl From<Config> for Client {
    fn from(value: Config) -> Self {
        value.build()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to build request url: {0:?}")]
    UrlInvalid(url::ParseError),
    #[error("Unable to read cloud config file: {0:?}")]
    CloudConfigUnreadable(std::io::Error),
    #[error("Unable to execute request: {0:?}")]
    RequestFailed(reqwest::Error),
    #[error("Unable to decode response body: {0:?}")]
    ResponseInvalid(reqwest::Error),
    #[error("Invalid filter {0:?}, expected a \"key:value\" pair")]
    FilterInvalid(String),
}

/// Entry point holding the shared http client, the base url and the
/// outbound headers. Cheap to clone, nothing mutable is shared.
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
}

impl Client {
    pub fn new(token: impl Into<String>) -> Self {
        Config::new(token).build()
    }

    pub fn templates(&self) -> templates::Templates<'_> {
        templates::Templates::new(self)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::Config;

    #[test]
    fn default_config_points_at_api() {
        assert_eq!(Config::default().url, "https://api.civo.com/v2");
    }

    #[test]
    fn build_sets_bearer_header() {
        let client = Config::new("secret-token").build();
        assert_eq!(
            client.headers.get(AUTHORIZATION).unwrap(),
            "bearer secret-token"
        );
    }

    #[test]
    fn build_keeps_extra_headers() {
        let config = Config {
            headers: [(String::from("x-request-source"), String::from("cli"))]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let client = config.build();
        assert_eq!(client.headers.get("x-request-source").unwrap(), "cli");
        assert!(client.headers.get(AUTHORIZATION).is_none());
    }
}
