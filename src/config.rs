//! Explicit configuration of a [`crate::WwoHist`] client. Nothing here is global: every
//! client carries its own copy.

use crate::chunker::ChunkPolicy;
use crate::error::WwoError;
use bon::Builder;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://api.worldweatheronline.com/premium/v1/past-weather.ashx";
pub const DEFAULT_ATTRIBUTE_PARAM: &str = "attributes";

pub const API_KEY_ENV: &str = "WWO_API_KEY";
pub const BASE_URL_ENV: &str = "WWO_BASE_URL";
pub const FORMAT_ENV: &str = "WWO_FORMAT";

/// Body format requested from the provider (the `format` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub(crate) fn as_query_value(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_query_value())
    }
}

impl FromStr for ResponseFormat {
    type Err = WwoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            other => Err(WwoError::invalid_argument(format!(
                "unsupported response format '{other}', expected 'json' or 'xml'"
            ))),
        }
    }
}

/// The fixed request used to discover the attribute catalog.
///
/// The provider has no metadata endpoint, so the catalog is read from the field names
/// of a small past-weather response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProbe {
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    pub frequency: u32,
}

impl Default for CatalogProbe {
    fn default() -> Self {
        Self {
            city: "London".to_string(),
            start_date: "2020-01-01".to_string(),
            end_date: "2020-01-02".to_string(),
            frequency: 1,
        }
    }
}

/// Client configuration.
///
/// # Examples
///
/// ```
/// use wwo_hist::{ChunkPolicy, ClientConfig, ResponseFormat};
///
/// let config = ClientConfig::builder()
///     .api_key("my-key")
///     .format(ResponseFormat::Xml)
///     .chunk_policy(ChunkPolicy::MaxSpanDays(7))
///     .build();
/// assert_eq!(config.format, ResponseFormat::Xml);
/// assert!(config.validate_attributes);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClientConfig {
    /// Static API key, sent as the `key` query parameter.
    #[builder(into)]
    pub api_key: String,
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default)]
    pub format: ResponseFormat,
    #[builder(default)]
    pub chunk_policy: ChunkPolicy,
    /// Check explicitly requested attributes against the catalog before fetching.
    #[builder(default = true)]
    pub validate_attributes: bool,
    /// Send explicit attribute lists to the provider under `attribute_param`.
    #[builder(default = true)]
    pub encode_attribute_filter: bool,
    #[builder(into, default = DEFAULT_ATTRIBUTE_PARAM.to_string())]
    pub attribute_param: String,
    #[builder(default)]
    pub catalog_probe: CatalogProbe,
}

impl ClientConfig {
    /// Reads `WWO_API_KEY` (required), `WWO_BASE_URL` and `WWO_FORMAT`.
    pub fn from_env() -> Result<Self, WwoError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| WwoError::invalid_argument(format!("{API_KEY_ENV} is not set")))?;
        let mut config = ClientConfig::builder().api_key(api_key).build();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(format) = std::env::var(FORMAT_ENV) {
            config.format = format.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WwoError> {
        if self.api_key.trim().is_empty() {
            return Err(WwoError::invalid_argument("api_key cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(WwoError::invalid_argument(format!(
                "base_url '{}' must be an HTTP or HTTPS URL",
                self.base_url
            )));
        }
        if self.encode_attribute_filter && self.attribute_param.trim().is_empty() {
            return Err(WwoError::invalid_argument(
                "attribute_param cannot be empty while encode_attribute_filter is set",
            ));
        }
        if self.chunk_policy == ChunkPolicy::MaxSpanDays(0) {
            return Err(WwoError::invalid_argument(
                "chunk policy span must be at least one day",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::builder().api_key("key").build();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.format, ResponseFormat::Json);
        assert_eq!(config.chunk_policy, ChunkPolicy::CalendarMonth);
        assert!(config.validate_attributes);
        assert!(config.encode_attribute_filter);
        assert_eq!(config.attribute_param, "attributes");
        assert_eq!(config.catalog_probe.city, "London");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let empty_key = ClientConfig::builder().api_key("  ").build();
        assert!(matches!(
            empty_key.validate(),
            Err(WwoError::InvalidArgument { .. })
        ));

        let bad_url = ClientConfig::builder()
            .api_key("key")
            .base_url("ftp://example.com")
            .build();
        assert!(bad_url.validate().is_err());

        let zero_span = ClientConfig::builder()
            .api_key("key")
            .chunk_policy(ChunkPolicy::MaxSpanDays(0))
            .build();
        assert!(zero_span.validate().is_err());
    }

    #[test]
    fn test_response_format_parsing() {
        assert_eq!("XML".parse::<ResponseFormat>().unwrap(), ResponseFormat::Xml);
        assert_eq!(" json ".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert!("csv".parse::<ResponseFormat>().is_err());
        assert_eq!(ResponseFormat::Xml.to_string(), "xml");
    }

    #[test]
    fn test_from_env() {
        env::set_var(API_KEY_ENV, "key_from_env");
        env::set_var(FORMAT_ENV, "xml");
        env::set_var(BASE_URL_ENV, "http://localhost:8080/past-weather.ashx");

        let config = ClientConfig::from_env();

        env::remove_var(API_KEY_ENV);
        env::remove_var(FORMAT_ENV);
        env::remove_var(BASE_URL_ENV);

        let config = config.unwrap();
        assert_eq!(config.api_key, "key_from_env");
        assert_eq!(config.format, ResponseFormat::Xml);
        assert_eq!(config.base_url, "http://localhost:8080/past-weather.ashx");
    }
}
