use crate::config::ClientConfig;
use crate::error::WwoError;
use crate::provider::error::{classify_provider_message, ProviderError};
use crate::provider::payload::{provider_error_messages, WeatherPayload};
use crate::provider::transport::Transport;
use crate::types::attribute_selection::AttributeSelection;
use crate::types::date_range::{DateRange, DATE_FORMAT};
use crate::types::frequency::Frequency;
use log::{debug, warn};

/// Performs one past-weather request per call.
pub struct WeatherRequestClient<'a, T> {
    config: &'a ClientConfig,
    transport: &'a T,
}

impl<'a, T: Transport> WeatherRequestClient<'a, T> {
    pub fn new(config: &'a ClientConfig, transport: &'a T) -> Self {
        Self { config, transport }
    }

    /// Fetches one chunk. `range` must fit in a single provider request.
    ///
    /// HTTP 401/403 map to [`WwoError::Auth`], 429 to [`WwoError::RateLimit`]. Error
    /// messages inside a response are classified the same way.
    pub async fn fetch(
        &self,
        city: &str,
        range: DateRange,
        selection: &AttributeSelection,
        frequency: Frequency,
        verbose: bool,
    ) -> Result<WeatherPayload, WwoError> {
        if verbose {
            println!("Currently retrieving data for {city}: from {} to {}", range.start, range.end);
        }
        debug!("Requesting {city} {range} every {frequency}");

        let query = self.query(city, range, selection, frequency);
        let response = self.transport.get(&self.config.base_url, &query).await?;
        if (200..300).contains(&response.status) {
            return WeatherPayload::decode(&response.body, self.config.format);
        }

        let messages = provider_error_messages(&response.body, self.config.format);
        let message = if messages.is_empty() {
            format!("HTTP status {}", response.status)
        } else {
            messages.join("; ")
        };
        warn!("Request for {city} {range} failed with status {}: {message}", response.status);

        match response.status {
            401 | 403 => Err(WwoError::Auth { message }),
            429 => Err(WwoError::RateLimit { message }),
            status => match classify_provider_message(&message) {
                WwoError::Provider(_) => Err(ProviderError::HttpStatus {
                    url: self.config.base_url.clone(),
                    status,
                    body: message,
                }
                .into()),
                classified => Err(classified),
            },
        }
    }

    pub(crate) fn query(
        &self,
        city: &str,
        range: DateRange,
        selection: &AttributeSelection,
        frequency: Frequency,
    ) -> Vec<(&'a str, String)> {
        let mut query = vec![
            ("key", self.config.api_key.clone()),
            ("q", city.to_string()),
            ("format", self.config.format.as_query_value().to_string()),
            ("date", range.start.format(DATE_FORMAT).to_string()),
            ("enddate", range.end.format(DATE_FORMAT).to_string()),
            ("tp", frequency.hours().to_string()),
        ];
        if self.config.encode_attribute_filter {
            if let Some(attributes) = selection.request_filter() {
                query.push((self.config.attribute_param.as_str(), attributes.join(",")));
            }
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseFormat;
    use crate::test_support::{status, MockTransport};
    use chrono::NaiveDate;

    fn january() -> DateRange {
        DateRange::parse("2020-01-01", "2020-01-02").unwrap()
    }

    fn config() -> ClientConfig {
        ClientConfig::builder().api_key("secret").build()
    }

    #[test]
    fn test_query_parameters() {
        let config = config();
        let transport = MockTransport::serving_history();
        let client = WeatherRequestClient::new(&config, &transport);
        let frequency = Frequency::new(3).unwrap();

        let query = client.query("London", january(), &AttributeSelection::Standard, frequency);
        assert_eq!(
            query,
            vec![
                ("key", "secret".to_string()),
                ("q", "London".to_string()),
                ("format", "json".to_string()),
                ("date", "2020-01-01".to_string()),
                ("enddate", "2020-01-02".to_string()),
                ("tp", "3".to_string()),
            ]
        );

        let explicit = AttributeSelection::explicit(["tempC", "humidity"]);
        let query = client.query("London", january(), &explicit, frequency);
        assert_eq!(query.last(), Some(&("attributes", "tempC,humidity".to_string())));
    }

    #[test]
    fn test_attribute_filter_can_be_disabled_or_renamed() {
        let explicit = AttributeSelection::explicit(["tempC"]);
        let frequency = Frequency::new(1).unwrap();
        let transport = MockTransport::serving_history();

        let disabled = ClientConfig::builder()
            .api_key("secret")
            .encode_attribute_filter(false)
            .build();
        let query = WeatherRequestClient::new(&disabled, &transport).query("Paris", january(), &explicit, frequency);
        assert_eq!(query.len(), 6);

        let renamed = ClientConfig::builder()
            .api_key("secret")
            .attribute_param("fields")
            .build();
        let query = WeatherRequestClient::new(&renamed, &transport).query("Paris", january(), &explicit, frequency);
        assert_eq!(query.last(), Some(&("fields", "tempC".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_decodes_success() {
        let config = config();
        let transport = MockTransport::serving_history();
        let client = WeatherRequestClient::new(&config, &transport);

        let payload = client
            .fetch("London", january(), &AttributeSelection::All, Frequency::new(24).unwrap(), false)
            .await
            .unwrap();
        let days = payload.weather.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date.as_deref(), Some("2020-01-02"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_status_classification() {
        let config = config();
        let frequency = Frequency::new(24).unwrap();

        let cases: [(u16, &str); 5] = [
            (401, ""),
            (403, r#"{"data":{"error":[{"msg":"API key is invalid"}]}}"#),
            (429, ""),
            (500, "upstream failure"),
            (400, r#"{"data":{"error":[{"msg":"API key has reached calls per day allowed limit."}]}}"#),
        ];
        for (code, body) in cases {
            let transport = MockTransport::new(move |_| status(code, body));
            let client = WeatherRequestClient::new(&config, &transport);
            let result = client
                .fetch("London", january(), &AttributeSelection::All, frequency, false)
                .await;
            match code {
                401 | 403 => assert!(matches!(result, Err(WwoError::Auth { .. })), "{code}"),
                429 | 400 => assert!(matches!(result, Err(WwoError::RateLimit { .. })), "{code}"),
                _ => assert!(
                    matches!(
                        result,
                        Err(WwoError::Provider(ProviderError::HttpStatus { status: 500, .. }))
                    ),
                    "{code}"
                ),
            }
        }
    }

    #[tokio::test]
    async fn test_error_never_contains_api_key() {
        let config = config();
        let transport = MockTransport::new(|_| status(502, "bad gateway"));
        let client = WeatherRequestClient::new(&config, &transport);
        let error = client
            .fetch("London", january(), &AttributeSelection::All, Frequency::new(1).unwrap(), false)
            .await
            .unwrap_err();
        assert!(!error.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_fetch_xml() {
        let config = ClientConfig::builder()
            .api_key("secret")
            .format(ResponseFormat::Xml)
            .build();
        let transport = MockTransport::serving_history();
        let client = WeatherRequestClient::new(&config, &transport);
        let start = NaiveDate::from_ymd_opt(2020, 2, 28).unwrap();
        let range = DateRange::new(start, start.succ_opt().unwrap()).unwrap();

        let payload = client
            .fetch("London", range, &AttributeSelection::All, Frequency::new(6).unwrap(), false)
            .await
            .unwrap();
        assert_eq!(payload.weather.map(|days| days.len()), Some(2));
        assert_eq!(transport.calls()[0]["format"], "xml");
    }
}
