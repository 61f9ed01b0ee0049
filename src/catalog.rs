use crate::config::ClientConfig;
use crate::error::WwoError;
use crate::flattener::attribute_names;
use crate::provider::error::ProviderError;
use crate::provider::payload::WeatherPayload;
use crate::provider::request_client::WeatherRequestClient;
use crate::provider::transport::Transport;
use crate::types::attribute_selection::AttributeSelection;
use crate::types::date_range::DateRange;
use crate::types::frequency::Frequency;
use log::info;

/// Discovers which attribute names the provider returns.
pub struct AttributeCatalog<'a, T> {
    config: &'a ClientConfig,
    transport: &'a T,
}

impl<'a, T: Transport> AttributeCatalog<'a, T> {
    pub fn new(config: &'a ClientConfig, transport: &'a T) -> Self {
        Self { config, transport }
    }

    /// Issues the configured probe request and returns the attribute names it flattens to:
    /// per-day values, then astronomy, then per-slot measurements.
    pub async fn retrieve_list_of_options(&self, verbose: bool) -> Result<Vec<String>, WwoError> {
        let probe = &self.config.catalog_probe;
        let range = DateRange::parse(&probe.start_date, &probe.end_date)?;
        let frequency = Frequency::new(probe.frequency)?;

        let payload = WeatherRequestClient::new(self.config, self.transport)
            .fetch(&probe.city, range, &AttributeSelection::All, frequency, false)
            .await?;
        let attributes = catalog_from_payload(&payload)?;
        info!("Provider offers {} weather attributes", attributes.len());

        if verbose {
            println!("Available weather attributes:");
            for attribute in &attributes {
                println!("  {attribute}");
            }
        }
        Ok(attributes)
    }
}

fn catalog_from_payload(payload: &WeatherPayload) -> Result<Vec<String>, ProviderError> {
    let day = payload
        .weather
        .as_ref()
        .and_then(|days| days.first())
        .ok_or_else(|| {
            ProviderError::UnexpectedPayload("catalog probe returned no weather".to_string())
        })?;
    attribute_names(day).map_err(|e| ProviderError::UnexpectedPayload(e.to_string()))
}
