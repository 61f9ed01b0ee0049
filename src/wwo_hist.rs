//! The main entry point: retrieves historical weather for a city from WorldWeatherOnline,
//! one chunk at a time, and assembles the chunks into a single [`Dataset`].

use crate::catalog::AttributeCatalog;
use crate::chunker::DateRangeChunker;
use crate::config::ClientConfig;
use crate::error::WwoError;
use crate::flattener::{ensure_days_covered, flatten};
use crate::provider::request_client::WeatherRequestClient;
use crate::provider::transport::{ReqwestTransport, Transport};
use crate::types::attribute_selection::AttributeSelection;
use crate::types::dataset::Dataset;
use crate::types::date_range::DateRange;
use crate::types::frequency::Frequency;
use crate::types::weather_record::WeatherRecord;
use bon::bon;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// The WorldWeatherOnline historical weather client.
///
/// Every retrieval splits the requested date range into chunks the provider accepts,
/// fetches the chunks in order, flattens the nested response into one row per time slot
/// and returns the rows as a [`Dataset`]. A retrieval fails as a whole: an error in any
/// chunk aborts it and nothing partial is returned or exported.
///
/// # Examples
///
/// ```no_run
/// # use wwo_hist::{WwoHist, WwoError};
/// # async fn run() -> Result<(), WwoError> {
/// let client = WwoHist::new("YOUR_API_KEY");
/// let dataset = client
///     .standard_dataset()
///     .city("London")
///     .start_date("2020-01-01")
///     .end_date("2020-03-31")
///     .frequency(3)
///     .call()
///     .await?;
/// println!("{}", dataset.frame());
/// # Ok(())
/// # }
/// ```
pub struct WwoHist<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl WwoHist<ReqwestTransport> {
    /// Creates a client with the default configuration and the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::builder().api_key(api_key).build())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Creates a client configured from `WWO_API_KEY`, `WWO_BASE_URL` and `WWO_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns [`WwoError::InvalidArgument`] if `WWO_API_KEY` is not set or a variable holds
    /// an unusable value.
    pub fn from_env() -> Result<Self, WwoError> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }
}

impl<T: Transport> WwoHist<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn check_attributes_known(&self, requested: &[String]) -> Result<(), WwoError> {
        let catalog = AttributeCatalog::new(&self.config, &self.transport)
            .retrieve_list_of_options(false)
            .await?;
        let unknown: Vec<String> = requested
            .iter()
            .filter(|attribute| !catalog.contains(attribute))
            .cloned()
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            warn!("Requested attributes are not offered by the provider: {unknown:?}");
            Err(WwoError::UnknownAttribute { attributes: unknown })
        }
    }
}

#[bon]
impl<T: Transport> WwoHist<T> {
    /// Lists the attribute names the provider returns for a past-weather request.
    ///
    /// Issues one probe request (see [`crate::CatalogProbe`]).
    ///
    /// # Arguments
    ///
    /// * `verbose` - Print the list to stdout. Defaults to `true`.
    ///
    /// # Errors
    ///
    /// Returns [`WwoError::Auth`] or [`WwoError::RateLimit`] when the provider rejects the
    /// probe, and [`WwoError::Provider`] when the probe fails or cannot be read.
    #[builder]
    pub async fn list_attributes(&self, verbose: Option<bool>) -> Result<Vec<String>, WwoError> {
        AttributeCatalog::new(&self.config, &self.transport)
            .retrieve_list_of_options(verbose.unwrap_or(true))
            .await
    }

    /// Retrieves the standard attribute preset ([`crate::STANDARD_ATTRIBUTES`]).
    ///
    /// Arguments and errors are those of [`WwoHist::retrieve_hist_data`].
    #[builder]
    pub async fn standard_dataset(
        &self,
        city: &str,
        start_date: &str,
        end_date: &str,
        frequency: u32,
        verbose: Option<bool>,
        csv_directory: Option<&Path>,
    ) -> Result<Dataset, WwoError> {
        self.retrieve_hist_data()
            .city(city)
            .start_date(start_date)
            .end_date(end_date)
            .frequency(frequency)
            .attributes(AttributeSelection::Standard)
            .maybe_verbose(verbose)
            .maybe_csv_directory(csv_directory)
            .call()
            .await
    }

    /// Retrieves exactly the listed attributes, in the listed order.
    ///
    /// Arguments and errors are those of [`WwoHist::retrieve_hist_data`].
    #[builder]
    pub async fn by_attributes(
        &self,
        attributes: &[&str],
        city: &str,
        start_date: &str,
        end_date: &str,
        frequency: u32,
        verbose: Option<bool>,
        csv_directory: Option<&Path>,
    ) -> Result<Dataset, WwoError> {
        self.retrieve_hist_data()
            .city(city)
            .start_date(start_date)
            .end_date(end_date)
            .frequency(frequency)
            .attributes(AttributeSelection::explicit(attributes.iter().copied()))
            .maybe_verbose(verbose)
            .maybe_csv_directory(csv_directory)
            .call()
            .await
    }

    /// Retrieves historical weather for `city` between `start_date` and `end_date`.
    ///
    /// # Arguments
    ///
    /// * `city` - Location query passed to the provider, e.g. `"London"`.
    /// * `start_date`, `end_date` - Inclusive range, `YYYY-MM-DD`. Equal dates fetch one day.
    /// * `frequency` - Hours between samples, 1 to 24. Frequencies that do not divide 24
    ///   yield `24 / frequency` (rounded down) rows per day.
    /// * `attributes` - Which columns to keep. Defaults to [`AttributeSelection::All`].
    /// * `verbose` - Print progress to stdout. Defaults to `true`.
    /// * `csv_directory` - When set, also export the dataset to
    ///   `<city>_<start>_<end>.csv` in this directory.
    ///
    /// # Returns
    ///
    /// A [`Dataset`] with rows in ascending timestamp order, one per timestamp.
    ///
    /// # Errors
    ///
    /// - [`WwoError::InvalidArgument`] for an invalid [`ClientConfig`], an empty city, an
    ///   unparseable date, a reversed range, a frequency outside 1..=24 or an empty
    ///   attribute list. No request is made.
    /// - [`WwoError::UnknownAttribute`] when an explicitly requested attribute is not in the
    ///   catalog. Only the catalog probe is requested.
    /// - [`WwoError::Auth`], [`WwoError::RateLimit`], [`WwoError::Provider`] and
    ///   [`WwoError::Parse`] from any chunk.
    /// - [`WwoError::Export`] when the CSV cannot be written.
    #[builder]
    pub async fn retrieve_hist_data(
        &self,
        city: &str,
        start_date: &str,
        end_date: &str,
        frequency: u32,
        attributes: Option<AttributeSelection>,
        verbose: Option<bool>,
        csv_directory: Option<&Path>,
    ) -> Result<Dataset, WwoError> {
        let verbose = verbose.unwrap_or(true);
        let selection = attributes.unwrap_or_default();

        self.config.validate()?;
        if city.trim().is_empty() {
            return Err(WwoError::invalid_argument("city cannot be empty"));
        }
        let range = DateRange::parse(start_date, end_date)?;
        let frequency = Frequency::new(frequency)?;
        if !frequency.divides_day() {
            warn!(
                "Frequency of {frequency} does not divide a day, keeping {} slots per day",
                frequency.slots_per_day()
            );
        }
        if let AttributeSelection::Explicit(requested) = &selection {
            if requested.is_empty() {
                return Err(WwoError::invalid_argument("attribute list cannot be empty"));
            }
            if self.config.validate_attributes {
                self.check_attributes_known(requested).await?;
            }
        }

        if verbose {
            println!("\n\nRetrieving weather data for {city}\n\n");
        }
        let started = Instant::now();
        let chunker = DateRangeChunker::new(range.start, range.end, self.config.chunk_policy)?;
        let client = WeatherRequestClient::new(&self.config, &self.transport);

        let mut records = Vec::new();
        for chunk in &chunker {
            let payload = client.fetch(city, chunk, &selection, frequency, verbose).await?;
            let chunk_records = flatten(&payload, frequency)?;
            ensure_days_covered(&chunk_records, chunk)?;
            info!("Fetched {chunk} for {city}: {} records", chunk_records.len());
            records.extend(chunk_records);
            if verbose {
                println!("Time elapsed: {:.2?}", started.elapsed());
            }
        }

        let records = merge_chunks(records, range);
        let columns = selection.columns(&seen_attributes(&records));
        let dataset = Dataset::from_records(city, range, columns, records)?;
        info!(
            "Retrieved {} rows of {} attributes for {city} ({range})",
            dataset.height(),
            dataset.columns().len()
        );

        if let Some(directory) = csv_directory {
            let path = dataset.write_csv(directory)?;
            if verbose {
                println!("\n\nexport {city} completed: {}\n\n", path.display());
            }
        }
        Ok(dataset)
    }
}

/// Keeps the first record of every timestamp inside `range`, sorted by timestamp.
fn merge_chunks(records: Vec<WeatherRecord>, range: DateRange) -> Vec<WeatherRecord> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let mut merged: Vec<WeatherRecord> = records
        .into_iter()
        .filter(|record| range.contains(record.timestamp.date()))
        .filter(|record| seen.insert(record.timestamp))
        .collect();
    if merged.len() < total {
        debug!(
            "Dropped {} records outside {range} or with repeated timestamps",
            total - merged.len()
        );
    }
    merged.sort_by_key(|record| record.timestamp);
    merged
}

/// Attribute names in first-seen order across all records.
fn seen_attributes(records: &[WeatherRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        for attribute in record.attributes() {
            if !seen.iter().any(|known| known == attribute) {
                seen.push(attribute.to_string());
            }
        }
    }
    seen
}
