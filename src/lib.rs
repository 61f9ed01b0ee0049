mod catalog;
mod chunker;
mod config;
mod error;
mod flattener;
mod provider;
mod types;
mod wwo_hist;

#[cfg(test)]
mod test_support;

pub use error::{ExportError, WwoError};
pub use wwo_hist::*;

pub use catalog::AttributeCatalog;
pub use chunker::{chunk, ChunkPolicy, DateChunks, DateRangeChunker};
pub use config::{
    CatalogProbe, ClientConfig, ResponseFormat, API_KEY_ENV, BASE_URL_ENV,
    DEFAULT_ATTRIBUTE_PARAM, DEFAULT_BASE_URL, FORMAT_ENV,
};
pub use flattener::{flatten, ParseError};

pub use provider::error::ProviderError;
pub use provider::payload::{DayEntry, FieldValue, WeatherPayload};
pub use provider::request_client::WeatherRequestClient;
pub use provider::transport::{RawResponse, ReqwestTransport, Transport};

pub use types::attribute_selection::{AttributeSelection, STANDARD_ATTRIBUTES};
pub use types::dataset::{Dataset, TIMESTAMP_COLUMN};
pub use types::date_range::DateRange;
pub use types::frequency::Frequency;
pub use types::weather_record::{Scalar, WeatherRecord};
