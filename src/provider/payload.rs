//! Typed view of a past-weather response, shared by the JSON and XML formats.

use crate::config::ResponseFormat;
use crate::error::WwoError;
use crate::provider::error::{classify_provider_message, ProviderError};
use crate::provider::xml::xml_to_json;
use serde::Deserialize;
use serde_json::Value;

/// A provider field value before flattening.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<FieldValue>),
    Group(Vec<(String, FieldValue)>),
    Null,
}

impl FieldValue {
    pub(crate) fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from_json).collect())
            }
            Value::Object(map) => FieldValue::Group(
                map.into_iter()
                    .map(|(key, value)| (key, FieldValue::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// A list as-is, a single value as a one-element list. XML has no way to tell the two
    /// apart when an element occurs once.
    pub(crate) fn into_list(self) -> Vec<FieldValue> {
        match self {
            FieldValue::List(items) => items,
            FieldValue::Null => Vec::new(),
            other => vec![other],
        }
    }

    /// Plain text of a leaf, looking through `[{"value": ...}]` wrappers.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::List(items) => items.first().and_then(FieldValue::as_text),
            FieldValue::Group(fields) => match fields.as_slice() {
                [(name, value)] if name == "value" => value.as_text(),
                _ => None,
            },
            FieldValue::Null => None,
        }
    }
}

/// One entry of the `weather` array: a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub date: Option<String>,
    /// Per-day fields other than `date`, `astronomy` and `hourly`, in response order.
    pub scalars: Vec<(String, FieldValue)>,
    pub astronomy: Vec<FieldValue>,
    /// `None` when the day has no `hourly` section at all.
    pub hourly: Option<Vec<FieldValue>>,
}

impl DayEntry {
    fn from_field(value: FieldValue) -> Result<Self, ProviderError> {
        let FieldValue::Group(fields) = value else {
            return Err(ProviderError::UnexpectedPayload(
                "'weather' entry is not an object".to_string(),
            ));
        };
        let mut entry = DayEntry {
            date: None,
            scalars: Vec::new(),
            astronomy: Vec::new(),
            hourly: None,
        };
        for (name, value) in fields {
            match name.as_str() {
                "date" => entry.date = value.as_text(),
                "astronomy" => entry.astronomy = value.into_list(),
                "hourly" => entry.hourly = Some(value.into_list()),
                _ => entry.scalars.push((name, value)),
            }
        }
        Ok(entry)
    }
}

/// A decoded success response. `weather` is `None` when the section is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload {
    pub weather: Option<Vec<DayEntry>>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    weather: Option<Value>,
}

impl WeatherPayload {
    /// Decodes a response body.
    ///
    /// An `error` section in the envelope is classified into [`WwoError::Auth`],
    /// [`WwoError::RateLimit`] or [`WwoError::Provider`].
    pub fn decode(body: &str, format: ResponseFormat) -> Result<Self, WwoError> {
        let envelope = parse_envelope(body, format)?;
        let data = envelope.data.ok_or_else(|| {
            ProviderError::UnexpectedPayload("response has no 'data' envelope".to_string())
        })?;

        let messages = data.error.map(error_messages).unwrap_or_default();
        if !messages.is_empty() {
            return Err(classify_provider_message(&messages.join("; ")));
        }

        let weather = match data.weather {
            Some(weather) => Some(
                FieldValue::from_json(weather)
                    .into_list()
                    .into_iter()
                    .map(DayEntry::from_field)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        Ok(Self { weather })
    }
}

/// Error messages in a body, if it can be read as an envelope at all.
pub(crate) fn provider_error_messages(body: &str, format: ResponseFormat) -> Vec<String> {
    parse_envelope(body, format)
        .ok()
        .and_then(|envelope| envelope.data)
        .and_then(|data| data.error)
        .map(error_messages)
        .unwrap_or_default()
}

fn parse_envelope(body: &str, format: ResponseFormat) -> Result<Envelope, ProviderError> {
    let value = match format {
        ResponseFormat::Json => serde_json::from_str::<Value>(body)?,
        ResponseFormat::Xml => xml_to_json(body)?,
    };
    Ok(serde_json::from_value(value)?)
}

fn error_messages(error: Value) -> Vec<String> {
    FieldValue::from_json(error)
        .into_list()
        .into_iter()
        .filter_map(|entry| match entry {
            FieldValue::Group(fields) => fields
                .into_iter()
                .find(|(name, _)| name == "msg")
                .and_then(|(_, msg)| msg.as_text()),
            other => other.as_text(),
        })
        .filter(|msg| !msg.trim().is_empty())
        .collect()
}
