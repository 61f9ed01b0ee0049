use chrono::NaiveDateTime;
use std::fmt;

/// A single flattened weather value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Coerces a provider string: purely numeric text becomes a number,
    /// anything else stays text. Blank input is a missing value.
    pub fn from_provider_text(raw: &str) -> Option<Scalar> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if is_purely_numeric(trimmed) {
            if let Ok(number) = trimmed.parse::<f64>() {
                return Some(Scalar::Number(number));
            }
        }
        Some(Scalar::Text(trimmed.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

// Sign, digits and at most one decimal point. Rejects "NaN", "inf", "1e5" and times like "06:12".
fn is_purely_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut seen_digit = false;
    let mut seen_point = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}

/// One row of a dataset: a timestamp and its attribute values, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    values: Vec<(String, Scalar)>,
}

impl WeatherRecord {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            values: Vec::new(),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Scalar> {
        self.values
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value)
    }

    /// Inserts `value` unless the attribute is already set; the first value wins.
    pub fn insert_if_absent(&mut self, attribute: impl Into<String>, value: Scalar) -> bool {
        let attribute = attribute.into();
        if self.get(&attribute).is_some() {
            return false;
        }
        self.values.push((attribute, value));
        true
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> &[(String, Scalar)] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keeps only the listed attributes, in the listed order.
    pub(crate) fn project(&self, columns: &[String]) -> WeatherRecord {
        let mut projected = WeatherRecord::new(self.timestamp);
        for column in columns {
            if let Some(value) = self.get(column) {
                projected.values.push((column.clone(), value.clone()));
            }
        }
        projected
    }
}
