//! Which weather attributes a retrieval keeps.

/// The attribute columns of a standard retrieval, in output order.
///
/// Per-day values come first, then astronomy, then the per-slot measurements.
pub const STANDARD_ATTRIBUTES: [&str; 23] = [
    "maxtempC",
    "mintempC",
    "totalSnow_cm",
    "sunHour",
    "uvIndex",
    "moon_illumination",
    "moonrise",
    "moonset",
    "sunrise",
    "sunset",
    "DewPointC",
    "FeelsLikeC",
    "HeatIndexC",
    "WindChillC",
    "WindGustKmph",
    "cloudcover",
    "humidity",
    "precipMM",
    "pressure",
    "tempC",
    "visibility",
    "winddirDegree",
    "windspeedKmph",
];

/// Attribute-selection policy of a retrieval.
///
/// `All` and `Standard` leave the request unfiltered (the provider returns every
/// attribute); `Explicit` sends the list to the provider and keeps only those columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeSelection {
    /// Every attribute the provider returns, in first-seen order.
    #[default]
    All,
    /// The [`STANDARD_ATTRIBUTES`] preset.
    Standard,
    /// A caller-chosen list, kept in the given order.
    Explicit(Vec<String>),
}

impl AttributeSelection {
    pub fn explicit<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Explicit(attributes.into_iter().map(Into::into).collect())
    }

    /// Attributes to encode in the request, `None` for the provider default.
    pub(crate) fn request_filter(&self) -> Option<&[String]> {
        match self {
            AttributeSelection::Explicit(list) => Some(list),
            AttributeSelection::All | AttributeSelection::Standard => None,
        }
    }

    /// Output columns given the attribute names seen in the flattened rows.
    pub(crate) fn columns(&self, seen: &[String]) -> Vec<String> {
        match self {
            AttributeSelection::All => seen.to_vec(),
            AttributeSelection::Standard => {
                STANDARD_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
            }
            AttributeSelection::Explicit(list) => {
                let mut columns: Vec<String> = Vec::with_capacity(list.len());
                for name in list {
                    if !columns.contains(name) {
                        columns.push(name.clone());
                    }
                }
                columns
            }
        }
    }
}
