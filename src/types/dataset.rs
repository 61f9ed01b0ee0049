//! Contains the [`Dataset`] returned by every retrieval: the flattened weather records of one
//! city, kept both as rows and as a Polars `DataFrame`.

use crate::error::{ExportError, WwoError};
use crate::types::date_range::{DateRange, DATE_FORMAT};
use crate::types::weather_record::{Scalar, WeatherRecord};
use chrono::NaiveDateTime;
use log::info;
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the timestamp column, the first column of every dataset.
pub const TIMESTAMP_COLUMN: &str = "date_time";

const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Historical weather for one city over one date range.
///
/// Rows are ordered by timestamp and unique per timestamp. The frame holds a
/// `date_time` column (`Datetime(ms)`, timezone-naive local time as reported by the
/// provider) followed by one column per attribute. A column is `Float64` when every
/// present value is numeric and `String` otherwise; missing values are null.
///
/// # Example
///
/// ```no_run
/// use wwo_hist::WwoHist;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), wwo_hist::WwoError> {
/// let client = WwoHist::new("YOUR_API_KEY");
/// let dataset = client
///     .by_attributes()
///     .attributes(&["tempC", "humidity"])
///     .city("London")
///     .start_date("2020-01-01")
///     .end_date("2020-01-02")
///     .frequency(3)
///     .call()
///     .await?;
///
/// println!("{}", dataset.frame());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    city: String,
    range: DateRange,
    columns: Vec<String>,
    records: Vec<WeatherRecord>,
    frame: DataFrame,
}

impl Dataset {
    /// Builds a dataset from records that are already ordered and unique by timestamp.
    /// Records are projected onto `columns`.
    pub(crate) fn from_records(
        city: &str,
        range: DateRange,
        columns: Vec<String>,
        records: Vec<WeatherRecord>,
    ) -> Result<Self, PolarsError> {
        let records: Vec<WeatherRecord> = records.iter().map(|r| r.project(&columns)).collect();
        let frame = build_frame(&columns, &records)?;
        Ok(Self {
            city: city.to_string(),
            range,
            columns,
            records,
            frame,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Attribute column names, without the timestamp column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Applies a Polars predicate lazily; the dataset itself is unchanged.
    pub fn filter(&self, predicate: Expr) -> LazyFrame {
        self.lazy().filter(predicate)
    }

    /// Rows with `start <= date_time <= end`.
    pub fn get_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> LazyFrame {
        self.filter(
            col(TIMESTAMP_COLUMN)
                .gt_eq(lit(start))
                .and(col(TIMESTAMP_COLUMN).lt_eq(lit(end))),
        )
    }

    /// `<city>_<start>_<end>.csv`, with the city reduced to `[A-Za-z0-9_-]`.
    pub fn export_file_name(&self) -> String {
        let city: String = self
            .city
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "{}_{}_{}.csv",
            city,
            self.range.start.format(DATE_FORMAT),
            self.range.end.format(DATE_FORMAT)
        )
    }

    /// Writes the dataset as CSV into `directory`, creating it if needed.
    ///
    /// The file is written to a temporary file in the same directory and renamed into
    /// place once complete, so a failure never leaves a truncated export behind.
    pub fn write_csv(&self, directory: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(directory)
            .map_err(|e| ExportError::CreateDir(directory.to_path_buf(), e))?;
        let target = directory.join(self.export_file_name());

        let mut temp_file = NamedTempFile::new_in(directory)
            .map_err(|e| ExportError::TempFile(directory.to_path_buf(), e))?;
        let mut frame = self.frame.clone();
        CsvWriter::new(&mut temp_file)
            .include_header(true)
            .with_datetime_format(Some(CSV_DATETIME_FORMAT.to_string()))
            .finish(&mut frame)
            .map_err(|e| ExportError::CsvWrite(target.clone(), e))?;
        temp_file
            .flush()
            .map_err(|e| ExportError::Persist(target.clone(), e))?;
        temp_file
            .persist(&target)
            .map_err(|e| ExportError::Persist(target.clone(), e.error))?;

        info!(
            "Exported {} rows for {} to {:?}",
            self.height(),
            self.city,
            target
        );
        Ok(target)
    }

    /// Reads a file written by [`Dataset::write_csv`] back into a dataset.
    ///
    /// Every cell is read as text and coerced the way provider values are, so a value
    /// comes back as the same [`Scalar`] whatever the rest of its column holds.
    pub fn read_csv(path: &Path, city: &str, range: DateRange) -> Result<Self, WwoError> {
        let csv_read = |e| ExportError::CsvRead(path.to_path_buf(), e);
        let content = |message: String| ExportError::CsvContent {
            path: path.to_path_buf(),
            message,
        };

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(csv_read)?
            .finish()
            .map_err(csv_read)?;

        let timestamps = df.column(TIMESTAMP_COLUMN).map_err(csv_read)?;
        let mut records = Vec::with_capacity(df.height());
        for value in timestamps.str().map_err(csv_read)?.into_iter() {
            let raw = value.ok_or_else(|| content("empty timestamp".to_string()))?;
            let timestamp = NaiveDateTime::parse_from_str(raw, CSV_DATETIME_FORMAT)
                .map_err(|e| content(format!("invalid timestamp '{raw}': {e}")))?;
            records.push(WeatherRecord::new(timestamp));
        }

        let columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| name != TIMESTAMP_COLUMN)
            .collect();

        for name in &columns {
            let column = df.column(name).map_err(csv_read)?;
            for (record, value) in records.iter_mut().zip(column.str().map_err(csv_read)?) {
                if let Some(scalar) = value.and_then(Scalar::from_provider_text) {
                    record.insert_if_absent(name.as_str(), scalar);
                }
            }
        }

        Ok(Self::from_records(city, range, columns, records)?)
    }
}

fn build_frame(columns: &[String], records: &[WeatherRecord]) -> PolarsResult<DataFrame> {
    let timestamps: Vec<NaiveDateTime> = records.iter().map(|r| r.timestamp).collect();
    let mut frame_columns = Vec::with_capacity(columns.len() + 1);
    frame_columns.push(Column::new(TIMESTAMP_COLUMN.into(), timestamps));

    for name in columns {
        let values: Vec<Option<&Scalar>> = records.iter().map(|r| r.get(name)).collect();
        let numeric = values
            .iter()
            .flatten()
            .all(|v| matches!(v, Scalar::Number(_)));
        let column = if numeric {
            let data: Vec<Option<f64>> = values
                .iter()
                .map(|v| v.and_then(Scalar::as_f64))
                .collect();
            Column::new(name.as_str().into(), data)
        } else {
            let data: Vec<Option<String>> =
                values.iter().map(|v| v.map(|s| s.to_string())).collect();
            Column::new(name.as_str().into(), data)
        };
        frame_columns.push(column);
    }

    DataFrame::new(frame_columns)
}
