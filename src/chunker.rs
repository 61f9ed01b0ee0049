//! Splits a requested date range into the sub-ranges the provider accepts per request.

use crate::error::WwoError;
use crate::types::date_range::DateRange;
use crate::types::utils::month_end;
use chrono::{Days, NaiveDate};

/// How a date range is cut into per-request chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChunkPolicy {
    /// One chunk per calendar month (clipped to the range). WorldWeatherOnline requires
    /// `date` and `enddate` to fall in the same month.
    #[default]
    CalendarMonth,
    /// Chunks of at most this many days.
    MaxSpanDays(u32),
}

/// A restartable source of chunks: every call to [`DateRangeChunker::iter`] starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeChunker {
    range: DateRange,
    policy: ChunkPolicy,
}

impl DateRangeChunker {
    /// Fails with [`WwoError::InvalidRange`] when `start > end` and with
    /// [`WwoError::InvalidArgument`] for a zero-day span.
    pub fn new(start: NaiveDate, end: NaiveDate, policy: ChunkPolicy) -> Result<Self, WwoError> {
        let range = DateRange::new(start, end)?;
        if policy == ChunkPolicy::MaxSpanDays(0) {
            return Err(WwoError::invalid_argument(
                "chunk span must be at least one day",
            ));
        }
        Ok(Self { range, policy })
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn iter(&self) -> DateChunks {
        DateChunks {
            cursor: Some(self.range.start),
            end: self.range.end,
            policy: self.policy,
        }
    }
}

impl IntoIterator for &DateRangeChunker {
    type Item = DateRange;
    type IntoIter = DateChunks;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazily yields contiguous, non-overlapping chunks covering the range exactly once.
#[derive(Debug, Clone)]
pub struct DateChunks {
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    policy: ChunkPolicy,
}

impl Iterator for DateChunks {
    type Item = DateRange;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        let limit = match self.policy {
            ChunkPolicy::MaxSpanDays(days) => {
                cursor.checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            }
            ChunkPolicy::CalendarMonth => month_end(cursor),
        };
        let chunk_end = limit.map_or(self.end, |limit| limit.min(self.end));
        self.cursor = chunk_end.succ_opt().filter(|next| *next <= self.end);
        Some(DateRange {
            start: cursor,
            end: chunk_end,
        })
    }
}

/// Chunks `[start, end]` into spans of at most `max_span_days` days.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wwo_hist::chunk;
///
/// let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
/// let chunks: Vec<_> = chunk(start, end, 4).unwrap().collect();
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].start, NaiveDate::from_ymd_opt(2020, 1, 9).unwrap());
/// assert_eq!(chunks[2].end, end);
/// ```
pub fn chunk(start: NaiveDate, end: NaiveDate, max_span_days: u32) -> Result<DateChunks, WwoError> {
    Ok(DateRangeChunker::new(start, end, ChunkPolicy::MaxSpanDays(max_span_days))?.iter())
}
