//! Turns the nested per-day, per-slot response into flat timestamped records.
//!
//! Naming: per-day fields and astronomy fields keep their own names, `[{"value": x}]`
//! wrappers collapse onto the parent name and any other nested field becomes
//! `parent_child`. When a name occurs twice in one record the first occurrence wins, so a
//! per-day value shadows a per-slot value of the same name.

use crate::provider::payload::{DayEntry, FieldValue, WeatherPayload};
use crate::types::date_range::{DateRange, DATE_FORMAT};
use crate::types::frequency::Frequency;
use crate::types::weather_record::{Scalar, WeatherRecord};
use chrono::{NaiveDate, NaiveTime};
use log::warn;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response has no 'weather' section")]
    MissingWeather,

    #[error("Response for {range} has no records for {} day(s): {missing:?}", .missing.len())]
    MissingDays {
        range: DateRange,
        missing: Vec<NaiveDate>,
    },

    #[error("Day entry {index} has no valid date: {value:?}")]
    InvalidDate { index: usize, value: Option<String> },

    #[error("Day {date} has no '{section}' section")]
    MissingSection {
        date: NaiveDate,
        section: &'static str,
    },

    #[error("Slot {slot} of {date} is not an object")]
    MalformedSlot { date: NaiveDate, slot: usize },

    #[error("Slot {slot} of {date} has no 'time' field")]
    MissingSlotTime { date: NaiveDate, slot: usize },

    #[error("Slot time '{value}' of {date} is not a valid HHMM time")]
    InvalidSlotTime { date: NaiveDate, value: String },

    #[error("Slot time {time} occurs twice on {date}")]
    DuplicateSlot { date: NaiveDate, time: NaiveTime },
}

/// Flattens every day of `payload` into one record per slot, at most
/// `frequency.slots_per_day()` slots per day.
pub fn flatten(payload: &WeatherPayload, frequency: Frequency) -> Result<Vec<WeatherRecord>, ParseError> {
    let days = match payload.weather.as_deref() {
        Some(days) if !days.is_empty() => days,
        _ => return Err(ParseError::MissingWeather),
    };
    let slots_per_day = frequency.slots_per_day();
    let mut records = Vec::with_capacity(days.len() * slots_per_day);

    for (index, day) in days.iter().enumerate() {
        let date = day_date(index, day)?;
        let slots = day_slots(date, day)?;
        if slots.len() > slots_per_day {
            warn!(
                "{date}: provider returned {} slots, keeping the first {slots_per_day} for {frequency}",
                slots.len()
            );
        }

        let day_values = day_values(day);
        let mut seen_times: Vec<NaiveTime> = Vec::with_capacity(slots_per_day);
        for (slot_index, slot) in slots.iter().take(slots_per_day).enumerate() {
            let FieldValue::Group(fields) = slot else {
                return Err(ParseError::MalformedSlot {
                    date,
                    slot: slot_index,
                });
            };
            let time = slot_time(date, slot_index, fields)?;
            if seen_times.contains(&time) {
                return Err(ParseError::DuplicateSlot { date, time });
            }
            seen_times.push(time);

            let mut record = WeatherRecord::new(date.and_time(time));
            for (name, value) in &day_values {
                record.insert_if_absent(name.as_str(), value.clone());
            }
            for (name, value) in slot_values(fields) {
                record.insert_if_absent(name, value);
            }
            records.push(record);
        }
    }
    Ok(records)
}

/// Fails unless every date of `range` has at least one record.
pub(crate) fn ensure_days_covered(records: &[WeatherRecord], range: DateRange) -> Result<(), ParseError> {
    let covered: HashSet<NaiveDate> = records.iter().map(|r| r.timestamp.date()).collect();
    let missing: Vec<NaiveDate> = range
        .start
        .iter_days()
        .take_while(|date| *date <= range.end)
        .filter(|date| !covered.contains(date))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::MissingDays { range, missing })
    }
}

/// Names a day and one of its slots flatten to, in record order.
pub(crate) fn attribute_names(day: &DayEntry) -> Result<Vec<String>, ParseError> {
    let date = day_date(0, day)?;
    let slot = day_slots(date, day)?
        .first()
        .ok_or(ParseError::MissingSection {
            date,
            section: "hourly",
        })?;
    let FieldValue::Group(fields) = slot else {
        return Err(ParseError::MalformedSlot { date, slot: 0 });
    };

    let mut names: Vec<String> = Vec::new();
    let all = day_values(day).into_iter().chain(slot_values(fields));
    for (name, _) in all {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

fn day_date(index: usize, day: &DayEntry) -> Result<NaiveDate, ParseError> {
    day.date
        .as_deref()
        .and_then(|value| NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok())
        .ok_or_else(|| ParseError::InvalidDate {
            index,
            value: day.date.clone(),
        })
}

fn day_slots(date: NaiveDate, day: &DayEntry) -> Result<&[FieldValue], ParseError> {
    match day.hourly.as_deref() {
        Some(slots) if !slots.is_empty() => Ok(slots),
        _ => Err(ParseError::MissingSection {
            date,
            section: "hourly",
        }),
    }
}

fn day_values(day: &DayEntry) -> Vec<(String, Scalar)> {
    let mut values = Vec::new();
    for (name, value) in &day.scalars {
        flatten_value(name, value, &mut values);
    }
    for entry in &day.astronomy {
        match entry {
            FieldValue::Group(fields) => {
                for (name, value) in fields {
                    flatten_value(name, value, &mut values);
                }
            }
            other => flatten_value("astronomy", other, &mut values),
        }
    }
    values
}

fn slot_values(fields: &[(String, FieldValue)]) -> Vec<(String, Scalar)> {
    let mut values = Vec::new();
    for (name, value) in fields.iter().filter(|(name, _)| name != "time") {
        flatten_value(name, value, &mut values);
    }
    values
}

fn flatten_value(name: &str, value: &FieldValue, out: &mut Vec<(String, Scalar)>) {
    match value {
        FieldValue::Text(text) => {
            if let Some(scalar) = Scalar::from_provider_text(text) {
                out.push((name.to_string(), scalar));
            }
        }
        FieldValue::Number(number) => out.push((name.to_string(), Scalar::Number(*number))),
        FieldValue::Null => {}
        // Provider lists hold a single entry.
        FieldValue::List(items) => {
            if items.len() > 1 {
                warn!("'{name}' holds {} entries, keeping the first", items.len());
            }
            if let Some(first) = items.first() {
                flatten_value(name, first, out);
            }
        }
        FieldValue::Group(children) => match children.as_slice() {
            [(child, inner)] if child == "value" => flatten_value(name, inner, out),
            _ => {
                for (child, inner) in children {
                    flatten_value(&format!("{name}_{child}"), inner, out);
                }
            }
        },
    }
}

/// Parses provider slot times, which are `H`, `HMM` or `HHMM` without padding.
fn slot_time(date: NaiveDate, slot: usize, fields: &[(String, FieldValue)]) -> Result<NaiveTime, ParseError> {
    let raw = fields
        .iter()
        .find(|(name, _)| name == "time")
        .and_then(|(_, value)| value.as_text())
        .ok_or(ParseError::MissingSlotTime { date, slot })?;
    let digits = raw.trim();
    let invalid = || ParseError::InvalidSlotTime {
        date,
        value: raw.clone(),
    };
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let padded = format!("{digits:0>4}");
    let hour: u32 = padded[..2].parse().map_err(|_| invalid())?;
    let minute: u32 = padded[2..].parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}
