//! Payload fixtures and a recording transport for tests.

use crate::provider::error::ProviderError;
use crate::provider::transport::{RawResponse, Transport};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

pub(crate) type Query = HashMap<String, String>;
type Responder = Box<dyn Fn(&Query) -> RawResponse + Send + Sync>;

/// Answers every request with its responder and remembers the query parameters.
pub(crate) struct MockTransport {
    responder: Responder,
    calls: Mutex<Vec<Query>>,
}

impl MockTransport {
    pub(crate) fn new(responder: impl Fn(&Query) -> RawResponse + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves generated history for whatever `date`, `enddate`, `tp` and `format` ask for.
    pub(crate) fn serving_history() -> Self {
        Self::new(history_response)
    }

    pub(crate) fn calls(&self) -> Vec<Query> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn get(
        &self,
        _url: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<RawResponse, ProviderError>> + Send {
        let query: Query = query
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        let response = (self.responder)(&query);
        self.calls.lock().unwrap().push(query);
        async move { Ok(response) }
    }
}

pub(crate) fn ok(body: String) -> RawResponse {
    RawResponse { status: 200, body }
}

pub(crate) fn status(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        body: body.to_string(),
    }
}

pub(crate) fn query_date(query: &Query, name: &str) -> NaiveDate {
    NaiveDate::parse_from_str(&query[name], "%Y-%m-%d").unwrap()
}

pub(crate) fn history_response(query: &Query) -> RawResponse {
    let start = query_date(query, "date");
    let end = query_date(query, "enddate");
    let tp: u32 = query["tp"].parse().unwrap();
    let body = history_value(start, end, tp, 0);
    match query.get("format").map(String::as_str) {
        Some("xml") => ok(to_xml(&body)),
        _ => ok(body.to_string()),
    }
}

pub(crate) fn history_json(start: NaiveDate, end: NaiveDate, tp: u32) -> String {
    history_value(start, end, tp, 0).to_string()
}

pub(crate) fn history_xml(start: NaiveDate, end: NaiveDate, tp: u32) -> String {
    to_xml(&history_value(start, end, tp, 0))
}

/// A past-weather response shaped like the provider's, with `24 / tp` slots per day.
///
/// Slot `n` has `tempC = base_temp + n` and `humidity = 70 + n`. The per-day `uvIndex` is 1
/// while every slot reports 2.
pub(crate) fn history_value(start: NaiveDate, end: NaiveDate, tp: u32, base_temp: i64) -> Value {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        days.push(day_value(date, tp, base_temp));
        date = date.succ_opt().unwrap();
    }
    json!({
        "data": {
            "request": [{"type": "City", "query": "London, United Kingdom"}],
            "weather": days
        }
    })
}

fn day_value(date: NaiveDate, tp: u32, base_temp: i64) -> Value {
    let slots: Vec<Value> = (0..24 / tp)
        .map(|n| slot_value(n, tp, base_temp))
        .collect();
    json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "astronomy": [{
            "sunrise": "08:06 AM",
            "sunset": "04:02 PM",
            "moonrise": "11:37 AM",
            "moonset": "11:24 PM",
            "moon_phase": "First Quarter",
            "moon_illumination": "35"
        }],
        "maxtempC": "7",
        "maxtempF": "45",
        "mintempC": "3",
        "mintempF": "37",
        "avgtempC": "5",
        "avgtempF": "41",
        "totalSnow_cm": "0.0",
        "sunHour": "3.5",
        "uvIndex": "1",
        "hourly": slots
    })
}

fn slot_value(n: u32, tp: u32, base_temp: i64) -> Value {
    let temp = base_temp + i64::from(n);
    json!({
        "time": (n * tp * 100).to_string(),
        "tempC": temp.to_string(),
        "tempF": (temp * 9 / 5 + 32).to_string(),
        "windspeedMiles": "9",
        "windspeedKmph": "15",
        "winddirDegree": "225",
        "winddir16Point": "SW",
        "weatherCode": "116",
        "weatherIconUrl": [{"value": "http://cdn.worldweatheronline.com/images/wsymbols01_png_64/wsymbol_0004_black_low_cloud.png"}],
        "weatherDesc": [{"value": "Partly cloudy"}],
        "precipMM": "0.0",
        "precipInches": "0.0",
        "humidity": (70 + n).to_string(),
        "visibility": "10",
        "visibilityMiles": "6",
        "pressure": "1030",
        "pressureInches": "31",
        "cloudcover": "40",
        "HeatIndexC": "6",
        "HeatIndexF": "43",
        "DewPointC": "2",
        "DewPointF": "36",
        "WindChillC": "3",
        "WindChillF": "37",
        "WindGustMiles": "14",
        "WindGustKmph": "23",
        "FeelsLikeC": "3",
        "FeelsLikeF": "37",
        "uvIndex": "2"
    })
}

/// Renders a JSON response the way the provider's XML format lays it out: arrays become
/// repeated elements and `[{"value": ...}]` wrappers become CDATA leaves.
pub(crate) fn to_xml(value: &Value) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    if let Value::Object(root) = value {
        write_members(&mut xml, root);
    }
    xml
}

fn write_members(xml: &mut String, members: &Map<String, Value>) {
    for (name, value) in members {
        write_element(xml, name, value);
    }
}

fn write_element(xml: &mut String, name: &str, value: &Value) {
    match value {
        Value::Array(items) => match items.as_slice() {
            [Value::Object(wrapper)] if wrapper.len() == 1 && wrapper.contains_key("value") => {
                let text = wrapper["value"].as_str().unwrap_or_default();
                xml.push_str(&format!("<{name}><![CDATA[{text}]]></{name}>"));
            }
            _ => {
                for item in items {
                    write_element(xml, name, item);
                }
            }
        },
        Value::Object(members) => {
            xml.push_str(&format!("<{name}>"));
            write_members(xml, members);
            xml.push_str(&format!("</{name}>"));
        }
        Value::String(text) => {
            let escaped = text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            xml.push_str(&format!("<{name}>{escaped}</{name}>"));
        }
        other => xml.push_str(&format!("<{name}>{other}</{name}>")),
    }
}
