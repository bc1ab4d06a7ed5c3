//! Metric records and their InfluxDB line-protocol encoding
//!
//! A record is a measurement name, a set of string tags, a set of typed
//! fields and an optional timestamp. Without a timestamp the store assigns
//! its own ingestion time.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::SinkError;

/// Typed value of a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

/// One tagged, optionally timestamped record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    /// Measurement (table) name
    pub measurement: String,

    /// Indexed string tags, kept sorted by key
    pub tags: BTreeMap<String, String>,

    /// Field values, kept sorted by key
    pub fields: BTreeMap<String, FieldValue>,

    /// Record time; `None` lets the store assign one
    pub timestamp: Option<DateTime<Utc>>,
}

impl MetricPoint {
    /// Start a record for `measurement` with no tags, fields or timestamp
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: None,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Encode as one line of InfluxDB line protocol with nanosecond precision
    pub fn to_line_protocol(&self) -> Result<String, SinkError> {
        if self.measurement.is_empty() {
            return Err(SinkError::InvalidPoint("measurement name is empty".to_string()));
        }
        if self.fields.is_empty() {
            return Err(SinkError::InvalidPoint(format!(
                "point for '{}' has no fields",
                self.measurement
            )));
        }

        let mut line = escape_name(&self.measurement, &[',', ' '])?;

        for (key, value) in &self.tags {
            // Empty tag values are not representable; the store drops them too
            if value.is_empty() {
                continue;
            }
            let _ = write!(
                line,
                ",{}={}",
                escape_name(key, &[',', '=', ' '])?,
                escape_name(value, &[',', '=', ' '])?
            );
        }

        let mut separator = ' ';
        for (key, value) in &self.fields {
            line.push(separator);
            separator = ',';
            line.push_str(&escape_name(key, &[',', '=', ' '])?);
            line.push('=');
            line.push_str(&encode_field(key, value)?);
        }

        if let Some(timestamp) = self.timestamp {
            let nanos = timestamp.timestamp_nanos_opt().ok_or_else(|| {
                SinkError::InvalidPoint(format!("timestamp {} out of nanosecond range", timestamp))
            })?;
            let _ = write!(line, " {}", nanos);
        }

        Ok(line)
    }
}

/// Encode a batch, one point per line
pub fn encode_batch(points: &[MetricPoint]) -> Result<String, SinkError> {
    let lines = points
        .iter()
        .map(MetricPoint::to_line_protocol)
        .collect::<Result<Vec<String>, SinkError>>()?;
    Ok(lines.join("\n"))
}

fn encode_field(key: &str, value: &FieldValue) -> Result<String, SinkError> {
    match value {
        FieldValue::Integer(v) => Ok(format!("{}i", v)),
        FieldValue::Float(v) if v.is_finite() => Ok(format!("{}", v)),
        FieldValue::Float(v) => Err(SinkError::InvalidPoint(format!(
            "field '{}' is not finite: {}",
            key, v
        ))),
        FieldValue::Boolean(v) => Ok(v.to_string()),
        FieldValue::String(v) => Ok(format!("\"{}\"", escape(v, &['"', '\\']))),
    }
}

/// Escape a measurement, tag or field key; line breaks would end the record
fn escape_name(raw: &str, special: &[char]) -> Result<String, SinkError> {
    if raw.contains(['\n', '\r']) {
        return Err(SinkError::InvalidPoint(format!(
            "line break in name or tag {:?}",
            raw
        )));
    }
    // Doubled backslashes keep a trailing one from escaping the separator
    let mut special = special.to_vec();
    special.push('\\');
    Ok(escape(raw, &special))
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
