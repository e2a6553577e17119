//! Structured event accumulator.
//!
//! A [`LogEvent`] is an ordered list of named fields built additively while a
//! request flows through the middleware stack. Field names follow a
//! colon-delimited hierarchy such as `http:req:method`.

use std::time::Duration;

use axum::http::HeaderMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Header and trailer names starting with this prefix are never recorded.
pub const EXCLUDED_HEADER_PREFIX: &str = "sec-";

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Serialized as fractional milliseconds.
    Duration(Duration),
    Strs(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_strs(&self) -> Option<&[String]> {
        match self {
            FieldValue::Strs(values) => Some(values),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Str(s) => serializer.serialize_str(s),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Duration(d) => {
                serializer.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
            }
            FieldValue::Strs(values) => values.serialize(serializer),
        }
    }
}

/// Ordered, append-only collection of log fields.
///
/// Adding a field whose name is already present appends a second entry; the
/// most recent one wins on lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEvent {
    fields: Vec<(String, FieldValue)>,
}

impl LogEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) -> &mut Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn str(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(name, FieldValue::Str(value.into()))
    }

    pub fn int(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.push(name, FieldValue::Int(value))
    }

    pub fn bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.push(name, FieldValue::Bool(value))
    }

    pub fn duration(&mut self, name: impl Into<String>, value: Duration) -> &mut Self {
        self.push(name, FieldValue::Duration(value))
    }

    pub fn strs<I, S>(&mut self, name: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(name, FieldValue::Strs(values))
    }

    /// Adds one array field per header name under `{prefix}:{name}`.
    ///
    /// Names are lowercased; `sec-*` names and any name listed in `skip` are
    /// left out. Repeated headers keep every value in arrival order.
    pub fn header_group(&mut self, prefix: &str, headers: &HeaderMap, skip: &[&str]) -> &mut Self {
        for name in headers.keys() {
            let lowered = name.as_str().to_ascii_lowercase();
            if is_excluded_header(&lowered) || skip.contains(&lowered.as_str()) {
                continue;
            }
            let values = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>();
            self.push(format!("{prefix}:{lowered}"), FieldValue::Strs(values));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .rev()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn extend(&mut self, other: &LogEvent) -> &mut Self {
        self.fields.extend(other.fields.iter().cloned());
        self
    }
}

impl Serialize for LogEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Case-insensitive check against [`EXCLUDED_HEADER_PREFIX`].
pub fn is_excluded_header(name: &str) -> bool {
    name.len() >= EXCLUDED_HEADER_PREFIX.len()
        && name[..EXCLUDED_HEADER_PREFIX.len()].eq_ignore_ascii_case(EXCLUDED_HEADER_PREFIX)
}
