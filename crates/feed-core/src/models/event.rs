// ABOUTME: Audit event model with schema-free fields and the published envelope
// ABOUTME: Events keep their original fields; publishing adds a timestamp and a type tag
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::fields;
use crate::time::{format_watermark, parse_creation_time};

/// One audit record as returned by a content blob
///
/// Field sets differ per content type, so the record is kept as a JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    /// Wrap an already-decoded field map
    #[must_use]
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// All fields
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Look up one field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw `CreationTime` string, if present
    #[must_use]
    pub fn creation_time_raw(&self) -> Option<&str> {
        self.0.get(fields::CREATION_TIME).and_then(Value::as_str)
    }

    /// Parsed `CreationTime`
    #[must_use]
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time_raw().and_then(parse_creation_time)
    }

    /// Build the published form, tagging it with `type_tag`
    #[must_use]
    pub fn into_published(self, type_tag: &str, timestamp: DateTime<Utc>) -> PublishedEvent {
        let mut tagged = self.0;
        tagged.insert(fields::TYPE.to_owned(), Value::String(type_tag.to_owned()));
        PublishedEvent {
            timestamp,
            fields: tagged,
        }
    }
}

/// Event as handed to the sink
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// Event time
    pub timestamp: DateTime<Utc>,
    /// Original fields plus the `type` tag
    pub fields: Map<String, Value>,
}

impl PublishedEvent {
    /// The `type` tag
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        self.fields.get(fields::TYPE).and_then(Value::as_str)
    }

    /// Flatten into one JSON object with an `@timestamp` key
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(
            fields::TIMESTAMP.to_owned(),
            Value::String(format_watermark(self.timestamp)),
        );
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}
