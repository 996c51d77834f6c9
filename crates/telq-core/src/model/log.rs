use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One log event as returned by the backend search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub attributes: LogAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogAttributes {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}
