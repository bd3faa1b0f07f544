//! Free-form metadata attached to state-of-mind samples

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arbitrary scalar or nested value under a string key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

/// Encode a metadata map as JSON text for a single storage column
pub fn encode_metadata(metadata: &BTreeMap<String, MetadataValue>) -> serde_json::Result<String> {
    serde_json::to_string(metadata)
}
