// Domain records handed from the client to the formatters

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single fetched value. `name` is always the path it was requested with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Secret {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// A listing entry. Listings never carry the decrypted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}
