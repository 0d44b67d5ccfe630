//! Wire-format records for the document-creation endpoint.
//!
//! Plain data mirroring the external API's JSON schema; no behavior beyond
//! (de)serialization. Field names follow the wire format, which mixes
//! snake_case with two camelCase outliers (`importRequest`, `participantInn`).

use serde::{Deserialize, Serialize};

/// A "create document" payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<ParticipantInn>,
    pub doc_id: String,
    pub doc_status: String,
    pub doc_type: String,
    #[serde(rename = "importRequest", default, skip_serializing_if = "Option::is_none")]
    pub import_request: Option<bool>,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    /// ISO-8601 date, e.g. `2020-01-23`.
    pub production_date: String,
    pub production_type: String,
    #[serde(default)]
    pub products: Vec<Product>,
    /// ISO-8601 date.
    pub reg_date: String,
    pub reg_number: String,
}

impl Document {
    /// Parse a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON, the format the endpoint accepts.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Participant tax-code wrapper nested under `description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInn {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// One product line inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_inn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_inn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tnved_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<String>,
}
