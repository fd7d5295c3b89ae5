//! # Claims Extraction
//!
//! Typed view of a verified field set. Only built after the signature (and,
//! if requested, freshness) checks have passed.

use super::entities::{ClaimedSignature, FieldSet};
use super::errors::{InitDataError, MalformedReason};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields with a typed slot in [`InitDataClaims`]. Everything else lands in `extra`.
const KNOWN_FIELDS: &[&str] = &[
    "auth_date",
    "can_send_after",
    "chat",
    "chat_instance",
    "chat_type",
    "query_id",
    "receiver",
    "signature",
    "start_param",
    "user",
];

/// A user as serialized in the `user` and `receiver` fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bot: Option<bool>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_to_attachment_menu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_write_to_pm: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A chat as serialized in the `chat` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Validated init-data claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InitDataClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<WebAppUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<WebAppUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<WebAppChat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_send_after: Option<u64>,
    /// Unix seconds of issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_date: Option<u64>,
    /// Third-party (Ed25519) signature field, carried verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub hash: String,
    /// Signed fields without a typed slot
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl InitDataClaims {
    /// Build typed claims from a field set.
    ///
    /// # Errors
    /// `MalformedPayload(InvalidField)` if a JSON field does not decode or an
    /// integer field does not parse.
    pub fn from_fields(fields: &FieldSet, hash: &ClaimedSignature) -> Result<Self, InitDataError> {
        let extra = fields
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok(Self {
            query_id: string_field(fields, "query_id"),
            user: json_field(fields, "user")?,
            receiver: json_field(fields, "receiver")?,
            chat: json_field(fields, "chat")?,
            chat_type: string_field(fields, "chat_type"),
            chat_instance: string_field(fields, "chat_instance"),
            start_param: string_field(fields, "start_param"),
            can_send_after: int_field(fields, "can_send_after")?,
            auth_date: int_field(fields, "auth_date")?,
            signature: string_field(fields, "signature"),
            hash: hash.as_str().to_string(),
            extra,
        })
    }

    /// Identifier of the launching user, if the payload carries one.
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }
}

fn string_field(fields: &FieldSet, name: &str) -> Option<String> {
    fields.get(name).map(str::to_string)
}

fn json_field<T: DeserializeOwned>(fields: &FieldSet, name: &str) -> Result<Option<T>, InitDataError> {
    fields
        .get(name)
        .map(|raw| serde_json::from_str(raw).map_err(|e| invalid_field(name, e.to_string())))
        .transpose()
}

fn int_field(fields: &FieldSet, name: &str) -> Result<Option<u64>, InitDataError> {
    fields
        .get(name)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| invalid_field(name, e.to_string()))
        })
        .transpose()
}

fn invalid_field(field: &str, reason: String) -> InitDataError {
    InitDataError::malformed(MalformedReason::InvalidField {
        field: field.to_string(),
        reason,
    })
}
