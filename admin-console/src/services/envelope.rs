//! Request and response envelopes shared by every backend operation.
//!
//! Requests: `{ token, dataAccessDTO: { userId, userName }, ...fields }`.
//! Responses: `{ status, data: { status, responseObject, message? } }`, a
//! success only when both flags are true.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAccess<'a> {
    pub user_id: i64,
    pub user_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a, T: Serialize> {
    pub token: &'a str,
    #[serde(rename = "dataAccessDTO")]
    pub data_access: DataAccess<'a>,
    #[serde(flatten)]
    pub body: &'a T,
}

#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub response_object: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Why an envelope did not carry a usable result.
#[derive(Debug, PartialEq, Eq)]
pub enum EnvelopeFailure {
    /// The backend refused; text is `data.message`, or `data` itself.
    Rejected(String),
    Malformed(String),
}

pub fn open_envelope(body: &str) -> Result<Value, EnvelopeFailure> {
    let envelope: ResponseEnvelope =
        serde_json::from_str(body).map_err(|e| EnvelopeFailure::Malformed(e.to_string()))?;

    match envelope.data {
        Some(data) if envelope.status && data.status => Ok(data.response_object),
        Some(data) => {
            let message = match data.message.as_deref().map(str::trim) {
                Some(message) if !message.is_empty() => message.to_string(),
                _ => serde_json::to_string(&data)
                    .unwrap_or_else(|_| "Request was rejected".to_string()),
            };
            Err(EnvelopeFailure::Rejected(message))
        }
        None => Err(EnvelopeFailure::Rejected(
            "Request was rejected".to_string(),
        )),
    }
}
