use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::ApiError;

// ============================================================================
// Response Envelope
// ============================================================================

/// Wrapper the orchestrator puts around every response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: serde::de::DeserializeOwned> ApiResponse<T> {
    /// Validate the shape of an untrusted payload and decode it.
    ///
    /// The payload must be a JSON object with a boolean `success`. `error`
    /// and `message` must be strings when present, and a non-null `data`
    /// must decode as `T`.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ApiError::InvalidEnvelope("expected a JSON object".to_string()))?;

        match obj.get("success") {
            Some(Value::Bool(_)) => {}
            Some(other) => {
                return Err(ApiError::InvalidEnvelope(format!(
                    "`success` must be a boolean, got {}",
                    other
                )))
            }
            None => {
                return Err(ApiError::InvalidEnvelope(
                    "missing `success` field".to_string(),
                ))
            }
        }

        for key in ["error", "message"] {
            if let Some(v) = obj.get(key) {
                if !v.is_string() && !v.is_null() {
                    return Err(ApiError::InvalidEnvelope(format!(
                        "`{}` must be a string, got {}",
                        key, v
                    )));
                }
            }
        }

        serde_json::from_value(value).map_err(|e| ApiError::InvalidEnvelope(e.to_string()))
    }
}

// ============================================================================
// Node Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub mac: String,
    pub name: String,
    pub online: bool,
    pub last_seen: Timestamp,
    /// Only present on single-node lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_type: Option<AdapterType>,
}

/// Adapter codes understood by the mesh firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum AdapterType {
    Unknown,
    Pir,
    WiFi,
    Led,
    Serial,
    Other(i32),
}

impl From<i32> for AdapterType {
    fn from(code: i32) -> Self {
        match code {
            -1 => AdapterType::Unknown,
            0 => AdapterType::Pir,
            1 => AdapterType::WiFi,
            2 => AdapterType::Led,
            3 => AdapterType::Serial,
            other => AdapterType::Other(other),
        }
    }
}

impl From<AdapterType> for i32 {
    fn from(adapter: AdapterType) -> Self {
        match adapter {
            AdapterType::Unknown => -1,
            AdapterType::Pir => 0,
            AdapterType::WiFi => 1,
            AdapterType::Led => 2,
            AdapterType::Serial => 3,
            AdapterType::Other(code) => code,
        }
    }
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterType::Unknown => f.write_str("Unknown"),
            AdapterType::Pir => f.write_str("PIR"),
            AdapterType::WiFi => f.write_str("WiFi"),
            AdapterType::Led => f.write_str("LED"),
            AdapterType::Serial => f.write_str("Serial"),
            AdapterType::Other(code) => write!(f, "Unknown({})", code),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    pub adapter_type: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub data_type: i32,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

// ============================================================================
// Server Status
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub running: bool,
    pub total_nodes: u32,
    pub online_nodes: u32,
    pub timestamp: Timestamp,
}

// ============================================================================
// Timestamps
// ============================================================================

/// A point in time as reported by the orchestrator, normalized to UTC.
///
/// Accepts integer Unix seconds or an RFC 3339 string on input and always
/// writes Unix seconds back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn from_unix(secs: i64) -> Result<Self, time::error::ComponentRange> {
        OffsetDateTime::from_unix_timestamp(secs).map(Self)
    }

    pub fn unix(&self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(dt: OffsetDateTime) -> Self {
        Self(dt.to_offset(UtcOffset::UTC))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::format_date_time(*self))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Seconds(secs) => Timestamp::from_unix(secs).map_err(D::Error::custom),
            RawTimestamp::Text(text) => {
                if let Ok(secs) = text.parse::<i64>() {
                    return Timestamp::from_unix(secs).map_err(D::Error::custom);
                }
                OffsetDateTime::parse(&text, &Rfc3339)
                    .map(Timestamp::from)
                    .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", text, e)))
            }
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.unix())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
