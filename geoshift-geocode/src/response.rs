//! Reverse geocode response types.
//!
//! The provider wraps every answer in an envelope carrying a `status` field.
//! `0` means success and the payload sits under `result`; any other status
//! comes with a human-readable `message`. Some deployments send the status as
//! a string, others as a number, so both are accepted.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::GeocodeError;

/// Provider status as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProviderStatus {
    /// Numeric status, e.g. `0`.
    Code(i64),
    /// String status, e.g. `"0"`.
    Text(String),
}

impl ProviderStatus {
    /// Check if the status indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Code(code) => *code == 0,
            Self::Text(text) => text == "0",
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Envelope returned by the reverse geocode endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReverseGeocodeResponse {
    /// Provider status; see [`ProviderStatus::is_ok`].
    pub status: ProviderStatus,

    /// Optional failure message when `status` is not zero.
    #[serde(default)]
    pub message: Option<String>,

    /// Payload, present on success.
    #[serde(default)]
    pub result: Option<GeocodeResponse>,
}

impl ReverseGeocodeResponse {
    /// Unwrap the envelope into its payload.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Provider`] for a non-zero status with a
    /// message, and [`GeocodeError::Parse`] when a failed envelope has no
    /// `message` or a successful one has no `result`.
    pub fn into_result(self) -> Result<GeocodeResponse, GeocodeError> {
        if !self.status.is_ok() {
            let status = self.status.to_string();
            return Err(match self.message {
                Some(message) => GeocodeError::Provider { status, message },
                None => GeocodeError::Parse {
                    message: format!("geocode status {status} without a message"),
                },
            });
        }
        self.result.ok_or_else(|| GeocodeError::Parse {
            message: "geocode response missing result object".to_owned(),
        })
    }
}

/// Address data for a single coordinate.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GeocodeResponse {
    /// Human-readable address.
    #[serde(default)]
    pub formatted_address: Option<String>,

    /// Structured address parts (province, city, street, ...), as sent.
    #[serde(rename = "addressComponent", default)]
    pub address_component: Option<Map<String, Value>>,

    /// Position the address resolves to, in the provider frame.
    #[serde(default)]
    pub location: Option<ProviderLocation>,
}

/// Provider position in `{lat, lng}` form.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProviderLocation {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}
