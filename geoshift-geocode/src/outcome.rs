//! What a lookup produces and how it reaches the caller.

use geoshift_core::Bd09Coord;
use serde_json::{Map, Value, json};

use crate::orchestrator::QueryId;
use crate::response::GeocodeResponse;
use crate::GeocodeError;

/// A resolved address.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    /// Human-readable address. Always present for plain lookups.
    pub formatted_address: Option<String>,
    /// Structured address parts, for detailed lookups.
    pub address_component: Option<Map<String, Value>>,
    /// Resolved position, for detailed lookups.
    pub location: Option<Bd09Coord>,
}

impl Address {
    /// Build an address from a provider payload.
    ///
    /// A plain lookup keeps only the formatted address; a detailed lookup
    /// keeps whichever fields the provider sent.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Parse`] when a plain lookup's payload has no
    /// `formatted_address`.
    pub fn from_response(response: GeocodeResponse, detail: bool) -> Result<Self, GeocodeError> {
        if !detail {
            let formatted_address =
                response
                    .formatted_address
                    .ok_or_else(|| GeocodeError::Parse {
                        message: "geocode result missing formatted_address".to_owned(),
                    })?;
            return Ok(Self {
                formatted_address: Some(formatted_address),
                ..Self::default()
            });
        }
        Ok(Self {
            formatted_address: response.formatted_address,
            address_component: response.address_component,
            location: response
                .location
                .map(|location| Bd09Coord::new(location.lng, location.lat)),
        })
    }

    /// Render as `{formatted_address?, addressComponent?, location?}`.
    ///
    /// Absent fields are omitted. `location` uses the provider's `{lat, lng}`
    /// field names.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if let Some(formatted_address) = &self.formatted_address {
            object.insert(
                "formatted_address".to_owned(),
                Value::from(formatted_address.as_str()),
            );
        }
        if let Some(component) = &self.address_component {
            object.insert(
                "addressComponent".to_owned(),
                Value::Object(component.clone()),
            );
        }
        if let Some(location) = self.location {
            object.insert(
                "location".to_owned(),
                json!({ "lat": location.latitude(), "lng": location.longitude() }),
            );
        }
        Value::Object(object)
    }
}

/// Result of a non-superseded lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// The provider resolved the position.
    Success(Address),
    /// The lookup failed.
    Failure {
        /// Provider message, or `"network error"` for transport failures.
        reason: String,
    },
}

impl GeocodeOutcome {
    /// Fold a provider result into an outcome.
    #[must_use]
    pub fn from_result(result: Result<GeocodeResponse, GeocodeError>, detail: bool) -> Self {
        match result.and_then(|response| Address::from_response(response, detail)) {
            Ok(address) => Self::Success(address),
            Err(err) => Self::Failure {
                reason: err.failure_reason(),
            },
        }
    }

    /// Whether the lookup succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// An outcome addressed to the caller that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Query the outcome belongs to.
    pub query_id: QueryId,
    /// Token supplied with the request, if any.
    pub correlation_id: Option<String>,
    /// The outcome itself.
    pub outcome: GeocodeOutcome,
}
