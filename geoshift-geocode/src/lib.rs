//! Reverse geocoding for the Geoshift toolkit.
//!
//! Responsibilities:
//! - Talk to an HTTP reverse geocode provider ([`provider`]).
//! - Decode provider envelopes and fold them into outcomes ([`response`]).
//! - Keep a single lookup in flight and deliver its outcome exactly once
//!   ([`orchestrator`]).
//!
//! Boundaries:
//! - Frame conversion comes from `geoshift-core`; coordinates are normalised
//!   to the provider's native frame before any request leaves the process.
//!
//! Invariants:
//! - A superseded or shut-down query never reaches its sink.
//! - Transport failures are reported as `"network error"`; provider failures
//!   carry the provider's message verbatim.

mod error;
pub mod orchestrator;
mod outcome;
pub mod provider;
mod request;
pub mod response;

#[doc(hidden)]
pub mod test_support;

pub use error::{GeocodeError, NETWORK_ERROR_REASON, ProviderBuildError};
pub use orchestrator::{GeocodeOrchestrator, GeocodeSink, QueryId};
pub use outcome::{Address, Delivery, GeocodeOutcome};
pub use provider::{GeocodeProvider, HttpGeocodeProvider, HttpGeocodeProviderConfig};
pub use request::{AddressQuery, GeocodeRequest, RequestError};
pub use response::GeocodeResponse;
