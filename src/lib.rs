//! Facade crate for the Geoshift coordinate toolkit.
//!
//! This crate re-exports the frame conversion types and exposes the address
//! lookup orchestrator behind the `geocode` feature flag.

#![forbid(unsafe_code)]

pub use geoshift_core::{
    Bd09Coord, ConversionError, ConversionRequest, ConversionResponse, Frame, FrameParseError,
    FramePolicy, FramedCoord, Gcj02Coord, LiveLocationAdapter, LocationSubscriber, Wgs84Coord,
    convert, convert_named, live, parse_target_frame, transform,
};

#[cfg(feature = "serde")]
pub use geoshift_core::convert_json;

#[cfg(feature = "geocode")]
pub use geoshift_geocode::{
    Address, Delivery, GeocodeError, GeocodeOrchestrator, GeocodeOutcome, GeocodeProvider,
    GeocodeRequest, GeocodeSink, HttpGeocodeProvider, HttpGeocodeProviderConfig, QueryId,
};
