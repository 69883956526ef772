//! Coordinate frame conversion for the Geoshift toolkit.
//!
//! Responsibilities:
//! - Convert positions between WGS84, GCJ02 and BD09 ([`transform`]).
//! - Dispatch conversions for runtime-selected frame pairs ([`convert()`]).
//! - Re-express live location fixes in a chosen frame ([`live`]).
//!
//! Boundaries:
//! - No I/O. Network lookups live in `geoshift-geocode`.
//!
//! Invariants:
//! - Every function here is pure and thread-safe; there is no shared state.

pub mod coord;
pub mod frame;
pub mod live;
pub mod transform;

mod convert;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use convert::{
    ConversionError, ConversionRequest, ConversionResponse, FramePolicy, convert, convert_named,
};
#[cfg(feature = "serde")]
pub use convert::convert_json;
pub use coord::{Bd09Coord, FramedCoord, Gcj02Coord, Wgs84Coord};
pub use frame::{Frame, FrameParseError};
pub use live::{LiveLocationAdapter, LocationSubscriber, parse_target_frame};
