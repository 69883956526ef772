//! Frame-pair dispatch and the string-keyed conversion payload.

use geo::Coord;
use log::warn;
use thiserror::Error;

use crate::transform;
use crate::{Frame, FrameParseError};

/// Convert `coord` from `from` to `to`.
///
/// Self-pairs return the input unchanged; the six cross pairs call the
/// matching [`transform`] function.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use geoshift_core::{Frame, convert, transform};
///
/// let input = Coord { x: 116.404, y: 39.915 };
/// assert_eq!(convert(input, Frame::Bd09, Frame::Bd09), input);
/// assert_eq!(
///     convert(input, Frame::Wgs84, Frame::Gcj02),
///     transform::wgs84_to_gcj02(input),
/// );
/// ```
#[must_use]
pub fn convert(coord: Coord, from: Frame, to: Frame) -> Coord {
    match (from, to) {
        (Frame::Wgs84, Frame::Gcj02) => transform::wgs84_to_gcj02(coord),
        (Frame::Gcj02, Frame::Wgs84) => transform::gcj02_to_wgs84(coord),
        (Frame::Gcj02, Frame::Bd09) => transform::gcj02_to_bd09(coord),
        (Frame::Bd09, Frame::Gcj02) => transform::bd09_to_gcj02(coord),
        (Frame::Wgs84, Frame::Bd09) => transform::wgs84_to_bd09(coord),
        (Frame::Bd09, Frame::Wgs84) => transform::bd09_to_wgs84(coord),
        (Frame::Wgs84, Frame::Wgs84)
        | (Frame::Gcj02, Frame::Gcj02)
        | (Frame::Bd09, Frame::Bd09) => coord,
    }
}

/// How unrecognised frame names are handled.
///
/// `Lenient` keeps the historical behaviour of returning the input unchanged
/// when either name is unknown. `Strict` reports the bad name instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FramePolicy {
    /// Unknown names pass the coordinate through untouched.
    #[default]
    Lenient,
    /// Unknown names are reported as [`ConversionError::UnknownFrame`].
    Strict,
}

/// Errors raised while handling a conversion request.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A frame name was not recognised and the policy is strict.
    #[error(transparent)]
    UnknownFrame(#[from] FrameParseError),
    /// The request payload was not valid JSON for a conversion request.
    #[error("malformed conversion payload: {message}")]
    MalformedPayload {
        /// Decoder diagnostic.
        message: String,
    },
    /// The conversion result could not be serialised.
    #[error("failed to serialise conversion result: {message}")]
    Serialise {
        /// Encoder diagnostic.
        message: String,
    },
}

/// Convert `coord` between frames named by strings.
///
/// # Errors
///
/// Returns [`ConversionError::UnknownFrame`] when `policy` is
/// [`FramePolicy::Strict`] and either name is not a known frame.
pub fn convert_named(
    coord: Coord,
    from: &str,
    to: &str,
    policy: FramePolicy,
) -> Result<Coord, ConversionError> {
    match (from.parse::<Frame>(), to.parse::<Frame>()) {
        (Ok(from_frame), Ok(to_frame)) => Ok(convert(coord, from_frame, to_frame)),
        (Err(err), _) | (_, Err(err)) => match policy {
            FramePolicy::Strict => Err(err.into()),
            FramePolicy::Lenient => {
                warn!("unrecognised frame pair {from:?} -> {to:?}; returning input unchanged");
                Ok(coord)
            }
        },
    }
}

/// Conversion request as received from a host application.
///
/// Missing numeric fields default to `0.0` and missing frame names to the
/// empty string, which only a lenient policy accepts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ConversionRequest {
    /// Latitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub latitude: f64,
    /// Longitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub longitude: f64,
    /// Source frame name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub from: String,
    /// Target frame name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub to: String,
}

/// Result of a [`ConversionRequest`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ConversionResponse {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl From<Coord> for ConversionResponse {
    fn from(coord: Coord) -> Self {
        Self {
            longitude: coord.x,
            latitude: coord.y,
        }
    }
}

impl ConversionRequest {
    /// Decode a request from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::MalformedPayload`] when `payload` is not a
    /// JSON object with the expected field types.
    #[cfg(feature = "serde")]
    pub fn from_json(payload: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(payload).map_err(|err| ConversionError::MalformedPayload {
            message: err.to_string(),
        })
    }

    /// Carry out the conversion.
    ///
    /// # Errors
    ///
    /// Propagates [`convert_named`] failures.
    pub fn resolve(&self, policy: FramePolicy) -> Result<ConversionResponse, ConversionError> {
        let coord = Coord {
            x: self.longitude,
            y: self.latitude,
        };
        convert_named(coord, &self.from, &self.to, policy).map(ConversionResponse::from)
    }
}

/// Decode, convert and re-encode a JSON conversion request.
///
/// The result is emitted as `{"longitude": .., "latitude": ..}`.
///
/// # Errors
///
/// Returns [`ConversionError`] for malformed payloads or, under
/// [`FramePolicy::Strict`], unknown frame names.
///
/// # Examples
///
/// ```
/// use geoshift_core::{FramePolicy, convert_json};
///
/// let out = convert_json(
///     r#"{"latitude": 10.0, "longitude": 20.0, "from": "wgs84", "to": "wgs84"}"#,
///     FramePolicy::Lenient,
/// )?;
/// assert_eq!(out, r#"{"longitude":20.0,"latitude":10.0}"#);
/// # Ok::<(), geoshift_core::ConversionError>(())
/// ```
#[cfg(feature = "serde")]
pub fn convert_json(payload: &str, policy: FramePolicy) -> Result<String, ConversionError> {
    let request = ConversionRequest::from_json(payload)?;
    let response = request.resolve(policy)?;
    serde_json::to_string(&response).map_err(|err| ConversionError::Serialise {
        message: err.to_string(),
    })
}
