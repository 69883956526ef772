//! Address lookup requests.

use geo::Coord;
use geoshift_core::{ConversionError, Frame, FramePolicy, FramedCoord};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`GeocodeRequest`] from host input.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A numeric argument could not be parsed.
    #[error("invalid {field} {input:?}: expected a decimal number")]
    InvalidNumber {
        /// Argument name.
        field: &'static str,
        /// Rejected input.
        input: String,
    },
    /// The JSON payload did not describe an address query.
    #[error("malformed address query: {message}")]
    MalformedPayload {
        /// Decoder diagnostic.
        message: String,
    },
    /// The frame name was rejected under a strict policy.
    #[error(transparent)]
    Frame(#[from] ConversionError),
}

/// A single reverse geocode request.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use geoshift_core::Frame;
/// use geoshift_geocode::GeocodeRequest;
///
/// let request = GeocodeRequest::new(Coord { x: 116.404, y: 39.915 }, Frame::Wgs84)
///     .with_detail(true)
///     .with_correlation_id("lookup-7");
/// assert!(request.detail);
/// assert_eq!(request.correlation_id.as_deref(), Some("lookup-7"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    /// Position to resolve; `x` is longitude, `y` latitude.
    pub coordinate: Coord,
    /// Frame `coordinate` is expressed in.
    pub frame: Frame,
    /// Whether the structured address is wanted.
    pub detail: bool,
    /// Caller token echoed back in the [`crate::Delivery`].
    pub correlation_id: Option<String>,
}

impl GeocodeRequest {
    /// Create a plain lookup for `coordinate` in `frame`.
    #[must_use]
    pub const fn new(coordinate: Coord, frame: Frame) -> Self {
        Self {
            coordinate,
            frame,
            detail: false,
            correlation_id: None,
        }
    }

    /// Request the structured address.
    #[must_use]
    pub const fn with_detail(mut self, detail: bool) -> Self {
        self.detail = detail;
        self
    }

    /// Attach a correlation token.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Coordinate tagged with its frame.
    #[must_use]
    pub const fn framed(&self) -> FramedCoord {
        FramedCoord::from_parts(self.coordinate, self.frame)
    }
}

impl From<FramedCoord> for GeocodeRequest {
    fn from(value: FramedCoord) -> Self {
        Self::new(value.coord(), value.frame())
    }
}

/// Flag value selecting the structured address.
const DETAIL_FLAG: i64 = 1;

fn default_frame_name() -> String {
    Frame::PROVIDER_NATIVE.as_str().to_owned()
}

/// Address query as received from a host application.
///
/// `type` names the frame of the position and defaults to `bd09`; `flag`
/// equal to `1` selects the structured address.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AddressQuery {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Frame name.
    #[serde(rename = "type", default = "default_frame_name")]
    pub frame: String,
    /// Detail selector.
    #[serde(default)]
    pub flag: i64,
}

impl AddressQuery {
    /// Decode a query from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MalformedPayload`] when `payload` is not an
    /// object with numeric `latitude` and `longitude`.
    pub fn from_json(payload: &str) -> Result<Self, RequestError> {
        serde_json::from_str(payload).map_err(|err| RequestError::MalformedPayload {
            message: err.to_string(),
        })
    }

    /// Build a query from positional string arguments.
    ///
    /// The position is taken to be in the provider frame. An unparsable
    /// `flag` selects the plain address.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidNumber`] when `latitude` or `longitude`
    /// is not a decimal number.
    pub fn from_parts(latitude: &str, longitude: &str, flag: &str) -> Result<Self, RequestError> {
        Ok(Self {
            latitude: parse_number("latitude", latitude)?,
            longitude: parse_number("longitude", longitude)?,
            frame: default_frame_name(),
            flag: flag.trim().parse().unwrap_or_default(),
        })
    }

    /// Whether the structured address was requested.
    #[must_use]
    pub const fn wants_detail(&self) -> bool {
        self.flag == DETAIL_FLAG
    }

    /// Turn the query into a [`GeocodeRequest`].
    ///
    /// Under [`FramePolicy::Lenient`] an unknown frame name is treated as the
    /// provider frame, so the position is sent as given.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Frame`] for an unknown frame name under
    /// [`FramePolicy::Strict`].
    pub fn into_request(
        self,
        correlation_id: Option<String>,
        policy: FramePolicy,
    ) -> Result<GeocodeRequest, RequestError> {
        let frame = match self.frame.parse::<Frame>() {
            Ok(frame) => frame,
            Err(err) if policy == FramePolicy::Strict => {
                return Err(ConversionError::from(err).into());
            }
            Err(err) => {
                warn!("{err}; sending position unconverted");
                Frame::PROVIDER_NATIVE
            }
        };
        let detail = self.wants_detail();
        let coordinate = Coord {
            x: self.longitude,
            y: self.latitude,
        };
        Ok(GeocodeRequest {
            coordinate,
            frame,
            detail,
            correlation_id,
        })
    }
}

fn parse_number(field: &'static str, input: &str) -> Result<f64, RequestError> {
    input
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidNumber {
            field,
            input: input.to_owned(),
        })
}
