//! Geodetic reference frames understood by the transform engine.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reference frame a longitude/latitude pair is expressed in.
///
/// The wire names are `wgs84`, `gcj02` and `bd09`; parsing is
/// case-insensitive.
///
/// # Examples
///
/// ```
/// use geoshift_core::Frame;
///
/// let frame: Frame = "GCJ02".parse()?;
/// assert_eq!(frame, Frame::Gcj02);
/// assert_eq!(frame.to_string(), "gcj02");
/// # Ok::<(), geoshift_core::FrameParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Frame {
    /// True-earth frame used by GPS receivers.
    Wgs84,
    /// Regulatory offset frame derived from WGS84.
    Gcj02,
    /// Provider frame layered on top of GCJ02.
    Bd09,
}

/// Error returned when a frame name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown coordinate frame {input:?} (expected wgs84, gcj02 or bd09)")]
pub struct FrameParseError {
    /// The rejected input, as supplied.
    pub input: String,
}

impl Frame {
    /// Every frame, in declaration order.
    pub const ALL: [Self; 3] = [Self::Wgs84, Self::Gcj02, Self::Bd09];

    /// Frame spoken natively by the location and geocode providers.
    pub const PROVIDER_NATIVE: Self = Self::Bd09;

    /// Lower-case wire name of the frame.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wgs84 => "wgs84",
            Self::Gcj02 => "gcj02",
            Self::Bd09 => "bd09",
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::PROVIDER_NATIVE
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frame {
    type Err = FrameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|frame| frame.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FrameParseError {
                input: s.to_owned(),
            })
    }
}
