//! Frame-tagged coordinate values.
//!
//! Each frame gets its own value type so that a WGS84 position cannot be
//! handed to code expecting BD09 by accident. Conversions between the types
//! are `From` impls backed by [`crate::transform`].

use geo::Coord;

use crate::Frame;
use crate::transform;

macro_rules! framed_coord {
    ($(#[$meta:meta])* $name:ident, $frame:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(Coord);

        impl $name {
            /// Frame this value is expressed in.
            pub const FRAME: Frame = $frame;

            /// Construct from a longitude and latitude in degrees.
            #[must_use]
            pub const fn new(longitude: f64, latitude: f64) -> Self {
                Self(Coord {
                    x: longitude,
                    y: latitude,
                })
            }

            /// Longitude in degrees.
            #[must_use]
            pub const fn longitude(self) -> f64 {
                self.0.x
            }

            /// Latitude in degrees.
            #[must_use]
            pub const fn latitude(self) -> f64 {
                self.0.y
            }

            /// Untagged `geo` coordinate (`x` = longitude, `y` = latitude).
            #[must_use]
            pub const fn into_inner(self) -> Coord {
                self.0
            }
        }

        impl From<Coord> for $name {
            fn from(coord: Coord) -> Self {
                Self(coord)
            }
        }

        impl From<$name> for Coord {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<$name> for FramedCoord {
            fn from(value: $name) -> Self {
                Self::from_parts(Coord::from(value), $frame)
            }
        }
    };
}

framed_coord!(
    /// A position in the WGS84 frame.
    Wgs84Coord,
    Frame::Wgs84
);
framed_coord!(
    /// A position in the GCJ02 offset frame.
    Gcj02Coord,
    Frame::Gcj02
);
framed_coord!(
    /// A position in the BD09 provider frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoshift_core::{Bd09Coord, Wgs84Coord};
    ///
    /// let gps = Wgs84Coord::new(116.404, 39.915);
    /// let baidu = Bd09Coord::from(gps);
    /// assert!(baidu.longitude() > gps.longitude());
    /// ```
    Bd09Coord,
    Frame::Bd09
);

macro_rules! convert_between {
    ($from:ident => $to:ident via $func:path) => {
        impl From<$from> for $to {
            fn from(value: $from) -> Self {
                Self($func(value.0))
            }
        }
    };
}

convert_between!(Wgs84Coord => Gcj02Coord via transform::wgs84_to_gcj02);
convert_between!(Gcj02Coord => Wgs84Coord via transform::gcj02_to_wgs84);
convert_between!(Gcj02Coord => Bd09Coord via transform::gcj02_to_bd09);
convert_between!(Bd09Coord => Gcj02Coord via transform::bd09_to_gcj02);
convert_between!(Wgs84Coord => Bd09Coord via transform::wgs84_to_bd09);
convert_between!(Bd09Coord => Wgs84Coord via transform::bd09_to_wgs84);

/// A coordinate whose frame is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramedCoord {
    /// WGS84 position.
    Wgs84(Wgs84Coord),
    /// GCJ02 position.
    Gcj02(Gcj02Coord),
    /// BD09 position.
    Bd09(Bd09Coord),
}

impl FramedCoord {
    /// Tag an untagged coordinate with `frame`.
    #[must_use]
    pub const fn from_parts(coord: Coord, frame: Frame) -> Self {
        match frame {
            Frame::Wgs84 => Self::Wgs84(Wgs84Coord(coord)),
            Frame::Gcj02 => Self::Gcj02(Gcj02Coord(coord)),
            Frame::Bd09 => Self::Bd09(Bd09Coord(coord)),
        }
    }

    /// Frame the coordinate is expressed in.
    #[must_use]
    pub const fn frame(self) -> Frame {
        match self {
            Self::Wgs84(_) => Frame::Wgs84,
            Self::Gcj02(_) => Frame::Gcj02,
            Self::Bd09(_) => Frame::Bd09,
        }
    }

    /// Untagged coordinate.
    #[must_use]
    pub const fn coord(self) -> Coord {
        match self {
            Self::Wgs84(value) => value.0,
            Self::Gcj02(value) => value.0,
            Self::Bd09(value) => value.0,
        }
    }

    /// Re-express the coordinate in `target`.
    #[must_use]
    pub fn to_frame(self, target: Frame) -> Self {
        Self::from_parts(crate::convert(self.coord(), self.frame(), target), target)
    }
}
