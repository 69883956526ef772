//! Closed-form conversions between WGS84, GCJ02 and BD09.
//!
//! All functions take and return a [`Coord`] whose `x` is the longitude and
//! `y` the latitude, both in degrees. They are pure and never fail; NaN or
//! infinite inputs propagate through the arithmetic unchanged.
//!
//! The WGS84 ↔ GCJ02 offset only applies inside a fixed bounding box (see
//! [`out_of_china`]). Outside it both directions return the input untouched.
//!
//! [`gcj02_to_wgs84`] is an approximate inverse: it evaluates the forward
//! offset at the GCJ02 input and subtracts it, which leaves a residual error
//! of a few metres.
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use geoshift_core::transform::{gcj02_to_bd09, wgs84_to_bd09, wgs84_to_gcj02};
//!
//! let wgs84 = Coord { x: 116.404, y: 39.915 };
//! let gcj02 = wgs84_to_gcj02(wgs84);
//! assert!((gcj02.x - 116.41024).abs() < 1e-4);
//! assert_eq!(wgs84_to_bd09(wgs84), gcj02_to_bd09(gcj02));
//! ```

use std::f64::consts::PI;

use geo::Coord;

/// Angular constant used by the BD09 polar perturbation.
pub const X_PI: f64 = PI * 3000.0 / 180.0;

/// Semi-major axis of the Krasovsky 1940 ellipsoid, in metres.
pub const KRASOVSKY_SEMI_MAJOR_AXIS: f64 = 6_378_245.0;

/// First eccentricity squared of the Krasovsky 1940 ellipsoid.
pub const KRASOVSKY_ECCENTRICITY_SQUARED: f64 = 0.006_693_421_622_965_943;

const MIN_LONGITUDE: f64 = 72.004;
const MAX_LONGITUDE: f64 = 137.8347;
const MIN_LATITUDE: f64 = 0.8293;
const MAX_LATITUDE: f64 = 55.8271;

const BD09_OFFSET_LONGITUDE: f64 = 0.0065;
const BD09_OFFSET_LATITUDE: f64 = 0.006;
const BD09_RADIUS_JITTER: f64 = 0.000_02;
const BD09_ANGLE_JITTER: f64 = 0.000_003;

/// Return `true` when `coord` lies outside the region where GCJ02 applies.
///
/// The bounds themselves count as inside. NaN compares false on every side,
/// so a NaN component is treated as inside and propagates through the offset.
#[must_use]
#[expect(
    clippy::manual_range_contains,
    reason = "range checks would classify NaN as outside"
)]
pub fn out_of_china(coord: Coord) -> bool {
    coord.x < MIN_LONGITUDE
        || coord.x > MAX_LONGITUDE
        || coord.y < MIN_LATITUDE
        || coord.y > MAX_LATITUDE
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Offset in degrees that GCJ02 adds to a WGS84 position.
fn gcj02_delta(coord: Coord) -> Coord {
    let Coord { x: lon, y: lat } = coord;
    let d_lat = transform_lat(lon - 105.0, lat - 35.0);
    let d_lon = transform_lon(lon - 105.0, lat - 35.0);
    let rad_lat = lat / 180.0 * PI;
    let sin_lat = rad_lat.sin();
    let magic = 1.0 - KRASOVSKY_ECCENTRICITY_SQUARED * sin_lat * sin_lat;
    let sqrt_magic = magic.sqrt();
    let meridian = (KRASOVSKY_SEMI_MAJOR_AXIS * (1.0 - KRASOVSKY_ECCENTRICITY_SQUARED))
        / (magic * sqrt_magic)
        * PI;
    let parallel = KRASOVSKY_SEMI_MAJOR_AXIS / sqrt_magic * rad_lat.cos() * PI;
    Coord {
        x: (d_lon * 180.0) / parallel,
        y: (d_lat * 180.0) / meridian,
    }
}

/// Convert a WGS84 position to GCJ02.
#[must_use]
pub fn wgs84_to_gcj02(coord: Coord) -> Coord {
    if out_of_china(coord) {
        return coord;
    }
    let delta = gcj02_delta(coord);
    Coord {
        x: coord.x + delta.x,
        y: coord.y + delta.y,
    }
}

/// Convert a GCJ02 position back to WGS84 (approximate inverse).
#[must_use]
pub fn gcj02_to_wgs84(coord: Coord) -> Coord {
    if out_of_china(coord) {
        return coord;
    }
    let delta = gcj02_delta(coord);
    Coord {
        x: coord.x * 2.0 - (coord.x + delta.x),
        y: coord.y * 2.0 - (coord.y + delta.y),
    }
}

/// Convert a GCJ02 position to BD09.
#[must_use]
pub fn gcj02_to_bd09(coord: Coord) -> Coord {
    let Coord { x, y } = coord;
    let z = (x * x + y * y).sqrt() + BD09_RADIUS_JITTER * (y * X_PI).sin();
    let theta = y.atan2(x) + BD09_ANGLE_JITTER * (x * X_PI).cos();
    Coord {
        x: z * theta.cos() + BD09_OFFSET_LONGITUDE,
        y: z * theta.sin() + BD09_OFFSET_LATITUDE,
    }
}

/// Convert a BD09 position to GCJ02.
#[must_use]
pub fn bd09_to_gcj02(coord: Coord) -> Coord {
    let x = coord.x - BD09_OFFSET_LONGITUDE;
    let y = coord.y - BD09_OFFSET_LATITUDE;
    let z = (x * x + y * y).sqrt() - BD09_RADIUS_JITTER * (y * X_PI).sin();
    let theta = y.atan2(x) - BD09_ANGLE_JITTER * (x * X_PI).cos();
    Coord {
        x: z * theta.cos(),
        y: z * theta.sin(),
    }
}

/// Convert a WGS84 position to BD09 via GCJ02.
#[must_use]
pub fn wgs84_to_bd09(coord: Coord) -> Coord {
    gcj02_to_bd09(wgs84_to_gcj02(coord))
}

/// Convert a BD09 position to WGS84 via GCJ02.
#[must_use]
pub fn bd09_to_wgs84(coord: Coord) -> Coord {
    gcj02_to_wgs84(bd09_to_gcj02(coord))
}
