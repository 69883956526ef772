//! Re-express live location fixes in a caller-selected frame.
//!
//! Location providers report fixes in [`Frame::PROVIDER_NATIVE`]. The
//! [`LiveLocationAdapter`] converts every fix to its target frame through
//! [`convert()`](crate::convert()) and hands the result to a
//! [`LocationSubscriber`]. When the target is the native frame the dispatch
//! degenerates to identity, so there is a single code path.

use geo::Coord;
use log::warn;

use crate::{ConversionError, Frame, FramePolicy, convert};

/// A raw fix as delivered by the location provider, in the native frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Accuracy radius in metres.
    pub radius: f32,
}

/// A fix converted into the adapter's target frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertedFix {
    /// Frame the position is expressed in.
    pub frame: Frame,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Accuracy radius in metres, passed through unchanged.
    pub radius: f32,
}

/// Receives converted fixes.
pub trait LocationSubscriber: Send + Sync {
    /// Called once per raw fix.
    fn on_fix(&self, fix: ConvertedFix);
}

impl<F> LocationSubscriber for F
where
    F: Fn(ConvertedFix) + Send + Sync,
{
    fn on_fix(&self, fix: ConvertedFix) {
        self(fix);
    }
}

/// Converts provider fixes to a target frame and forwards them.
///
/// # Examples
///
/// ```
/// use std::sync::Mutex;
/// use geoshift_core::{Frame, LiveLocationAdapter};
/// use geoshift_core::live::{ConvertedFix, RawFix};
///
/// let seen = Mutex::new(Vec::new());
/// let adapter = LiveLocationAdapter::new(|fix: ConvertedFix| {
///     seen.lock().expect("lock").push(fix);
/// })
/// .with_target_frame(Frame::Gcj02);
///
/// adapter.on_fix(RawFix { latitude: 39.915, longitude: 116.404, radius: 12.5 });
/// drop(adapter);
/// let fixes = seen.into_inner().expect("lock");
/// assert_eq!(fixes.len(), 1);
/// assert_eq!(fixes[0].frame, Frame::Gcj02);
/// assert_eq!(fixes[0].radius, 12.5);
/// ```
#[derive(Debug)]
pub struct LiveLocationAdapter<S> {
    subscriber: S,
    target_frame: Frame,
}

impl<S: LocationSubscriber> LiveLocationAdapter<S> {
    /// Create an adapter that forwards fixes in the native frame.
    #[must_use]
    pub const fn new(subscriber: S) -> Self {
        Self {
            subscriber,
            target_frame: Frame::PROVIDER_NATIVE,
        }
    }

    /// Select the target frame.
    #[must_use]
    pub const fn with_target_frame(mut self, frame: Frame) -> Self {
        self.target_frame = frame;
        self
    }

    /// Change the target frame of a running adapter.
    pub const fn set_target_frame(&mut self, frame: Frame) {
        self.target_frame = frame;
    }

    /// Frame fixes are delivered in.
    #[must_use]
    pub const fn target_frame(&self) -> Frame {
        self.target_frame
    }

    /// Convert `raw` and deliver it to the subscriber.
    pub fn on_fix(&self, raw: RawFix) {
        let native = Coord {
            x: raw.longitude,
            y: raw.latitude,
        };
        let converted = convert(native, Frame::PROVIDER_NATIVE, self.target_frame);
        self.subscriber.on_fix(ConvertedFix {
            frame: self.target_frame,
            longitude: converted.x,
            latitude: converted.y,
            radius: raw.radius,
        });
    }

    /// Borrow the subscriber.
    pub const fn subscriber(&self) -> &S {
        &self.subscriber
    }
}

/// Resolve a target frame name.
///
/// Under [`FramePolicy::Lenient`] an unknown name falls back to the native
/// frame so fixes keep flowing unconverted.
///
/// # Errors
///
/// Returns [`ConversionError::UnknownFrame`] for unknown names under
/// [`FramePolicy::Strict`].
pub fn parse_target_frame(name: &str, policy: FramePolicy) -> Result<Frame, ConversionError> {
    match name.parse::<Frame>() {
        Ok(frame) => Ok(frame),
        Err(err) if policy == FramePolicy::Strict => Err(err.into()),
        Err(err) => {
            warn!("{err}; delivering fixes in {}", Frame::PROVIDER_NATIVE);
            Ok(Frame::PROVIDER_NATIVE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSubscriber;
    use crate::transform;
    use rstest::{fixture, rstest};

    #[fixture]
    fn raw_fix() -> RawFix {
        RawFix {
            latitude: 39.915,
            longitude: 116.404,
            radius: 30.0,
        }
    }

    #[rstest]
    fn defaults_to_native_frame_identity(raw_fix: RawFix) {
        let adapter = LiveLocationAdapter::new(RecordingSubscriber::default());
        assert_eq!(adapter.target_frame(), Frame::Bd09);

        adapter.on_fix(raw_fix);

        let fixes = adapter.subscriber().fixes();
        assert_eq!(
            fixes,
            vec![ConvertedFix {
                frame: Frame::Bd09,
                longitude: raw_fix.longitude,
                latitude: raw_fix.latitude,
                radius: raw_fix.radius,
            }]
        );
    }

    #[rstest]
    #[case(Frame::Wgs84)]
    #[case(Frame::Gcj02)]
    fn converts_to_selected_frame(raw_fix: RawFix, #[case] target: Frame) {
        let adapter =
            LiveLocationAdapter::new(RecordingSubscriber::default()).with_target_frame(target);

        adapter.on_fix(raw_fix);

        let native = Coord {
            x: raw_fix.longitude,
            y: raw_fix.latitude,
        };
        let expected = match target {
            Frame::Wgs84 => transform::bd09_to_wgs84(native),
            _ => transform::bd09_to_gcj02(native),
        };
        let fixes = adapter.subscriber().fixes();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].longitude, expected.x);
        assert_eq!(fixes[0].latitude, expected.y);
        assert_eq!(fixes[0].radius, raw_fix.radius);
    }

    #[rstest]
    fn target_frame_can_change_between_fixes(raw_fix: RawFix) {
        let mut adapter = LiveLocationAdapter::new(RecordingSubscriber::default());
        adapter.on_fix(raw_fix);
        adapter.set_target_frame(Frame::Wgs84);
        adapter.on_fix(raw_fix);

        let frames: Vec<Frame> = adapter
            .subscriber()
            .fixes()
            .iter()
            .map(|fix| fix.frame)
            .collect();
        assert_eq!(frames, vec![Frame::Bd09, Frame::Wgs84]);
    }

    #[rstest]
    fn lenient_target_falls_back_to_native() {
        let frame = parse_target_frame("utm", FramePolicy::Lenient).expect("lenient fallback");
        assert_eq!(frame, Frame::PROVIDER_NATIVE);
    }

    #[rstest]
    fn strict_target_rejects_unknown_name() {
        let err = parse_target_frame("utm", FramePolicy::Strict).expect_err("strict rejects");
        assert!(matches!(err, ConversionError::UnknownFrame(_)));
    }
}
