//! Test doubles shared by unit and behaviour tests.

use std::sync::{Mutex, PoisonError};

use crate::live::{ConvertedFix, LocationSubscriber};

/// `LocationSubscriber` that records every fix it receives.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    fixes: Mutex<Vec<ConvertedFix>>,
}

impl RecordingSubscriber {
    /// Snapshot of the fixes received so far, in arrival order.
    #[must_use]
    pub fn fixes(&self) -> Vec<ConvertedFix> {
        self.fixes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LocationSubscriber for RecordingSubscriber {
    fn on_fix(&self, fix: ConvertedFix) {
        self.fixes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fix);
    }
}
