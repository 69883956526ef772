//! Test utilities for geocode providers.
//!
//! [`StubGeocodeProvider`] answers every lookup with a pre-configured
//! response and records the coordinates it was asked about. A gated stub
//! holds each lookup until the test releases it, which lets tests overlap
//! queries deterministically.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use geo::Coord;
use geoshift_core::Frame;
use tokio::sync::Semaphore;

use crate::response::{GeocodeResponse, ProviderLocation};
use crate::{GeocodeError, GeocodeProvider};

/// Stub `GeocodeProvider` for testing.
#[derive(Debug)]
pub struct StubGeocodeProvider {
    response: Result<GeocodeResponse, GeocodeError>,
    native_frame: Frame,
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<Coord>>,
}

impl StubGeocodeProvider {
    /// Create a provider that returns `response` for every lookup.
    #[must_use]
    pub fn with_response(response: GeocodeResponse) -> Self {
        Self::from_result(Ok(response))
    }

    /// Create a provider that resolves everything to `formatted_address`.
    #[must_use]
    pub fn with_address(formatted_address: impl Into<String>) -> Self {
        Self::with_response(GeocodeResponse {
            formatted_address: Some(formatted_address.into()),
            ..GeocodeResponse::default()
        })
    }

    /// Create a provider with a structured address at `location`.
    #[must_use]
    pub fn with_detailed_address(formatted_address: impl Into<String>, location: Coord) -> Self {
        let mut component = serde_json::Map::new();
        component.insert("country".to_owned(), serde_json::Value::from("中国"));
        Self::with_response(GeocodeResponse {
            formatted_address: Some(formatted_address.into()),
            address_component: Some(component),
            location: Some(ProviderLocation {
                lat: location.y,
                lng: location.x,
            }),
        })
    }

    /// Create a provider that fails every lookup with `error`.
    #[must_use]
    pub fn with_error(error: GeocodeError) -> Self {
        Self::from_result(Err(error))
    }

    fn from_result(response: Result<GeocodeResponse, GeocodeError>) -> Self {
        Self {
            response,
            native_frame: Frame::PROVIDER_NATIVE,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Report `frame` as the native frame.
    #[must_use]
    pub fn with_native_frame(mut self, frame: Frame) -> Self {
        self.native_frame = frame;
        self
    }

    /// Hold every lookup until [`Self::release`] lets it through.
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `lookups` held lookups complete.
    pub fn release(&self, lookups: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(lookups);
        }
    }

    /// Coordinates received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Coord> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl GeocodeProvider for StubGeocodeProvider {
    fn native_frame(&self) -> Frame {
        self.native_frame
    }

    async fn reverse_geocode(&self, location: Coord) -> Result<GeocodeResponse, GeocodeError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.response.clone()
    }
}
