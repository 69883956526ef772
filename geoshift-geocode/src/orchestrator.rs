//! Single-flight reverse geocoding.
//!
//! [`GeocodeOrchestrator`] keeps at most one lookup in flight. Submitting a
//! new request retires the current one first: its cancellation token is
//! tripped, it leaves the slot, and its task is aborted. A retired query never
//! reaches its sink.
//!
//! Each lookup runs as its own Tokio task holding a weak reference to the
//! slot. When the provider answers, the task locks the slot and removes
//! itself, but only if it is still the current query and has not been
//! cancelled. That removal is the delivery boundary: once it succeeds no later
//! `submit` or `shutdown` can suppress the outcome, and once it fails the
//! outcome is discarded. The sink is invoked after the lock is released.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use geo::Coord;
use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{Delivery, GeocodeOutcome, GeocodeProvider, GeocodeRequest};

/// Identifier of a submitted query, unique per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(u64);

impl QueryId {
    /// Numeric value of the identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receives the outcome of one query.
pub trait GeocodeSink: Send + 'static {
    /// Deliver the outcome. Called at most once, and never for a query that
    /// was superseded or shut down.
    fn deliver(self, delivery: Delivery);
}

impl<F> GeocodeSink for F
where
    F: FnOnce(Delivery) + Send + 'static,
{
    fn deliver(self, delivery: Delivery) {
        self(delivery);
    }
}

impl GeocodeSink for mpsc::UnboundedSender<Delivery> {
    fn deliver(self, delivery: Delivery) {
        if let Err(err) = self.send(delivery) {
            debug!("dropping geocode delivery {}: receiver closed", err.0.query_id);
        }
    }
}

impl GeocodeSink for oneshot::Sender<Delivery> {
    fn deliver(self, delivery: Delivery) {
        if let Err(unsent) = self.send(delivery) {
            debug!("dropping geocode delivery {}: receiver closed", unsent.query_id);
        }
    }
}

struct InFlightQuery {
    id: QueryId,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl InFlightQuery {
    fn retire(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

#[derive(Default)]
struct QuerySlot {
    current: Mutex<Option<InFlightQuery>>,
}

impl QuerySlot {
    fn lock(&self) -> MutexGuard<'_, Option<InFlightQuery>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove `id` from the slot if it may still deliver.
    fn claim(&self, id: QueryId) -> Option<InFlightQuery> {
        let mut current = self.lock();
        let deliverable = current
            .as_ref()
            .is_some_and(|query| query.id == id && !query.token.is_cancelled());
        if deliverable { current.take() } else { None }
    }

    /// Clear the slot if it still holds `id`.
    fn release(&self, id: QueryId) {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|query| query.id == id) {
            *current = None;
        }
    }

    fn current_id(&self) -> Option<QueryId> {
        self.lock().as_ref().map(|query| query.id)
    }
}

/// Clears the slot entry of a task however the task ends.
struct SlotRelease {
    slot: Weak<QuerySlot>,
    id: QueryId,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.upgrade() {
            slot.release(self.id);
        }
    }
}

struct QueryTask<P: ?Sized, S> {
    provider: Arc<P>,
    slot: Weak<QuerySlot>,
    id: QueryId,
    token: CancellationToken,
    location: Coord,
    detail: bool,
    correlation_id: Option<String>,
    sink: S,
}

impl<P, S> QueryTask<P, S>
where
    P: GeocodeProvider + ?Sized,
    S: GeocodeSink,
{
    async fn run(self) {
        let Self {
            provider,
            slot,
            id,
            token,
            location,
            detail,
            correlation_id,
            sink,
        } = self;
        let _release = SlotRelease {
            slot: slot.clone(),
            id,
        };

        let result = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("geocode query {id} cancelled before completion");
                return;
            }
            result = provider.reverse_geocode(location) => result,
        };
        if let Err(err) = &result {
            warn!("geocode query {id} failed: {err}");
        }
        let outcome = GeocodeOutcome::from_result(result, detail);

        let Some(claimed) = slot.upgrade().and_then(|slot| slot.claim(id)) else {
            debug!("geocode query {id} was retired; discarding its outcome");
            return;
        };
        drop(claimed);

        debug!("delivering geocode query {id}");
        sink.deliver(Delivery {
            query_id: id,
            correlation_id,
            outcome,
        });
    }
}

/// Runs reverse geocode lookups one at a time, last request wins.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use geoshift_core::Frame;
/// use geoshift_geocode::test_support::StubGeocodeProvider;
/// use geoshift_geocode::{GeocodeOrchestrator, GeocodeOutcome, GeocodeRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = StubGeocodeProvider::with_address("北京市东城区");
/// let orchestrator = GeocodeOrchestrator::new(provider, tokio::runtime::Handle::current());
/// let (tx, rx) = tokio::sync::oneshot::channel();
///
/// orchestrator.submit(GeocodeRequest::new(Coord { x: 116.4, y: 39.9 }, Frame::Bd09), tx);
///
/// let delivery = rx.await.expect("query delivers");
/// assert!(matches!(delivery.outcome, GeocodeOutcome::Success(_)));
/// # }
/// ```
pub struct GeocodeOrchestrator<P> {
    provider: Arc<P>,
    runtime: Handle,
    slot: Arc<QuerySlot>,
    next_id: AtomicU64,
}

impl<P> GeocodeOrchestrator<P> {
    /// Cancel the in-flight query, if any, without delivering it.
    ///
    /// Calling this more than once is harmless. The orchestrator stays
    /// usable afterwards.
    pub fn shutdown(&self) {
        let retired = self.slot.lock().take();
        if let Some(query) = retired {
            debug!("shutting down geocode query {}", query.id);
            query.retire();
        }
    }

    /// Whether no query is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.slot.current_id().is_none()
    }

    /// Identifier of the query in flight, if any.
    #[must_use]
    pub fn current_query(&self) -> Option<QueryId> {
        self.slot.current_id()
    }

    /// Borrow the provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: GeocodeProvider + 'static> GeocodeOrchestrator<P> {
    /// Create an orchestrator that spawns lookups on `runtime`.
    #[must_use]
    pub fn new(provider: P, runtime: Handle) -> Self {
        Self {
            provider: Arc::new(provider),
            runtime,
            slot: Arc::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start a lookup for `request`, retiring any query still in flight.
    ///
    /// The coordinate is converted to the provider's native frame before it
    /// is sent. Returns immediately; the outcome reaches `sink` from the
    /// runtime.
    pub fn submit<S: GeocodeSink>(&self, request: GeocodeRequest, sink: S) -> QueryId {
        let id = QueryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let native = self.provider.native_frame();
        let location = request.framed().to_frame(native).coord();
        let token = CancellationToken::new();
        let task = QueryTask {
            provider: Arc::clone(&self.provider),
            slot: Arc::downgrade(&self.slot),
            id,
            token: token.clone(),
            location,
            detail: request.detail,
            correlation_id: request.correlation_id,
            sink,
        };

        let retired = {
            let mut current = self.slot.lock();
            let retired = current.take();
            if let Some(query) = &retired {
                query.token.cancel();
            }
            let handle = self.runtime.spawn(task.run());
            *current = Some(InFlightQuery { id, token, handle });
            retired
        };
        if let Some(query) = retired {
            debug!("geocode query {} superseded by {id}", query.id);
            query.retire();
        }

        debug!(
            "submitted geocode query {id} for {},{} in {native}",
            location.y, location.x
        );
        id
    }
}

impl<P> fmt::Debug for GeocodeOrchestrator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodeOrchestrator")
            .field("current_query", &self.slot.current_id())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl<P> Drop for GeocodeOrchestrator<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
