//! Concurrency tests for [`GeocodeOrchestrator`].

use std::time::Duration;

use geo::Coord;
use geoshift_core::Frame;
use geoshift_core::transform::wgs84_to_bd09;
use geoshift_geocode::test_support::StubGeocodeProvider;
use geoshift_geocode::{
    Delivery, GeocodeError, GeocodeOrchestrator, GeocodeOutcome, GeocodeRequest,
    NETWORK_ERROR_REASON,
};
use rstest::{fixture, rstest};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

const BEIJING_BD09: Coord = Coord {
    x: 116.4166,
    y: 39.9227,
};

#[fixture]
fn request() -> GeocodeRequest {
    GeocodeRequest::new(BEIJING_BD09, Frame::Bd09)
}

/// Collect deliveries until every sink has been consumed or dropped.
async fn drain(mut rx: mpsc::UnboundedReceiver<Delivery>) -> Vec<Delivery> {
    let mut deliveries = Vec::new();
    while let Some(delivery) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("sinks should settle")
    {
        deliveries.push(delivery);
    }
    deliveries
}

async fn wait_until_idle<P>(orchestrator: &GeocodeOrchestrator<P>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !orchestrator.is_idle() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("orchestrator should become idle");
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_submit_supersedes_the_first(request: GeocodeRequest) {
    let provider = StubGeocodeProvider::with_address("北京市东城区").gated();
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let (tx, rx) = mpsc::unbounded_channel();

    let first = orchestrator.submit(request.clone().with_correlation_id("a"), tx.clone());
    let second = orchestrator.submit(request.with_correlation_id("b"), tx);
    assert_ne!(first, second);
    assert_eq!(orchestrator.current_query(), Some(second));

    orchestrator.provider().release(2);
    let deliveries = drain(rx).await;

    assert_eq!(deliveries.len(), 1, "only the latest query delivers");
    let delivery = &deliveries[0];
    assert_eq!(delivery.query_id, second);
    assert_eq!(delivery.correlation_id.as_deref(), Some("b"));
    assert!(delivery.outcome.is_success());
    wait_until_idle(&orchestrator).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burst_of_submits_delivers_only_the_last(request: GeocodeRequest) {
    let provider = StubGeocodeProvider::with_address("x").gated();
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let (tx, rx) = mpsc::unbounded_channel();

    let mut last = None;
    for n in 0..16 {
        orchestrator.provider().release(1);
        last = Some(orchestrator.submit(
            request.clone().with_correlation_id(n.to_string()),
            tx.clone(),
        ));
    }
    drop(tx);
    orchestrator.provider().release(16);

    let deliveries = drain(rx).await;
    let last = last.expect("at least one submit");
    assert!(
        deliveries.iter().all(|delivery| delivery.query_id <= last),
        "no delivery may come from an unknown query"
    );
    assert!(
        deliveries.iter().any(|delivery| delivery.query_id == last),
        "the final query always delivers"
    );
    let mut ids: Vec<_> = deliveries.iter().map(|delivery| delivery.query_id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), deliveries.len(), "each query delivers at most once");
}

#[rstest]
#[tokio::test]
async fn transport_failure_reports_network_error_and_stays_usable(request: GeocodeRequest) {
    let provider = StubGeocodeProvider::with_error(GeocodeError::Network {
        url: "http://geo.example.com/".into(),
        message: "connection refused".into(),
    });
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());

    for _ in 0..2 {
        let (tx, rx) = tokio::sync::oneshot::channel();
        orchestrator.submit(request.clone(), tx);
        let delivery = rx.await.expect("failure is delivered");
        assert_eq!(
            delivery.outcome,
            GeocodeOutcome::Failure {
                reason: NETWORK_ERROR_REASON.to_owned()
            }
        );
    }
    wait_until_idle(&orchestrator).await;
}

#[rstest]
#[tokio::test]
async fn provider_failure_carries_its_message(request: GeocodeRequest) {
    let provider = StubGeocodeProvider::with_error(GeocodeError::Provider {
        status: "302".into(),
        message: "天配额超限，限制访问".into(),
    });
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let (tx, rx) = tokio::sync::oneshot::channel();

    orchestrator.submit(request, tx);

    let delivery = rx.await.expect("failure is delivered");
    assert_eq!(
        delivery.outcome,
        GeocodeOutcome::Failure {
            reason: "天配额超限，限制访问".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn shutdown_suppresses_delivery(request: GeocodeRequest) {
    let provider = StubGeocodeProvider::with_address("x").gated();
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let (tx, rx) = mpsc::unbounded_channel();

    orchestrator.submit(request, tx);
    orchestrator.shutdown();
    orchestrator.shutdown();
    assert!(orchestrator.is_idle());

    orchestrator.provider().release(1);
    assert!(drain(rx).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn dropping_the_orchestrator_suppresses_delivery(request: GeocodeRequest) {
    let provider = StubGeocodeProvider::with_address("x").gated();
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let (tx, rx) = mpsc::unbounded_channel();

    orchestrator.submit(request, tx);
    drop(orchestrator);

    assert!(drain(rx).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn coordinates_are_normalised_to_the_native_frame() {
    let provider = StubGeocodeProvider::with_address("x");
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let wgs84 = Coord {
        x: 116.404,
        y: 39.915,
    };
    let (tx, rx) = tokio::sync::oneshot::channel();

    orchestrator.submit(GeocodeRequest::new(wgs84, Frame::Wgs84), tx);
    rx.await.expect("lookup delivers");

    assert_eq!(orchestrator.provider().calls(), vec![wgs84_to_bd09(wgs84)]);
}

#[rstest]
#[tokio::test]
async fn closure_sinks_receive_the_detailed_address() {
    let provider = StubGeocodeProvider::with_detailed_address("北京市东城区", BEIJING_BD09);
    let orchestrator = GeocodeOrchestrator::new(provider, Handle::current());
    let (tx, rx) = tokio::sync::oneshot::channel();

    orchestrator.submit(
        GeocodeRequest::new(BEIJING_BD09, Frame::Bd09).with_detail(true),
        move |delivery: Delivery| {
            let _ = tx.send(delivery);
        },
    );

    let delivery = rx.await.expect("lookup delivers");
    match delivery.outcome {
        GeocodeOutcome::Success(address) => {
            assert_eq!(address.formatted_address.as_deref(), Some("北京市东城区"));
            assert!(address.address_component.is_some());
            let location = address.location.expect("detailed lookups carry a location");
            assert_eq!(location.longitude(), BEIJING_BD09.x);
            assert_eq!(location.latitude(), BEIJING_BD09.y);
        }
        other => panic!("expected Success, got {other:?}"),
    }
}
