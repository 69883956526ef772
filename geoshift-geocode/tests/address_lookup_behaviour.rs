//! Behavioural tests for address lookup through [`GeocodeOrchestrator`].
//!
//! These tests use [`StubGeocodeProvider`] so no geocode service is needed.

use std::cell::RefCell;
use std::time::Duration;

use geo::Coord;
use geoshift_core::Frame;
use geoshift_geocode::test_support::StubGeocodeProvider;
use geoshift_geocode::{
    Delivery, GeocodeError, GeocodeOrchestrator, GeocodeOutcome, GeocodeRequest,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

const FORBIDDEN_CITY: Coord = Coord {
    x: 116.403_963,
    y: 39.915_119,
};
const ADDRESS: &str = "北京市东城区景山前街4号";
const KEY_REJECTED: &str = "APP不存在，AK有误请检查再重试";

struct LookupWorld {
    runtime: Runtime,
    provider: RefCell<Option<StubGeocodeProvider>>,
    deliveries: RefCell<Vec<Delivery>>,
}

#[fixture]
fn world() -> LookupWorld {
    LookupWorld {
        runtime: Runtime::new().expect("build runtime"),
        provider: RefCell::new(None),
        deliveries: RefCell::new(Vec::new()),
    }
}

impl LookupWorld {
    fn set_provider(&self, provider: StubGeocodeProvider) {
        *self.provider.borrow_mut() = Some(provider);
    }

    /// Submit `requests` back to back and wait for every sink to settle.
    fn look_up(&self, requests: Vec<GeocodeRequest>) {
        let provider = self
            .provider
            .borrow_mut()
            .take()
            .expect("provider must be initialised");
        let orchestrator = GeocodeOrchestrator::new(provider, self.runtime.handle().clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let count = requests.len();
        for request in requests {
            orchestrator.submit(request, tx.clone());
        }
        drop(tx);
        orchestrator.provider().release(count);

        let deliveries = self.runtime.block_on(async {
            let mut deliveries = Vec::new();
            while let Some(delivery) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("sinks should settle")
            {
                deliveries.push(delivery);
            }
            deliveries
        });
        *self.deliveries.borrow_mut() = deliveries;
    }

    fn only_delivery(&self) -> Delivery {
        let deliveries = self.deliveries.borrow();
        assert_eq!(deliveries.len(), 1, "expected one delivery, got {deliveries:?}");
        deliveries[0].clone()
    }
}

fn lookup(detail: bool) -> GeocodeRequest {
    GeocodeRequest::new(FORBIDDEN_CITY, Frame::Bd09).with_detail(detail)
}

// --- Given steps ---

#[given("a provider that knows the Forbidden City")]
fn provider_knows(#[from(world)] world: &LookupWorld) {
    world.set_provider(StubGeocodeProvider::with_detailed_address(
        ADDRESS,
        FORBIDDEN_CITY,
    ));
}

#[given("a slow provider that knows the Forbidden City")]
fn slow_provider_knows(#[from(world)] world: &LookupWorld) {
    world.set_provider(StubGeocodeProvider::with_address(ADDRESS).gated());
}

#[given("a provider that rejects the access key")]
fn provider_rejects_key(#[from(world)] world: &LookupWorld) {
    world.set_provider(StubGeocodeProvider::with_error(GeocodeError::Provider {
        status: "200".into(),
        message: KEY_REJECTED.into(),
    }));
}

#[given("a provider that cannot be reached")]
fn provider_unreachable(#[from(world)] world: &LookupWorld) {
    world.set_provider(StubGeocodeProvider::with_error(GeocodeError::Network {
        url: "http://api.map.baidu.com/geocoder/v2/".into(),
        message: "dns error".into(),
    }));
}

// --- When steps ---

#[when("I look up the Forbidden City")]
fn look_up_plain(#[from(world)] world: &LookupWorld) {
    world.look_up(vec![lookup(false)]);
}

#[when("I look up the Forbidden City in detail")]
fn look_up_detail(#[from(world)] world: &LookupWorld) {
    world.look_up(vec![lookup(true)]);
}

#[when("I look up the Forbidden City twice before it answers")]
fn look_up_twice(#[from(world)] world: &LookupWorld) {
    world.look_up(vec![
        lookup(false).with_correlation_id("first"),
        lookup(false).with_correlation_id("second"),
    ]);
}

// --- Then steps ---

#[then("exactly one address is delivered")]
fn one_address(#[from(world)] world: &LookupWorld) {
    assert!(world.only_delivery().outcome.is_success());
}

#[then("the delivered address has no structure")]
fn plain_address(#[from(world)] world: &LookupWorld) {
    match world.only_delivery().outcome {
        GeocodeOutcome::Success(address) => {
            assert_eq!(address.formatted_address.as_deref(), Some(ADDRESS));
            assert_eq!(address.address_component, None);
            assert_eq!(address.location, None);
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[then("the delivered address carries its location")]
fn detailed_address(#[from(world)] world: &LookupWorld) {
    match world.only_delivery().outcome {
        GeocodeOutcome::Success(address) => {
            let json = address.to_json();
            assert_eq!(json["formatted_address"], ADDRESS);
            assert_eq!(json["location"]["lng"], FORBIDDEN_CITY.x);
            assert_eq!(json["location"]["lat"], FORBIDDEN_CITY.y);
            assert!(json.get("addressComponent").is_some());
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[then("the failure reason is the provider message")]
fn provider_message(#[from(world)] world: &LookupWorld) {
    assert_eq!(
        world.only_delivery().outcome,
        GeocodeOutcome::Failure {
            reason: KEY_REJECTED.to_owned()
        }
    );
}

#[then("the failure reason is network error")]
fn network_error(#[from(world)] world: &LookupWorld) {
    assert_eq!(
        world.only_delivery().outcome,
        GeocodeOutcome::Failure {
            reason: "network error".to_owned()
        }
    );
}

#[then("the delivery belongs to the second lookup")]
fn second_lookup(#[from(world)] world: &LookupWorld) {
    assert_eq!(
        world.only_delivery().correlation_id.as_deref(),
        Some("second")
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/address_lookup.feature", name = $title)]
        fn $fn_name(world: LookupWorld) {
            let _ = world;
        }
    };
}

register_scenario!(plain_lookup, "resolving a plain address");
register_scenario!(detailed_lookup, "resolving a detailed address");
register_scenario!(provider_failure, "reporting a provider failure");
register_scenario!(transport_failure, "reporting a transport failure");
register_scenario!(superseded_lookup, "discarding a superseded lookup");
