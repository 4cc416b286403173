use conduit_foundation::Router;
use conduit_kernel::message::Envelope;
use conduit_kernel::routing::{Route, RouteId, RoutingResult};
use conduit_testing::MockStage;
use proptest::prelude::*;
use std::time::Duration;

/// (fails, delay in ms) per route, in configuration order.
fn route_plans() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 0u64..50), 1..8)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn router_for(plans: &[(bool, u64)]) -> Router {
    let router = Router::multicast("prop");
    for (i, (fails, delay)) in plans.iter().enumerate() {
        let label = format!("r{i}");
        let stage = if *fails {
            MockStage::failing(&label, &format!("{label} failed"))
        } else {
            MockStage::replying(&label, i)
        };
        router
            .add_route(Route::new(
                stage.with_delay(Duration::from_millis(*delay)).into_stage(),
            ))
            .unwrap();
    }
    router
}

fn collect(plans: &[(bool, u64)]) -> RoutingResult {
    let router = router_for(plans);
    runtime()
        .block_on(router.collect(&Envelope::new("in")))
        .unwrap()
}

proptest! {
    #[test]
    fn every_attempted_route_is_accounted_for(plans in route_plans()) {
        let result = collect(&plans);
        prop_assert_eq!(result.attempted_count(), plans.len());
        prop_assert_eq!(
            result.successes().len() + result.failures().len(),
            plans.len()
        );
        for (i, (fails, _)) in plans.iter().enumerate() {
            let id = RouteId::Index(i);
            prop_assert_eq!(result.failure(&id).is_some(), *fails);
            prop_assert_eq!(result.success(&id).is_some(), !*fails);
        }
    }

    #[test]
    fn composite_raised_iff_some_route_failed(plans in route_plans()) {
        let router = router_for(&plans);
        let outcome = runtime().block_on(router.route(Envelope::new("in")));
        let any_failed = plans.iter().any(|(fails, _)| *fails);
        prop_assert_eq!(outcome.is_err(), any_failed);
        if let Err(err) = outcome {
            prop_assert!(err.as_composite().is_some());
        }
    }

    #[test]
    fn results_follow_configuration_order(plans in route_plans()) {
        let result = collect(&plans);
        let expected_failures: Vec<RouteId> = plans
            .iter()
            .enumerate()
            .filter(|(_, (fails, _))| *fails)
            .map(|(i, _)| RouteId::Index(i))
            .collect();
        let expected_successes: Vec<RouteId> = plans
            .iter()
            .enumerate()
            .filter(|(_, (fails, _))| !*fails)
            .map(|(i, _)| RouteId::Index(i))
            .collect();

        let failures: Vec<RouteId> = result.failures().keys().cloned().collect();
        let successes: Vec<RouteId> = result.successes().keys().cloned().collect();
        prop_assert_eq!(failures, expected_failures);
        prop_assert_eq!(successes, expected_successes);
    }
}
