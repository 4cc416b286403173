use conduit_foundation::Router;
use conduit_foundation::routing::PropertyEquals;
use conduit_kernel::config::{Format, from_str};
use conduit_kernel::message::{Envelope, PropertyScope, names};
use conduit_kernel::routing::{
    COMPOSITE_HEADER, DispatchMode, FailurePolicy, Route, RouteId, RouteInstrumentation,
    RouteOutcome, RouterConfig, RouterState, RoutingError,
};
use conduit_testing::{MockStage, assert_stage_called};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn add(router: &Router, stage: &MockStage) -> RouteId {
    router
        .add_route(Route::new(stage.clone().into_stage()))
        .unwrap()
}

#[tokio::test]
async fn one_failing_route_raises_composite_with_siblings_recorded() {
    let r1 = MockStage::replying("r1", "one");
    let r2 = MockStage::failing("r2", "boom");
    let r3 = MockStage::replying("r3", "three");

    let router = Router::multicast("orders");
    add(&router, &r1);
    let failing_id = add(&router, &r2);
    add(&router, &r3);

    let err = router.route(Envelope::new("order")).await.unwrap_err();
    let composite = err.as_composite().expect("composite failure");
    let result = composite.routing_result();

    assert_eq!(result.successes().len(), 2);
    assert!(result.success(&RouteId::Index(0)).is_some());
    assert!(result.success(&RouteId::Index(2)).is_some());
    assert_eq!(result.failures().len(), 1);
    assert!(result.failure(&failing_id).unwrap().message().contains("boom"));

    let detail = composite.detailed_message();
    assert!(detail.contains(&format!(
        "Route {failing_id}: Caught exception in Exception Strategy: boom"
    )));
    assert_stage_called!(r1, 1);
    assert_stage_called!(r2, 1);
    assert_stage_called!(r3, 1);
}

#[tokio::test]
async fn unmatched_envelope_attempts_no_route() {
    let stages: Vec<MockStage> = (0..3).map(|i| MockStage::new(&format!("r{i}"))).collect();
    let router = Router::multicast("orders");
    for stage in &stages {
        let only_eu = PropertyEquals::new(PropertyScope::Inbound, "region", "eu");
        router
            .add_route(Route::new(stage.clone().into_stage()).with_matcher(Arc::new(only_eu)))
            .unwrap();
    }

    let env = Envelope::new("x").with_property(PropertyScope::Inbound, "region", "us");
    let err = router.route(env).await.unwrap_err();
    assert!(matches!(err, RoutingError::RoutePathNotFound { .. }));
    for stage in &stages {
        assert_stage_called!(stage, 0);
    }
}

#[tokio::test]
async fn parallel_routes_work_on_isolated_copies() {
    let stages: Vec<MockStage> = ["a", "b", "c", "d"]
        .iter()
        .map(|label| MockStage::replying(label, *label).marking())
        .collect();
    let router = Router::multicast("fanout");
    for stage in &stages {
        add(&router, stage);
    }

    let original = Envelope::new("in");
    let result = router.collect(&original).await.unwrap();
    assert_eq!(result.successes().len(), stages.len());

    for (i, (id, envelope)) in result.successes().iter().enumerate() {
        assert_eq!(id, &RouteId::Index(i));
        assert_eq!(envelope.payload, json!(stages[i].label()));
        for (j, other) in stages.iter().enumerate() {
            let marked = envelope
                .property(&other.mark_key(), PropertyScope::Invocation)
                .is_some();
            assert_eq!(marked, i == j, "route {i} observed the mark of route {j}");
        }
    }
    for stage in &stages {
        assert!(
            original
                .property(&stage.mark_key(), PropertyScope::Invocation)
                .is_none()
        );
    }
}

#[tokio::test]
async fn composite_is_raised_only_under_fail_on_any() {
    let build = |policy: FailurePolicy| {
        let router = Router::sequence("seq").with_failure_policy(policy);
        add(&router, &MockStage::replying("ok", 1));
        add(&router, &MockStage::failing("bad", "broken"));
        router
    };

    let strict = build(FailurePolicy::FailOnAny);
    assert!(matches!(
        strict.route(Envelope::new(0)).await,
        Err(RoutingError::Composite(_))
    ));

    let tolerant = build(FailurePolicy::Tolerant);
    let out = tolerant
        .route(Envelope::new(0))
        .await
        .unwrap()
        .into_envelope()
        .unwrap();
    assert_eq!(out.payload, json!(1));
    assert_eq!(
        out.exception_payload.map(|p| p.kind).as_deref(),
        Some("composite_routing")
    );

    let clean = Router::sequence("seq");
    add(&clean, &MockStage::replying("ok", 1));
    assert!(clean.route(Envelope::new(0)).await.is_ok());
}

#[tokio::test]
async fn first_successful_all_failing_respects_failure_policy() {
    let build = |policy: FailurePolicy| {
        let router = Router::first_successful("fallback").with_failure_policy(policy);
        add(&router, &MockStage::failing("primary", "down"));
        add(&router, &MockStage::failing("secondary", "also down"));
        router
    };

    let err = build(FailurePolicy::FailOnAny)
        .route(Envelope::new("in"))
        .await
        .unwrap_err();
    assert_eq!(err.as_composite().unwrap().errors().len(), 2);

    let out = build(FailurePolicy::Tolerant)
        .route(Envelope::new("in"))
        .await
        .unwrap()
        .into_envelope()
        .unwrap();
    assert_eq!(out.payload, json!("in"));
    let exception = out.exception_payload.unwrap();
    assert_eq!(exception.kind, "composite_routing");
    assert!(exception.message.contains("#0: down"));
    assert!(exception.message.contains("#1: also down"));
}

#[tokio::test(start_paused = true)]
async fn diagnostics_follow_configuration_order_not_completion_order() {
    let router = Router::multicast("fanout");
    // Route 0 finishes last, route 2 first.
    for (label, delay) in [("slowest", 300), ("slower", 200), ("fast", 100)] {
        let stage = MockStage::failing(label, &format!("{label} failed"))
            .with_delay(Duration::from_millis(delay));
        add(&router, &stage);
    }

    let err = router.route(Envelope::new(1)).await.unwrap_err();
    let detail = err.detailed_message();
    let lines: Vec<&str> = detail.lines().collect();
    assert_eq!(
        lines,
        vec![
            COMPOSITE_HEADER,
            "\tRoute #0: Caught exception in Exception Strategy: slowest failed",
            "\tRoute #1: Caught exception in Exception Strategy: slower failed",
            "\tRoute #2: Caught exception in Exception Strategy: fast failed",
        ]
    );
}

#[tokio::test]
async fn several_successes_are_aggregated_in_order() {
    let router = Router::multicast("fanout");
    router
        .add_route(Route::named("billing", MockStage::replying("b", "billed").into_stage()))
        .unwrap();
    router
        .add_route(Route::named("audit", MockStage::replying("a", "audited").into_stage()))
        .unwrap();
    let swallower = MockStage::swallowing("s");
    add(&router, &swallower);

    let original = Envelope::new("order").with_correlation_id("corr-1");
    let out = router
        .route(original.clone())
        .await
        .unwrap()
        .into_envelope()
        .unwrap();

    assert_eq!(out.payload, json!(["billed", "audited"]));
    assert_eq!(out.correlation_id, "corr-1");
    assert_eq!(
        out.property(names::ROUTE_IDS, PropertyScope::Invocation),
        Some(&json!(["billing", "audit"]))
    );
    assert_stage_called!(swallower, 1);

    let result = router.collect(&original).await.unwrap();
    assert_eq!(result.swallowed(), &[RouteId::Index(2)]);
    assert_eq!(result.attempted_count(), 3);
}

#[tokio::test]
async fn routes_are_fixed_once_dispatch_started() {
    let router = Router::multicast("fanout");
    add(&router, &MockStage::new("first"));
    assert!(!router.is_started());

    let _ = router.route(Envelope::new(1)).await.unwrap();
    assert!(router.is_started());

    let err = router
        .add_route(Route::new(MockStage::new("late").into_stage()))
        .unwrap_err();
    assert!(matches!(err, RoutingError::Configuration(_)));
    assert_eq!(router.route_ids().len(), 1);
}

#[tokio::test]
async fn chaining_feeds_outputs_forward_and_stops_on_failure() {
    let first = MockStage::replying("first", "step-1");
    let second = MockStage::replying("second", "step-2");
    let router = Router::chain("pipeline");
    add(&router, &first);
    add(&router, &second);

    let out = router.route(Envelope::new("start")).await.unwrap();
    assert_eq!(out.into_envelope().unwrap().payload, json!("step-2"));
    assert_eq!(second.history()[0].payload, json!("step-1"));

    let broken = MockStage::failing("broken", "link down");
    let never = MockStage::new("never");
    let router = Router::chain("pipeline");
    add(&router, &MockStage::replying("ok", "step-1"));
    add(&router, &broken);
    add(&router, &never);

    let err = router.route(Envelope::new("start")).await.unwrap_err();
    assert_eq!(err.as_composite().unwrap().errors().len(), 1);
    assert_stage_called!(broken, 1);
    assert_stage_called!(never, 0);
}

#[tokio::test]
async fn first_successful_stops_at_first_success() {
    let primary = MockStage::failing("primary", "unreachable");
    let secondary = MockStage::replying("secondary", "served");
    let tertiary = MockStage::replying("tertiary", "unused");
    let router = Router::first_successful("fallback");
    add(&router, &primary);
    add(&router, &secondary);
    add(&router, &tertiary);

    let out = router.route(Envelope::new("req")).await.unwrap();
    assert_eq!(out.into_envelope().unwrap().payload, json!("served"));
    assert_stage_called!(primary, 1);
    assert_stage_called!(secondary, 1);
    assert_stage_called!(tertiary, 0);
}

#[tokio::test]
async fn nested_composite_renders_inner_detail() {
    let inner = Router::multicast("inner");
    add(&inner, &MockStage::failing("deep", "disk full"));
    let outer = Router::multicast("outer");
    outer
        .add_route(Route::named("archive", Arc::new(inner)))
        .unwrap();
    add(&outer, &MockStage::new("ok"));

    let err = outer.route(Envelope::new(1)).await.unwrap_err();
    let detail = err.detailed_message();
    assert!(detail.contains("\tRoute archive: Exception(s) were found for route(s):"));
    assert!(detail.contains("\tRoute #0: Caught exception in Exception Strategy: disk full"));
    assert!(!detail.contains("Caught exception in Exception Strategy: 1 of 1"));
}

#[tokio::test(start_paused = true)]
async fn timed_out_route_does_not_hold_back_siblings() {
    let router = Router::multicast("fanout").with_response_timeout(Duration::from_millis(250));
    let fast = MockStage::replying("fast", "done").with_delay(Duration::from_millis(50));
    let slow = MockStage::replying("slow", "late").with_delay(Duration::from_secs(30));
    router.add_route(Route::named("fast", fast.into_stage())).unwrap();
    router.add_route(Route::named("slow", slow.into_stage())).unwrap();

    let started = tokio::time::Instant::now();
    let err = router.route(Envelope::new(1)).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(1));

    let result = err.as_composite().unwrap().routing_result();
    assert_eq!(
        result.success(&RouteId::from("fast")).map(|e| e.payload.clone()),
        Some(json!("done"))
    );
    let failure = result.failure(&RouteId::from("slow")).unwrap();
    assert_eq!(failure.kind(), "response_timeout");
    assert!(failure.message().contains("250ms"));
}

#[tokio::test(start_paused = true)]
async fn concurrency_limit_serialises_routes() {
    let config = RouterConfig::new(DispatchMode::Parallel).with_max_concurrency(1);
    let router = Router::new("limited", config).unwrap();
    for label in ["a", "b", "c"] {
        add(
            &router,
            &MockStage::new(label).with_delay(Duration::from_millis(100)),
        );
    }

    let started = tokio::time::Instant::now();
    let _ = router.route(Envelope::new(1)).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn router_settings_load_from_toml() {
    let config: RouterConfig = from_str(
        "dispatch = \"first_successful\"\nfailure_policy = \"tolerant\"\n",
        Format::Toml,
    )
    .unwrap();
    let router = Router::new("from-config", config).unwrap();
    add(&router, &MockStage::failing("a", "no"));
    add(&router, &MockStage::replying("b", "yes"));

    let out = router.route(Envelope::new(1)).await.unwrap();
    assert_eq!(out.into_envelope().unwrap().payload, json!("yes"));
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl RouteInstrumentation for Recorder {
    fn on_state(&self, _router: &str, state: RouterState) {
        self.events.lock().push(state.to_string());
    }

    fn on_route_start(&self, _router: &str, route: &RouteId) {
        self.events.lock().push(format!("start {route}"));
    }

    fn on_route_end(&self, _router: &str, route: &RouteId, outcome: &RouteOutcome) {
        let verdict = if outcome.is_success() { "ok" } else { "err" };
        self.events.lock().push(format!("end {route} {verdict}"));
    }
}

#[tokio::test]
async fn instrumentation_sees_every_state_and_route() {
    let recorder = Arc::new(Recorder::default());
    let router = Router::sequence("seq").with_instrumentation(recorder.clone());
    add(&router, &MockStage::new("a"));
    add(&router, &MockStage::failing("b", "x"));

    let _ = router.route(Envelope::new(1)).await;
    assert_eq!(
        *recorder.events.lock(),
        vec![
            "evaluating_routes",
            "dispatching",
            "start #0",
            "end #0 ok",
            "start #1",
            "end #1 err",
            "aggregating",
            "failed",
        ]
    );
}
