//! Event delivery: concurrent fan-out, full join, aggregated failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use courier::testing::RecordingHandler;
use courier::{
    AnyMessage, Catalog, HandlerRegistry, MessageRouter, RouteFailure, StaticModule,
    StaticResolver, TypeIdentity,
};

mod common;
use common::{
    FailingMultipliedEventHandler, MultipliedAuditHandler, MultipliedEvent,
    MultipliedEventHandler, SubtractedEvent,
};

fn router_for(module: StaticModule, resolver: StaticResolver) -> MessageRouter {
    let catalog = Catalog::scan(&[&module]).unwrap();
    let registry = HandlerRegistry::build(&catalog, &resolver).unwrap();
    MessageRouter::new(registry)
}

#[tokio::test]
async fn mixed_outcome_fanout_reports_only_the_failures_after_full_join() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let module = StaticModule::builder("arithmetic")
        .event::<MultipliedEvent>()
        .event_handler::<MultipliedEventHandler, MultipliedEvent>()
        .event_handler::<MultipliedAuditHandler, MultipliedEvent>()
        .event_handler::<FailingMultipliedEventHandler, MultipliedEvent>()
        .build();
    let resolver = StaticResolver::new()
        .with_event_handler::<MultipliedEventHandler, MultipliedEvent>(MultipliedEventHandler {
            invocations: Arc::clone(&invocations),
        })
        .with_event_handler::<MultipliedAuditHandler, MultipliedEvent>(MultipliedAuditHandler {
            invocations: Arc::clone(&invocations),
        })
        .with_event_handler::<FailingMultipliedEventHandler, MultipliedEvent>(
            FailingMultipliedEventHandler {
                invocations: Arc::clone(&invocations),
            },
        );
    let router = router_for(module, resolver);

    let completed = Arc::new(AtomicUsize::new(0));
    let captured = Arc::new(Mutex::new(Vec::new()));
    let on_complete = {
        let completed = Arc::clone(&completed);
        move || {
            completed.fetch_add(1, Ordering::SeqCst);
        }
    };
    let on_error = {
        let captured = Arc::clone(&captured);
        let invocations = Arc::clone(&invocations);
        move |_message, failures: Vec<RouteFailure>| {
            // the failing handler finishes first, but the continuation must
            // only run once every invocation is terminal
            assert_eq!(invocations.load(Ordering::SeqCst), 3);
            captured.lock().unwrap().push(failures);
        }
    };

    router
        .route(
            AnyMessage::new(MultipliedEvent {
                multiplicand: 2,
                multiplier: 3,
                product: 6,
            }),
            on_complete,
            on_error,
        )
        .await;

    assert_eq!(completed.load(Ordering::SeqCst), 0);
    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let failures = &captured[0];
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        RouteFailure::HandlerExecution { handler, .. }
            if handler == TypeIdentity::of::<FailingMultipliedEventHandler>()
    ));
}

#[tokio::test]
async fn event_with_no_handlers_completes_without_invocation() {
    let module = StaticModule::builder("arithmetic")
        .event::<SubtractedEvent>()
        .build();
    let router = router_for(module, StaticResolver::new());

    let completed = Arc::new(AtomicUsize::new(0));
    let errored = Arc::new(AtomicUsize::new(0));
    let on_complete = {
        let completed = Arc::clone(&completed);
        move || {
            completed.fetch_add(1, Ordering::SeqCst);
        }
    };
    let on_error = {
        let errored = Arc::clone(&errored);
        move |_message, _failures: Vec<RouteFailure>| {
            errored.fetch_add(1, Ordering::SeqCst);
        }
    };

    router
        .route(
            AnyMessage::new(SubtractedEvent {
                minuend: 5,
                subtrahend: 2,
                difference: 3,
            }),
            on_complete,
            on_error,
        )
        .await;

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(errored.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_successful_handlers_complete_the_route() {
    let recorder = RecordingHandler::<MultipliedEvent>::new();
    let invocations = Arc::new(AtomicUsize::new(0));
    let module = StaticModule::builder("arithmetic")
        .event::<MultipliedEvent>()
        .event_handler::<RecordingHandler<MultipliedEvent>, MultipliedEvent>()
        .event_handler::<MultipliedEventHandler, MultipliedEvent>()
        .build();
    let resolver = StaticResolver::new()
        .with_event_handler::<RecordingHandler<MultipliedEvent>, MultipliedEvent>(recorder.clone())
        .with_event_handler::<MultipliedEventHandler, MultipliedEvent>(MultipliedEventHandler {
            invocations: Arc::clone(&invocations),
        });
    let router = router_for(module, resolver);

    let event = MultipliedEvent {
        multiplicand: 4,
        multiplier: 5,
        product: 20,
    };
    router.dispatch(&AnyMessage::new(event.clone())).await.unwrap();

    assert_eq!(recorder.received(), vec![event]);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failure_count_matches_failed_handlers() {
    struct FirstFailing;
    impl courier::HandleEvent<MultipliedEvent> for FirstFailing {
        async fn handle(
            &self,
            _event: MultipliedEvent,
            _shutdown: courier::ShutdownToken,
        ) -> Result<(), courier::BoxError> {
            Err("first".into())
        }
    }

    struct SecondFailing;
    impl courier::HandleEvent<MultipliedEvent> for SecondFailing {
        async fn handle(
            &self,
            _event: MultipliedEvent,
            _shutdown: courier::ShutdownToken,
        ) -> Result<(), courier::BoxError> {
            Err("second".into())
        }
    }

    let invocations = Arc::new(AtomicUsize::new(0));
    let module = StaticModule::builder("arithmetic")
        .event::<MultipliedEvent>()
        .event_handler::<FirstFailing, MultipliedEvent>()
        .event_handler::<SecondFailing, MultipliedEvent>()
        .event_handler::<MultipliedEventHandler, MultipliedEvent>()
        .build();
    let resolver = StaticResolver::new()
        .with_event_handler::<FirstFailing, MultipliedEvent>(FirstFailing)
        .with_event_handler::<SecondFailing, MultipliedEvent>(SecondFailing)
        .with_event_handler::<MultipliedEventHandler, MultipliedEvent>(MultipliedEventHandler {
            invocations,
        });
    let router = router_for(module, resolver);

    let failures = router
        .dispatch(&AnyMessage::new(MultipliedEvent {
            multiplicand: 1,
            multiplier: 1,
            product: 1,
        }))
        .await
        .unwrap_err();

    // failures arrive in registration order, successes are discarded
    assert_eq!(failures.len(), 2);
    assert!(matches!(
        failures[0],
        RouteFailure::HandlerExecution { handler, .. }
            if handler == TypeIdentity::of::<FirstFailing>()
    ));
    assert!(matches!(
        failures[1],
        RouteFailure::HandlerExecution { handler, .. }
            if handler == TypeIdentity::of::<SecondFailing>()
    ));
}
