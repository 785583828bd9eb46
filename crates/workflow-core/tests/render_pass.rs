use std::sync::{Arc, Barrier};
use std::thread;

use workflow_core::{Action, DeliverySource, Error, Identity, RenderContext};
use workflow_testing::{EchoChild, Marker, RecordingRenderer, RecordingScheduler};

type Update = Action<String, String>;

fn context(
    renderer: RecordingRenderer,
) -> (RenderContext<Update, RecordingRenderer>, Arc<RecordingScheduler>) {
    let scheduler = Arc::new(RecordingScheduler::new());
    let context = RenderContext::with_scheduler(renderer, scheduler.clone());
    (context, scheduler)
}

#[test]
fn renders_children_in_call_order() {
    let (mut context, _) = context(RecordingRenderer::echo());
    let mut renderings = Vec::new();
    for key in ["first", "second", "third"] {
        let rendering = context
            .register_child(&EchoChild, key.to_string(), Some(key), |output: String| {
                Update::emit_output(output)
            })
            .expect("child");
        renderings.push(rendering);
    }
    assert_eq!(
        renderings,
        vec![
            Marker("first".to_string()),
            Marker("second".to_string()),
            Marker("third".to_string()),
        ]
    );

    let calls: Vec<_> = context
        .renderer()
        .calls()
        .iter()
        .map(|identity| identity.key().map(str::to_owned))
        .collect();
    assert_eq!(
        calls,
        vec![
            Some("first".to_string()),
            Some("second".to_string()),
            Some("third".to_string()),
        ]
    );

    let behavior = context.build_behavior().expect("build");
    assert_eq!(behavior.bindings().len(), 3);
    for (binding, key) in behavior.bindings().iter().zip(["first", "second", "third"]) {
        assert_eq!(binding.identity(), &Identity::of::<EchoChild>(Some(key)));
        assert_eq!(binding.props::<String>().map(String::as_str), Some(key));
    }
}

#[test]
fn failing_renderer_aborts_only_that_child() {
    let (mut context, scheduler) =
        context(RecordingRenderer::new().fail_with::<EchoChild>("child is broken"));
    let err = context
        .render_child(&EchoChild, "props".to_string(), |output: String| {
            Update::emit_output(output)
        })
        .expect_err("render failure");
    match &err {
        Error::ChildRender { identity, source } => {
            assert_eq!(identity, &Identity::of::<EchoChild>(None));
            assert_eq!(source.to_string(), "child is broken");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(context.renderer().calls().is_empty());

    let sink = context
        .register_action_sink_with(|value: String| Update::emit_output(value))
        .expect("context stays open");
    let behavior = context.build_behavior().expect("build");
    assert!(behavior.bindings().is_empty());
    sink.send("still works".to_string()).expect("send");
    assert_eq!(scheduler.dispatch_count(), 1);
}

#[test]
fn unregistered_child_type_fails_to_render() {
    let (mut context, _) = context(RecordingRenderer::new());
    let err = context
        .render_child(&EchoChild, String::new(), |output: String| {
            Update::emit_output(output)
        })
        .expect_err("no responder");
    assert!(err.to_string().contains("no rendering registered"), "{err}");
}

#[test]
fn racing_sources_across_threads_deliver_once() {
    const ROUNDS: usize = 8;
    let (mut context, scheduler) = context(RecordingRenderer::echo());
    let handler = context
        .register_event_handler(|event: usize| Update::set_state(format!("event-{event}")))
        .expect("handler");
    let sink = context
        .register_action_sink_with(|action: usize| Update::set_state(format!("action-{action}")))
        .expect("sink");
    context
        .render_child(&EchoChild, String::new(), |output: String| {
            Update::set_state(format!("child-{output}"))
        })
        .expect("child");
    let behavior = context.build_behavior().expect("build");
    let binding = &behavior.bindings()[0];

    let barrier = Barrier::new(ROUNDS * 3);
    let results: Vec<Result<(), Error>> = thread::scope(|scope| {
        let mut handles = Vec::new();
        for round in 0..ROUNDS {
            let barrier = &barrier;
            let handler = handler.clone();
            handles.push(scope.spawn(move || {
                barrier.wait();
                handler.call(round)
            }));
            let sink = sink.clone();
            handles.push(scope.spawn(move || {
                barrier.wait();
                sink.send(round)
            }));
            handles.push(scope.spawn(move || {
                barrier.wait();
                binding.deliver(round.to_string())
            }));
        }
        handles
            .into_iter()
            .map(|handle| handle.join().expect("source panicked"))
            .collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert_eq!(scheduler.dispatch_count(), 1);

    let accepted = behavior.pending_update().expect("delivered");
    for result in &results {
        if let Err(err) = result {
            let duplicate = err.as_duplicate_delivery().expect("only duplicate deliveries");
            assert_eq!(duplicate.accepted_update(), accepted.description());
            assert_eq!(duplicate.accepted_source(), accepted.source());
        }
    }
    assert!(matches!(
        accepted.source(),
        DeliverySource::EventHandler | DeliverySource::ActionSink | DeliverySource::ChildOutput(_)
    ));
}
