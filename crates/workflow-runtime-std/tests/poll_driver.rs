use std::thread;

use workflow_core::{Action, ActionOutcome};
use workflow_runtime_std::StdRuntime;
use workflow_testing::{EchoChild, Marker, RecordingRenderer};

type Update = Action<Vec<String>, String>;

fn append(entry: String) -> Update {
    Action::new(format!("append({entry})"), move |mut state: Vec<String>| {
        state.push(entry.clone());
        ActionOutcome {
            state,
            output: None,
        }
    })
}

#[test]
fn polling_driver_sees_background_delivery() {
    let runtime = StdRuntime::new();
    let mut context = runtime.render_context::<Update, _>(RecordingRenderer::echo());
    let rendering = context
        .render_child(&EchoChild, "child".to_string(), append)
        .expect("child");
    assert_eq!(rendering, Marker("child".to_string()));
    let handler = context
        .register_event_handler(|click: &'static str| append(click.to_string()))
        .expect("handler");
    let behavior = context.build_behavior().expect("build");

    assert!(runtime.poll_behavior(&behavior).is_none());
    assert!(!runtime.take_dispatch_request());

    thread::scope(|scope| {
        scope.spawn(|| {
            behavior.bindings()[0]
                .deliver("background".to_string())
                .expect("background delivery wins");
        });
    });

    assert!(handler.call("click").is_err());
    assert!(runtime.take_dispatch_request());

    let delivery = runtime.poll_behavior(&behavior).expect("ready");
    assert_eq!(delivery.description(), "append(background)");
    let outcome = delivery.update().apply(vec!["start".to_string()]);
    assert_eq!(outcome.state, vec!["start".to_string(), "background".to_string()]);
}

#[test]
fn poll_waker_requests_dispatch_for_plain_contexts() {
    let runtime = StdRuntime::new();
    let mut context = workflow_core::RenderContext::<Update, _>::new(RecordingRenderer::new());
    let sink = context.register_action_sink().expect("sink");
    let behavior = context.build_behavior().expect("build");

    assert!(runtime.poll_behavior(&behavior).is_none());
    sink.send(append("late".to_string())).expect("send");
    assert!(runtime.take_dispatch_request(), "registered waker should fire");
    assert!(runtime.poll_behavior(&behavior).is_some());
}
