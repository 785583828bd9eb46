//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `workflow-core`. A host that drives render
//! passes constructs a [`StdRuntime`], opens each pass's
//! [`RenderContext`] through it, and learns about deliveries either by
//! polling [`StdRuntime::take_dispatch_request`] or through a registered
//! dispatch waker.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll, Waker};

use futures_task::ArcWake;
use workflow_core::{Behavior, ChildRenderer, Delivery, RenderContext, RuntimeScheduler};

type DispatchWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records dispatch requests with atomics.
///
/// It doubles as a [`Waker`] source: waking it counts as a dispatch request,
/// so a driver that polls a [`Behavior`] with [`StdScheduler::waker`] gets
/// the same signal as one relying on [`RuntimeScheduler`] notifications.
pub struct StdScheduler {
    dispatch_requested: AtomicBool,
    dispatch_waker: RwLock<Option<DispatchWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            dispatch_requested: AtomicBool::new(false),
            dispatch_waker: RwLock::new(None),
        }
    }

    /// Returns whether a dispatch has been requested since the last call.
    pub fn take_dispatch_request(&self) -> bool {
        self.dispatch_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a callback invoked whenever a dispatch is requested.
    pub fn set_dispatch_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .dispatch_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    /// Clears any registered dispatch callback.
    pub fn clear_dispatch_waker(&self) {
        *self
            .dispatch_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// A [`Waker`] that requests a dispatch when woken.
    pub fn waker(self: &Arc<Self>) -> Waker {
        futures_task::waker(Arc::clone(self))
    }

    fn wake(&self) {
        let waker = self
            .dispatch_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "dispatch_requested",
                &self.dispatch_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_dispatch(&self) {
        log::trace!("dispatch requested");
        self.dispatch_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

impl ArcWake for StdScheduler {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.schedule_dispatch();
    }
}

/// Convenience container around the standard scheduler.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self {
            scheduler: Arc::new(StdScheduler::default()),
        }
    }

    /// Opens a render pass whose delivery is reported to this runtime.
    pub fn render_context<U, R>(&self, renderer: R) -> RenderContext<U, R>
    where
        U: Send + Sync + 'static,
        R: ChildRenderer,
    {
        let scheduler: Arc<dyn RuntimeScheduler> = self.scheduler.clone();
        RenderContext::with_scheduler(renderer, scheduler)
    }

    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns whether a dispatch was requested since the last poll.
    pub fn take_dispatch_request(&self) -> bool {
        self.scheduler.take_dispatch_request()
    }

    pub fn set_dispatch_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_dispatch_waker(waker);
    }

    pub fn clear_dispatch_waker(&self) {
        self.scheduler.clear_dispatch_waker();
    }

    /// Polls `behavior` for its update, registering this runtime's waker.
    ///
    /// Returns `None` while no source has delivered. The eventual delivery
    /// requests a dispatch through the waker even for contexts that were not
    /// opened through [`StdRuntime::render_context`].
    pub fn poll_behavior<U>(&self, behavior: &Behavior<U>) -> Option<Arc<Delivery<U>>> {
        let waker = self.scheduler.waker();
        let mut cx = Context::from_waker(&waker);
        match behavior.poll_update(&mut cx) {
            Poll::Ready(delivery) => Some(delivery),
            Poll::Pending => None,
        }
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use workflow_core::Action;
    use workflow_testing::RecordingRenderer;

    use super::StdRuntime;

    type Update = Action<u32, ()>;

    #[test]
    fn delivery_requests_dispatch_once() {
        let runtime = StdRuntime::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        runtime.set_dispatch_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut context = runtime.render_context::<Update, _>(RecordingRenderer::new());
        let sink = context.register_action_sink().expect("sink");
        let behavior = context.build_behavior().expect("build");
        assert!(!runtime.take_dispatch_request());

        sink.send(Action::set_state(1)).expect("first send");
        assert!(sink.send(Action::set_state(2)).is_err());

        assert!(runtime.take_dispatch_request(), "delivery should request a dispatch");
        assert!(!runtime.take_dispatch_request());
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
        assert_eq!(
            behavior.pending_update().expect("delivered").update().apply(0).state,
            1
        );
    }

    #[test]
    fn cleared_waker_is_not_called() {
        let runtime = StdRuntime::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        runtime.set_dispatch_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        runtime.clear_dispatch_waker();

        let mut context = runtime.render_context::<Update, _>(RecordingRenderer::new());
        let sink = context.register_action_sink().expect("sink");
        sink.send(Action::noop()).expect("send");
        assert!(runtime.take_dispatch_request());
        assert_eq!(wakes.load(Ordering::SeqCst), 0);
    }
}
