use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use workflow_core::{ChildRenderError, ChildRenderer, Identity, RuntimeScheduler, Workflow};

type ErasedRendering = Box<dyn Any>;
type Responder =
    Box<dyn FnMut(&dyn Any, &dyn Any, &Identity) -> Result<ErasedRendering, ChildRenderError>>;

/// [`ChildRenderer`] double that renders children through per-type responders
/// and records every identity it was asked to render.
///
/// Rendering a child type with no responder fails, which doubles as a way to
/// exercise renderer failures.
#[derive(Default)]
pub struct RecordingRenderer {
    responders: HashMap<TypeId, Responder>,
    calls: Vec<Identity>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with<C: Workflow>(
        mut self,
        mut render: impl FnMut(&C, &C::Props, &Identity) -> C::Rendering + 'static,
    ) -> Self {
        let responder = move |child: &dyn Any,
                              props: &dyn Any,
                              identity: &Identity|
              -> Result<ErasedRendering, ChildRenderError> {
            let child = child
                .downcast_ref::<C>()
                .ok_or("child type does not match responder")?;
            let props = props
                .downcast_ref::<C::Props>()
                .ok_or("props type does not match responder")?;
            Ok(Box::new(render(child, props, identity)) as ErasedRendering)
        };
        self.responders
            .insert(TypeId::of::<C>(), Box::new(responder));
        self
    }

    /// Makes every render of `C` fail with `message`.
    pub fn fail_with<C: Workflow>(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        let responder = move |_: &dyn Any,
                              _: &dyn Any,
                              _: &Identity|
              -> Result<ErasedRendering, ChildRenderError> { Err(message.clone().into()) };
        self.responders
            .insert(TypeId::of::<C>(), Box::new(responder));
        self
    }

    /// Identities rendered so far, in call order.
    pub fn calls(&self) -> &[Identity] {
        &self.calls
    }
}

impl ChildRenderer for RecordingRenderer {
    fn render_child<C: Workflow>(
        &mut self,
        child: &C,
        props: &C::Props,
        identity: &Identity,
    ) -> Result<C::Rendering, ChildRenderError> {
        let responder = self
            .responders
            .get_mut(&TypeId::of::<C>())
            .ok_or_else(|| format!("no rendering registered for {identity}"))?;
        let rendering = responder(child, props, identity)?;
        self.calls.push(identity.clone());
        rendering
            .downcast::<C::Rendering>()
            .map(|rendering| *rendering)
            .map_err(|_| format!("responder for {identity} returned the wrong rendering type").into())
    }
}

impl fmt::Debug for RecordingRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRenderer")
            .field("responders", &self.responders.len())
            .field("calls", &self.calls)
            .finish()
    }
}

/// Counts dispatch requests.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    dispatches: AtomicUsize,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for RecordingScheduler {
    fn schedule_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
    }
}

/// Child workflow used by harness tests: string props, string output, and a
/// rendering that just echoes a marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoChild;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(pub String);

impl Workflow for EchoChild {
    type Props = String;
    type Output = String;
    type Rendering = Marker;
}

impl RecordingRenderer {
    /// Renderer that renders [`EchoChild`] as `Marker("<props>")`.
    pub fn echo() -> Self {
        Self::new().respond_with(|_: &EchoChild, props: &String, _: &Identity| Marker(props.clone()))
    }
}
