//! The mutable side of a render pass.
//!
//! A [`RenderContext`] is opened for one node, handed to the node's render
//! logic, and closed with [`RenderContext::build_behavior`]. While open it
//! hands out event handlers and action sinks, and renders children through
//! the host's [`ChildRenderer`]. Every source it hands out shares a single
//! [`UpdateCell`], so at most one of them delivers the node's next update.

use std::fmt;
use std::sync::Arc;

use crate::collections::map::HashSet;
use crate::handler::{EventHandler, Sink};
use crate::platform::RuntimeScheduler;
use crate::update_cell::UpdateCell;
use crate::{Behavior, ChildBinding, ChildRenderer, Error, Identity, Workflow};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    Closed,
}

pub struct RenderContext<U, R> {
    lifecycle: Lifecycle,
    renderer: R,
    cell: Arc<UpdateCell<U>>,
    bindings: Vec<ChildBinding<U>>,
    identities: HashSet<Identity>,
}

impl<U, R> RenderContext<U, R>
where
    U: Send + Sync + 'static,
    R: ChildRenderer,
{
    pub fn new(renderer: R) -> Self {
        Self::with_cell(renderer, UpdateCell::new())
    }

    /// Opens a context whose delivery is reported to `scheduler`.
    pub fn with_scheduler(renderer: R, scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self::with_cell(renderer, UpdateCell::with_scheduler(scheduler))
    }

    fn with_cell(renderer: R, cell: UpdateCell<U>) -> Self {
        Self {
            lifecycle: Lifecycle::Open,
            renderer,
            cell: Arc::new(cell),
            bindings: Vec::new(),
            identities: HashSet::new(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle == Lifecycle::Open
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), Error> {
        match self.lifecycle {
            Lifecycle::Open => Ok(()),
            Lifecycle::Closed => Err(Error::ContextClosed { operation }),
        }
    }

    /// Returns a handler that turns events into updates for this pass.
    ///
    /// Registering has no side effect; only invoking the handler races for
    /// the update cell.
    pub fn register_event_handler<E, F>(&mut self, transform: F) -> Result<EventHandler<E, U>, Error>
    where
        E: 'static,
        F: Fn(E) -> U + Send + Sync + 'static,
    {
        self.ensure_open("register_event_handler")?;
        log::trace!("registered event handler");
        Ok(EventHandler::new(Arc::new(transform), Arc::clone(&self.cell)))
    }

    /// Returns a sink that delivers updates as-is.
    pub fn register_action_sink(&mut self) -> Result<Sink<U, U>, Error> {
        self.ensure_open("register_action_sink")?;
        log::trace!("registered action sink");
        Ok(Sink::new(Arc::new(|update: U| update), Arc::clone(&self.cell)))
    }

    /// Returns a sink that wraps each sent action into an update.
    pub fn register_action_sink_with<A, F>(&mut self, wrap: F) -> Result<Sink<A, U>, Error>
    where
        A: 'static,
        F: Fn(A) -> U + Send + Sync + 'static,
    {
        self.ensure_open("register_action_sink")?;
        log::trace!("registered action sink");
        Ok(Sink::new(Arc::new(wrap), Arc::clone(&self.cell)))
    }

    /// Renders `child` and records a binding that maps its output through `handler`.
    ///
    /// The rendering is returned unchanged. If the renderer fails, the error
    /// is returned and the context stays open with its earlier registrations
    /// intact; the identity stays free.
    pub fn register_child<C, F>(
        &mut self,
        child: &C,
        props: C::Props,
        key: Option<&str>,
        handler: F,
    ) -> Result<C::Rendering, Error>
    where
        C: Workflow,
        F: Fn(C::Output) -> U + Send + Sync + 'static,
    {
        self.ensure_open("register_child")?;
        let identity = Identity::of::<C>(key);
        if self.identities.contains(&identity) {
            return Err(Error::DuplicateChildIdentity { identity });
        }
        let rendering = match self.renderer.render_child(child, &props, &identity) {
            Ok(rendering) => rendering,
            Err(source) => {
                log::error!("child {identity} failed to render: {source}");
                return Err(Error::ChildRender { identity, source });
            }
        };
        log::trace!("registered child {identity}");
        self.identities.insert(identity.clone());
        self.bindings.push(ChildBinding::new::<C, F>(
            identity,
            props,
            handler,
            Arc::clone(&self.cell),
        ));
        Ok(rendering)
    }

    /// [`register_child`](Self::register_child) without a key.
    pub fn render_child<C, F>(
        &mut self,
        child: &C,
        props: C::Props,
        handler: F,
    ) -> Result<C::Rendering, Error>
    where
        C: Workflow,
        F: Fn(C::Output) -> U + Send + Sync + 'static,
    {
        self.register_child(child, props, None, handler)
    }

    /// Closes the render pass and freezes its declarations.
    ///
    /// Valid exactly once. A second call is a scheduler defect and fails with
    /// [`Error::AlreadyBuilt`].
    pub fn build_behavior(&mut self) -> Result<Behavior<U>, Error> {
        if self.lifecycle == Lifecycle::Closed {
            return Err(Error::AlreadyBuilt);
        }
        self.lifecycle = Lifecycle::Closed;
        self.identities.clear();
        let bindings = std::mem::take(&mut self.bindings);
        log::debug!("render pass closed with {} child binding(s)", bindings.len());
        Ok(Behavior::new(bindings, Arc::clone(&self.cell)))
    }
}

impl<U, R> fmt::Debug for RenderContext<U, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("lifecycle", &self.lifecycle)
            .field("bindings", &self.bindings)
            .field("delivered", &self.cell.is_filled())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
