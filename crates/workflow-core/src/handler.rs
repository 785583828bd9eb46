//! Callables handed out by a render pass: event handlers and action sinks.
//!
//! Both are thin wrappers that turn an incoming value into an update and race
//! to fill the render pass's [`UpdateCell`]. They stay usable after the
//! [`RenderContext`](crate::RenderContext) is closed; that is when UI code and
//! collaborators actually call them.

use std::fmt;
use std::sync::Arc;

use crate::update_cell::{Delivery, DeliverySource, UpdateCell};
use crate::{DuplicateDelivery, Error};

/// Fills `cell` with `update`, turning a lost race into [`Error::DuplicateDelivery`].
pub(crate) fn deliver<U: fmt::Debug>(
    cell: &UpdateCell<U>,
    late_value: String,
    update: U,
    source: DeliverySource,
) -> Result<(), Error> {
    cell.try_fill(Delivery::new(update, source))
        .map_err(|rejected| {
            let duplicate = DuplicateDelivery::new(late_value, &rejected);
            log::warn!("{duplicate}");
            Error::DuplicateDelivery(Box::new(duplicate))
        })
}

type Transform<E, U> = dyn Fn(E) -> U + Send + Sync;

/// Event handler exposed to a rendering.
pub struct EventHandler<E, U> {
    transform: Arc<Transform<E, U>>,
    cell: Arc<UpdateCell<U>>,
}

impl<E, U> EventHandler<E, U> {
    pub(crate) fn new(transform: Arc<Transform<E, U>>, cell: Arc<UpdateCell<U>>) -> Self {
        Self { transform, cell }
    }
}

impl<E: fmt::Debug, U: fmt::Debug> EventHandler<E, U> {
    pub fn call(&self, event: E) -> Result<(), Error> {
        let late_value = format!("{event:?}");
        let update = (self.transform)(event);
        deliver(&self.cell, late_value, update, DeliverySource::EventHandler)
    }
}

impl<E, U> Clone for EventHandler<E, U> {
    fn clone(&self) -> Self {
        Self {
            transform: Arc::clone(&self.transform),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<E, U> fmt::Debug for EventHandler<E, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("delivered", &self.cell.is_filled())
            .finish()
    }
}

/// Action sink handed to collaborators outside the rendering.
pub struct Sink<A, U> {
    wrap: Arc<Transform<A, U>>,
    cell: Arc<UpdateCell<U>>,
}

impl<A, U> Sink<A, U> {
    pub(crate) fn new(wrap: Arc<Transform<A, U>>, cell: Arc<UpdateCell<U>>) -> Self {
        Self { wrap, cell }
    }
}

impl<A: fmt::Debug, U: fmt::Debug> Sink<A, U> {
    pub fn send(&self, action: A) -> Result<(), Error> {
        let late_value = format!("{action:?}");
        let update = (self.wrap)(action);
        deliver(&self.cell, late_value, update, DeliverySource::ActionSink)
    }
}

impl<A, U> Clone for Sink<A, U> {
    fn clone(&self) -> Self {
        Self {
            wrap: Arc::clone(&self.wrap),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<A, U> fmt::Debug for Sink<A, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("delivered", &self.cell.is_filled())
            .finish()
    }
}
