use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::update_cell::{Delivery, UpdateCell};
use crate::{ChildBinding, Identity};

/// Frozen record of what a render pass declared.
///
/// Holds the child bindings in registration order and a read-only view of
/// the pass's update cell. Handlers and sinks from the pass may still fill
/// the cell after the behavior is built; the behavior only observes.
pub struct Behavior<U> {
    bindings: Vec<ChildBinding<U>>,
    cell: Arc<UpdateCell<U>>,
}

impl<U> Behavior<U> {
    pub(crate) fn new(bindings: Vec<ChildBinding<U>>, cell: Arc<UpdateCell<U>>) -> Self {
        Self { bindings, cell }
    }

    pub fn bindings(&self) -> &[ChildBinding<U>] {
        &self.bindings
    }

    pub fn binding(&self, identity: &Identity) -> Option<&ChildBinding<U>> {
        self.bindings
            .iter()
            .find(|binding| binding.identity() == identity)
    }

    pub fn pending_update(&self) -> Option<Arc<Delivery<U>>> {
        self.cell.peek()
    }

    pub fn has_pending_update(&self) -> bool {
        self.cell.is_filled()
    }

    /// Resolves with the delivered update once some source wins the race.
    pub fn poll_update(&self, cx: &mut Context<'_>) -> Poll<Arc<Delivery<U>>> {
        self.cell.poll_filled(cx)
    }
}

impl<U> fmt::Debug for Behavior<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("bindings", &self.bindings)
            .field("pending_update", &self.cell.peek())
            .finish()
    }
}
