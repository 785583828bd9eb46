//! Single-assignment slot for the next update of a render pass.
//!
//! An [`UpdateCell`] starts empty and can be filled exactly once. Filling is a
//! single compare-and-swap from `None` to the new [`Delivery`], so when several
//! threads race, one wins and every loser receives the winner's delivery for
//! its diagnostic. A filled cell is never overwritten.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Waker};

use arc_swap::{ArcSwapOption, Guard};

use crate::platform::RuntimeScheduler;
use crate::Identity;

/// Which kind of registered source produced a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverySource {
    EventHandler,
    ActionSink,
    ChildOutput(Identity),
}

impl fmt::Display for DeliverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliverySource::EventHandler => f.write_str("event handler"),
            DeliverySource::ActionSink => f.write_str("action sink"),
            DeliverySource::ChildOutput(identity) => write!(f, "output of child {identity}"),
        }
    }
}

/// An update together with the description used in diagnostics.
pub struct Delivery<U> {
    update: U,
    description: String,
    source: DeliverySource,
}

impl<U: fmt::Debug> Delivery<U> {
    pub fn new(update: U, source: DeliverySource) -> Self {
        let description = format!("{update:?}");
        Self {
            update,
            description,
            source,
        }
    }
}

impl<U> Delivery<U> {
    #[inline]
    pub fn update(&self) -> &U {
        &self.update
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn source(&self) -> &DeliverySource {
        &self.source
    }
}

impl<U> fmt::Debug for Delivery<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("update", &self.description)
            .field("source", &self.source)
            .finish()
    }
}

/// A fill attempt that lost the race.
pub struct Rejected<U> {
    pub late: Arc<Delivery<U>>,
    pub accepted: Arc<Delivery<U>>,
}

impl<U> fmt::Debug for Rejected<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("late", &self.late)
            .field("accepted", &self.accepted)
            .finish()
    }
}

pub struct UpdateCell<U> {
    slot: ArcSwapOption<Delivery<U>>,
    waker: Mutex<Option<Waker>>,
    scheduler: Option<Arc<dyn RuntimeScheduler>>,
}

impl<U> UpdateCell<U> {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            waker: Mutex::new(None),
            scheduler: None,
        }
    }

    /// Creates a cell that notifies `scheduler` when it gets filled.
    pub fn with_scheduler(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler: Some(scheduler),
            ..Self::new()
        }
    }

    /// Stores `delivery` if the cell is empty.
    ///
    /// On success the winner, and only the winner, wakes any pending poller
    /// and notifies the scheduler. On failure the cell is untouched and the
    /// accepted delivery is handed back alongside the rejected one.
    pub fn try_fill(&self, delivery: Delivery<U>) -> Result<(), Rejected<U>> {
        let candidate = Arc::new(delivery);
        let previous = Guard::into_inner(
            self.slot
                .compare_and_swap(&None::<Arc<Delivery<U>>>, Some(Arc::clone(&candidate))),
        );
        if let Some(accepted) = previous {
            return Err(Rejected {
                late: candidate,
                accepted,
            });
        }

        log::debug!(
            "update cell filled by {}: {}",
            candidate.source,
            candidate.description
        );
        let waker = self
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(waker) = waker {
            waker.wake();
        }
        if let Some(scheduler) = &self.scheduler {
            scheduler.schedule_dispatch();
        }
        Ok(())
    }

    pub fn is_filled(&self) -> bool {
        self.slot.load().is_some()
    }

    pub fn peek(&self) -> Option<Arc<Delivery<U>>> {
        self.slot.load_full()
    }

    /// Resolves once the cell is filled, waking `cx` on the winning fill.
    ///
    /// Only the most recently registered waker is kept.
    pub fn poll_filled(&self, cx: &mut Context<'_>) -> Poll<Arc<Delivery<U>>> {
        if let Some(delivery) = self.peek() {
            return Poll::Ready(delivery);
        }
        let mut waker = self.waker.lock().unwrap_or_else(PoisonError::into_inner);
        match waker.as_mut() {
            Some(existing) if existing.will_wake(cx.waker()) => {}
            _ => *waker = Some(cx.waker().clone()),
        }
        drop(waker);
        // A fill may have landed between the first check and registration.
        match self.peek() {
            Some(delivery) => Poll::Ready(delivery),
            None => Poll::Pending,
        }
    }
}

impl<U> Default for UpdateCell<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for UpdateCell<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateCell")
            .field("delivery", &self.peek())
            .field("has_scheduler", &self.scheduler.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/update_cell_tests.rs"]
mod tests;
