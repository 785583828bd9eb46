//! Named state transitions used as the update type of a workflow.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Result of applying an [`Action`] to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome<S, O> {
    pub state: S,
    pub output: Option<O>,
}

type ApplyFn<S, O> = dyn Fn(S) -> ActionOutcome<S, O> + Send + Sync;

/// A state transition that may also emit an output to the parent.
///
/// Actions are cheap to clone and shareable across threads, so a delivered
/// action can be inspected from a [`Behavior`](crate::Behavior) and applied by
/// the dispatcher without taking it out of the update cell. The `Debug`
/// rendering is the action's name, which is what diagnostics print.
pub struct Action<S, O> {
    name: Cow<'static, str>,
    apply: Arc<ApplyFn<S, O>>,
}

impl<S: 'static, O: 'static> Action<S, O> {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        apply: impl Fn(S) -> ActionOutcome<S, O> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    /// Leaves the state alone and emits `output`.
    pub fn emit_output(output: O) -> Self
    where
        O: Clone + fmt::Debug + Send + Sync,
    {
        let name = format!("emit_output({output:?})");
        Self::new(name, move |state| ActionOutcome {
            state,
            output: Some(output.clone()),
        })
    }

    /// Replaces the state and emits nothing.
    pub fn set_state(next: S) -> Self
    where
        S: Clone + fmt::Debug + Send + Sync,
    {
        let name = format!("set_state({next:?})");
        Self::new(name, move |_| ActionOutcome {
            state: next.clone(),
            output: None,
        })
    }

    pub fn noop() -> Self {
        Self::new("noop", |state| ActionOutcome {
            state,
            output: None,
        })
    }
}

impl<S, O> Action<S, O> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, state: S) -> ActionOutcome<S, O> {
        (self.apply)(state)
    }
}

impl<S, O> Clone for Action<S, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<S, O> fmt::Debug for Action<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
