#![doc = r"Per-render coordination core for a hierarchical reactive workflow runtime."]
//!
//! Each node of a workflow tree renders against a fresh [`RenderContext`]. The
//! render logic registers event handlers, action sinks and child workflows;
//! [`RenderContext::build_behavior`] then freezes the declarations into a
//! [`Behavior`]. All sources registered during one pass share one
//! [`UpdateCell`]: the first to deliver wins, every later attempt fails with
//! [`Error::DuplicateDelivery`] naming both the late and the accepted update.

pub mod action;
pub mod behavior;
pub mod binding;
pub mod collections;
pub mod context;
pub mod error;
pub mod handler;
pub mod hash;
pub mod identity;
pub mod platform;
pub mod renderer;
pub mod update_cell;

pub use action::{Action, ActionOutcome};
pub use behavior::Behavior;
pub use binding::ChildBinding;
pub use context::{Lifecycle, RenderContext};
pub use error::{DuplicateDelivery, Error};
pub use handler::{EventHandler, Sink};
pub use identity::Identity;
pub use platform::RuntimeScheduler;
pub use renderer::{ChildRenderError, ChildRenderer, Workflow};
pub use update_cell::{Delivery, DeliverySource, Rejected, UpdateCell};
