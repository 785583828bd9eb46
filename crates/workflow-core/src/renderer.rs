//! Child workflow descriptors and the capability that renders them.

use std::error::Error as StdError;

use crate::Identity;

/// Error produced by a [`ChildRenderer`] when a child fails to render.
pub type ChildRenderError = Box<dyn StdError + Send + Sync + 'static>;

/// Type-level description of a child workflow as seen by its parent.
///
/// The parent only needs the child's input, output and rendering types; how
/// the child keeps state and renders itself belongs to the runtime that
/// implements [`ChildRenderer`].
pub trait Workflow: 'static {
    /// Input handed to the child on every render pass.
    type Props: Send + Sync + 'static;
    /// Value the child reports to its parent.
    type Output: Send + 'static;
    /// Value the child's render pass produces.
    type Rendering: 'static;
}

/// Renders nested workflows on behalf of a [`RenderContext`](crate::RenderContext).
///
/// Called synchronously, exactly once per successful identity check in
/// `register_child`, in call order. Implementations must not deliver into the
/// parent's update cell; output delivery happens later through the
/// [`ChildBinding`](crate::ChildBinding).
pub trait ChildRenderer {
    fn render_child<C: Workflow>(
        &mut self,
        child: &C,
        props: &C::Props,
        identity: &Identity,
    ) -> Result<C::Rendering, ChildRenderError>;
}

impl<R: ChildRenderer> ChildRenderer for &mut R {
    fn render_child<C: Workflow>(
        &mut self,
        child: &C,
        props: &C::Props,
        identity: &Identity,
    ) -> Result<C::Rendering, ChildRenderError> {
        (**self).render_child(child, props, identity)
    }
}
