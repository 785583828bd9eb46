//! Platform abstraction traits consumed by the render core.
//!
//! The core never spawns threads or tasks. Whatever drives successive render
//! passes plugs in here to learn that a render pass has received its update.

/// Receives notice that a render pass accepted its single update.
///
/// `schedule_dispatch` is called exactly once per render pass, by whichever
/// writer won the delivery race, on that writer's thread. Implementations
/// must therefore be safe to call from any thread and must not block.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host dispatch the pending update of a render pass.
    fn schedule_dispatch(&self);
}
