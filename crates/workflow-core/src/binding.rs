use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::handler::deliver;
use crate::update_cell::{DeliverySource, UpdateCell};
use crate::{Error, Identity, Workflow};

type ErasedOutput = Box<dyn Any + Send>;
type OutputMapper<U> = dyn Fn(ErasedOutput) -> Result<U, ErasedOutput> + Send + Sync;

/// A child declared during a render pass.
///
/// The child's props and output types are erased so that a parent can keep
/// children of different types in one ordered list. The typed accessors
/// recover them by downcasting.
pub struct ChildBinding<U> {
    identity: Identity,
    props: Box<dyn Any + Send + Sync>,
    output_type: &'static str,
    mapper: Box<OutputMapper<U>>,
    cell: Arc<UpdateCell<U>>,
}

impl<U: 'static> ChildBinding<U> {
    pub(crate) fn new<C, F>(
        identity: Identity,
        props: C::Props,
        handler: F,
        cell: Arc<UpdateCell<U>>,
    ) -> Self
    where
        C: Workflow,
        F: Fn(C::Output) -> U + Send + Sync + 'static,
    {
        let mapper = move |output: ErasedOutput| {
            output
                .downcast::<C::Output>()
                .map(|output| handler(*output))
        };
        Self {
            identity,
            props: Box::new(props),
            output_type: type_name::<C::Output>(),
            mapper: Box::new(mapper),
            cell,
        }
    }
}

impl<U> ChildBinding<U> {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The input handed to the child this pass, if `P` is its props type.
    pub fn props<P: 'static>(&self) -> Option<&P> {
        self.props.downcast_ref()
    }

    /// Runs the output handler without touching the update cell.
    pub fn map_output<O: Send + 'static>(&self, output: O) -> Result<U, Error> {
        (self.mapper)(Box::new(output)).map_err(|_| Error::OutputTypeMismatch {
            identity: self.identity.clone(),
            expected: self.output_type,
        })
    }
}

impl<U: fmt::Debug> ChildBinding<U> {
    /// Maps a reported child output and races to fill the update cell.
    pub fn deliver<O: fmt::Debug + Send + 'static>(&self, output: O) -> Result<(), Error> {
        let late_value = format!("{output:?}");
        let update = self.map_output(output)?;
        deliver(
            &self.cell,
            late_value,
            update,
            DeliverySource::ChildOutput(self.identity.clone()),
        )
    }
}

impl<U> fmt::Debug for ChildBinding<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildBinding")
            .field("identity", &self.identity)
            .field("output_type", &self.output_type)
            .finish()
    }
}
