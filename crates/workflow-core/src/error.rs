use std::error::Error as StdError;
use std::fmt;

use crate::renderer::ChildRenderError;
use crate::update_cell::{DeliverySource, Rejected};
use crate::Identity;

/// A delivery attempted after another source already filled the update cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDelivery {
    late_source: DeliverySource,
    late_value: String,
    late_update: String,
    accepted_source: DeliverySource,
    accepted_update: String,
}

impl DuplicateDelivery {
    pub(crate) fn new<U>(late_value: String, rejected: &Rejected<U>) -> Self {
        Self {
            late_source: rejected.late.source().clone(),
            late_value,
            late_update: rejected.late.description().to_owned(),
            accepted_source: rejected.accepted.source().clone(),
            accepted_update: rejected.accepted.description().to_owned(),
        }
    }

    pub fn late_source(&self) -> &DeliverySource {
        &self.late_source
    }

    /// Rendering of the event, action or child output that arrived late.
    pub fn late_value(&self) -> &str {
        &self.late_value
    }

    /// Rendering of the update the late value would have produced.
    pub fn late_update(&self) -> &str {
        &self.late_update
    }

    pub fn accepted_source(&self) -> &DeliverySource {
        &self.accepted_source
    }

    /// Rendering of the update that was accepted first.
    pub fn accepted_update(&self) -> &str {
        &self.accepted_update
    }
}

impl fmt::Display for DuplicateDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match &self.late_source {
            DeliverySource::EventHandler => "event",
            DeliverySource::ActionSink => "action",
            DeliverySource::ChildOutput(_) => "output",
        };
        write!(
            f,
            "{} delivered more than once in one render pass: {noun} {} would have produced {}, \
             but {} from {} was already accepted",
            self.late_source,
            self.late_value,
            self.late_update,
            self.accepted_update,
            self.accepted_source,
        )
    }
}

#[derive(Debug)]
pub enum Error {
    /// A registration was attempted after `build_behavior`.
    ContextClosed { operation: &'static str },
    DuplicateDelivery(Box<DuplicateDelivery>),
    DuplicateChildIdentity { identity: Identity },
    /// `build_behavior` was called on a context that is already closed.
    AlreadyBuilt,
    ChildRender {
        identity: Identity,
        source: ChildRenderError,
    },
    /// A child output of the wrong type was handed to a binding.
    OutputTypeMismatch {
        identity: Identity,
        expected: &'static str,
    },
}

impl Error {
    pub fn as_duplicate_delivery(&self) -> Option<&DuplicateDelivery> {
        match self {
            Error::DuplicateDelivery(duplicate) => Some(duplicate.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContextClosed { operation } => {
                write!(f, "{operation} called after the render pass was closed")
            }
            Error::DuplicateDelivery(duplicate) => fmt::Display::fmt(duplicate, f),
            Error::DuplicateChildIdentity { identity } => write!(
                f,
                "child {identity} rendered more than once in one render pass; give repeated children distinct keys"
            ),
            Error::AlreadyBuilt => f.write_str("behavior already built for this render pass"),
            Error::ChildRender { identity, source } => {
                write!(f, "child {identity} failed to render: {source}")
            }
            Error::OutputTypeMismatch { identity, expected } => {
                write!(f, "child {identity} output type mismatch; expected {expected}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ChildRender { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
