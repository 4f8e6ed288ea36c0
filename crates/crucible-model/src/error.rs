//! Error types for the snapshot model.

use crucible_protocol::ProtocolError;
use crucible_types::{AgentId, PropertyId};

/// Errors raised while evaluating properties against bearers.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// The property cannot observe this kind of bearer.
    #[error("property '{property}' cannot be evaluated against bearer '{bearer}'")]
    IncompatibleBearer {
        /// The property's name.
        property: String,
        /// The bearer's name.
        bearer: String,
    },

    /// A numeric value was required but the property observes something
    /// else.
    #[error("property '{property}' does not produce a numeric value")]
    NotNumeric {
        /// The property's name.
        property: String,
    },

    /// A property id referenced by a bearer does not exist in the snapshot.
    #[error("no property with id {0} exists in the snapshot")]
    UnknownProperty(PropertyId),

    /// A bearer name does not exist in the snapshot.
    #[error("no property bearer named '{0}' exists in the snapshot")]
    UnknownBearer(String),

    /// A bearer references an agent that is not in the roster.
    #[error("property bearer references unknown agent {0}")]
    MissingAgent(AgentId),
}

/// Errors raised by environment stepping and stimulation delivery.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// A stimulation was addressed to an agent not in the roster.
    #[error("no agent with id {0} exists in the environment")]
    UnknownAgent(AgentId),

    /// The environment does not support the requested capability.
    #[error("the environment does not support {capability}")]
    UnsupportedCapability {
        /// The missing capability.
        capability: &'static str,
    },

    /// The coordination structure failed while choosing a path.
    #[error("coordination error: {source}")]
    Coordination {
        /// The underlying protocol error.
        #[from]
        source: ProtocolError,
    },
}

/// Errors raised while instantiating scenario components.
#[derive(Debug, thiserror::Error)]
pub enum InstantiationError {
    /// No component of the given kind is registered under the name.
    #[error("no {kind} component named '{name}' is registered")]
    UnknownComponent {
        /// The component kind ("behavior" or "property").
        kind: &'static str,
        /// The requested component name.
        name: String,
    },

    /// A required component parameter was not supplied.
    #[error("component '{component}' requires parameter '{parameter}'")]
    MissingParameter {
        /// The component being instantiated.
        component: String,
        /// The missing parameter name.
        parameter: String,
    },

    /// A component parameter could not be interpreted.
    #[error("component '{component}' rejected parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The component being instantiated.
        component: String,
        /// The offending parameter name.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two agents with the same id were added to a roster.
    #[error("an agent with id {0} already exists in the roster")]
    DuplicateAgent(AgentId),
}
