use thiserror::Error;

use crate::{InstanceId, TemplateId};

/// Errors reported by pool operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// An instance the pool never created was returned to it.
    #[error("{id} was not created by this pool")]
    UnknownInstance {
        /// The offending instance.
        id: InstanceId,
    },

    /// An instance was returned while it was already idle.
    #[error("{id} is already idle")]
    AlreadyIdle {
        /// The offending instance.
        id: InstanceId,
    },

    /// An instance was registered twice.
    #[error("{id} is already registered")]
    AlreadyRegistered {
        /// The offending instance.
        id: InstanceId,
    },

    /// An instance was queued under a template it was not created from.
    #[error("{id} belongs to {expected}, not {found}")]
    TemplateMismatch {
        /// The instance being queued.
        id: InstanceId,
        /// The template it was created from.
        expected: TemplateId,
        /// The template whose queue it was offered to.
        found: TemplateId,
    },

    /// A template id was not issued by this pool.
    #[error("{id} is not registered with this pool")]
    UnknownTemplate {
        /// The unknown template.
        id: TemplateId,
    },

    /// No template is registered under this name.
    #[error("no template named '{name}'")]
    UnknownTemplateName {
        /// The name that did not resolve.
        name: String,
    },

    /// A template with the same name is already registered.
    #[error("a template named '{name}' is already registered")]
    DuplicateTemplate {
        /// The clashing name.
        name: String,
    },

    /// A spawner was built with no template to pick from.
    #[error("no templates to spawn from")]
    NothingToSpawn,
}

/// Result alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
