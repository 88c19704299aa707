//! Error types for access-control operations
//!
//! Every failure here is a usage error raised synchronously at the point of
//! violation. Nothing is retried internally.

use thiserror::Error;

use crate::action::Action;

/// Access-control error types.
///
/// These errors cover registry maintenance, permission removal,
/// snapshot import and identifier extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// Identifier is already registered in the hierarchy
    #[error("Entry '{0}' is already in the registry.")]
    DuplicateEntry(String),

    /// Identifier (or the requested parent) is not registered
    #[error("Entry '{0}' is not in registry.")]
    EntryNotFound(String),

    /// No permission (explicit or via the wildcard) to remove.
    ///
    /// `permission` names what was looked for: the action (`READ`) when the
    /// key exists but lacks it, or the whole `role::resource` key when the
    /// key itself is absent.
    #[error("Permission '{permission}' not found on '{role}' for '{resource}'.")]
    PermissionNotFound {
        /// Missing action name or missing `role::resource` key.
        permission: String,
        /// Role identifier (`*` for the root).
        role: String,
        /// Resource identifier (`*` for the root).
        resource: String,
    },

    /// Import target already holds data
    #[error("Registry '{0}' is not empty")]
    NonEmptyRegistry(&'static str),

    /// Value does not expose a usable identifier
    #[error("Invalid entry type - expected a string or an object with an identifier")]
    InvalidEntryType,

    /// Invalid argument to an engine operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for access-control operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Build a [`AclError::PermissionNotFound`] for a missing action.
    pub(crate) fn permission_not_found(action: Action, role: &str, resource: &str) -> Self {
        AclError::PermissionNotFound {
            permission: action.as_str().to_string(),
            role: role.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Check if this error reports a missing entry or permission.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AclError::EntryNotFound(_) | AclError::PermissionNotFound { .. }
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AclError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AclError::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            AclError::PermissionNotFound { .. } => "PERMISSION_NOT_FOUND",
            AclError::NonEmptyRegistry(_) => "NON_EMPTY_REGISTRY",
            AclError::InvalidEntryType => "INVALID_ENTRY_TYPE",
            AclError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }
}
