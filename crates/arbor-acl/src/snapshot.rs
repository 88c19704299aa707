//! Combined export of an engine's three stores.
//!
//! A snapshot is plain data: it can be handed to any serde format and fed
//! back into a fresh engine with [`Acl::restore`].

use serde::{Deserialize, Serialize};

use crate::acl::Acl;
use crate::error::{AclError, AclResult};
use crate::permission::PermissionMap;
use crate::registry::ParentMap;

/// Detached copy of the role hierarchy, resource hierarchy and permissions.
///
/// # Example
///
/// ```
/// use arbor_acl::Acl;
///
/// let mut acl = Acl::new();
/// acl.allow("jedi", "light-sabre").unwrap();
/// let snapshot = acl.snapshot();
///
/// let mut restored = Acl::new();
/// restored.restore(&snapshot).unwrap();
/// assert!(restored.is_allowed("jedi", "light-sabre").unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclSnapshot {
    /// Role identifier to parent role.
    #[serde(default)]
    pub roles: ParentMap,
    /// Resource identifier to parent resource.
    #[serde(default)]
    pub resources: ParentMap,
    /// `role::resource` key to action grants.
    #[serde(default)]
    pub permissions: PermissionMap,
}

impl Acl {
    /// Export all three stores at once.
    pub fn snapshot(&self) -> AclSnapshot {
        AclSnapshot {
            roles: self.export_roles(),
            resources: self.export_resources(),
            permissions: self.export_permissions(),
        }
    }

    /// Import all three stores at once.
    ///
    /// Either every store is replaced or none is.
    ///
    /// # Errors
    ///
    /// [`AclError::NonEmptyRegistry`] naming the first store that already
    /// holds data.
    pub fn restore(&mut self, snapshot: &AclSnapshot) -> AclResult<()> {
        if !self.roles().is_empty() {
            return Err(AclError::NonEmptyRegistry("roles"));
        }
        if !self.resources().is_empty() {
            return Err(AclError::NonEmptyRegistry("resources"));
        }
        if !self.permissions().is_pristine() {
            return Err(AclError::NonEmptyRegistry("permissions"));
        }
        self.import_roles(&snapshot.roles)?;
        self.import_resources(&snapshot.resources)?;
        self.import_permissions(&snapshot.permissions)
    }
}
