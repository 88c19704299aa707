//! # Access Control Engine
//!
//! [`Acl`] ties a [`PermissionTable`] to two [`Registry`] hierarchies, one
//! for roles and one for resources, and answers access queries by walking
//! both ancestor paths.
//!
//! ## Resolution
//!
//! ```text
//! for aro in role path      (role, parent, ..., *)
//!   for aco in resource path (resource, parent, ..., *)
//!     verdict(aro, aco) is definite -> return it
//! return false
//! ```
//!
//! Role specificity dominates: every resource ancestor is tried for the
//! requested role before any ancestor of the role is considered.

use crate::action::Action;
use crate::config::{AclConfig, DefaultPolicy};
use crate::entry::{extract_id, AclEntry, EntryLoader, WILDCARD};
use crate::error::{AclError, AclResult};
use crate::permission::{PermissionMap, PermissionTable};
use crate::registry::{check_separator, ParentMap, Registry};

/// Which question a resolution answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    Allowed,
    Denied,
}

/// Hierarchical access-control engine.
///
/// # Example
///
/// ```
/// use arbor_acl::{Acl, Action};
///
/// let mut acl = Acl::new();
/// acl.add_resource("R1").unwrap();
/// acl.add_resource_with_parent("R1a", "R1").unwrap();
///
/// acl.allow("role1", "R1").unwrap();
/// assert!(acl.is_allowed("role1", "R1a").unwrap());
///
/// acl.deny("role1", "R1a").unwrap();
/// assert!(!acl.is_allowed("role1", "R1a").unwrap());
/// assert!(acl.is_allowed("role1", "R1").unwrap());
/// assert!(acl.is_allowed_action("role1", "R1", Action::Read).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acl {
    config: AclConfig,
    permissions: PermissionTable,
    resources: Registry,
    roles: Registry,
}

impl Default for Acl {
    fn default() -> Self {
        Self::new()
    }
}

impl Acl {
    /// Create an engine with the default (deny) configuration.
    pub fn new() -> Self {
        Self::with_config(AclConfig::default())
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: AclConfig) -> Self {
        Self {
            config,
            permissions: seeded_table(&config),
            resources: Registry::new(),
            roles: Registry::new(),
        }
    }

    /// The configuration this engine was created with.
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// The permission table.
    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// The resource hierarchy.
    pub fn resources(&self) -> &Registry {
        &self.resources
    }

    /// The role hierarchy.
    pub fn roles(&self) -> &Registry {
        &self.roles
    }

    /// Register a top-level resource.
    ///
    /// # Errors
    ///
    /// - [`AclError::DuplicateEntry`] if already registered
    /// - [`AclError::InvalidArgument`] for the null identifier
    pub fn add_resource(&mut self, resource: impl AclEntry) -> AclResult<()> {
        let id = required_id(&resource, "resource", "add")?;
        self.resources.add(&id, None)
    }

    /// Register a resource under an existing parent resource.
    ///
    /// # Errors
    ///
    /// As [`add_resource`](Self::add_resource), plus
    /// [`AclError::EntryNotFound`] if `parent` is not registered.
    pub fn add_resource_with_parent(&mut self, resource: impl AclEntry, parent: impl AclEntry) -> AclResult<()> {
        let id = required_id(&resource, "resource", "add")?;
        let parent = extract_id(&parent)?;
        self.resources.add(&id, parent.as_deref())
    }

    /// Register a top-level role.
    ///
    /// # Errors
    ///
    /// - [`AclError::DuplicateEntry`] if already registered
    /// - [`AclError::InvalidArgument`] for the null identifier
    pub fn add_role(&mut self, role: impl AclEntry) -> AclResult<()> {
        let id = required_id(&role, "role", "add")?;
        self.roles.add(&id, None)
    }

    /// Register a role under an existing parent role.
    ///
    /// # Errors
    ///
    /// As [`add_role`](Self::add_role), plus [`AclError::EntryNotFound`]
    /// if `parent` is not registered.
    pub fn add_role_with_parent(&mut self, role: impl AclEntry, parent: impl AclEntry) -> AclResult<()> {
        let id = required_id(&role, "role", "add")?;
        let parent = extract_id(&parent)?;
        self.roles.add(&id, parent.as_deref())
    }

    /// Grant every action on `resource` to `role`.
    pub fn allow(&mut self, role: impl AclEntry, resource: impl AclEntry) -> AclResult<()> {
        self.allow_action(role, resource, Action::All)
    }

    /// Grant `action` on `resource` to `role`.
    ///
    /// Unregistered role and resource identifiers are registered as
    /// top-level entries first.
    ///
    /// # Errors
    ///
    /// [`AclError::InvalidArgument`] if either identifier contains `::`.
    pub fn allow_action(&mut self, role: impl AclEntry, resource: impl AclEntry, action: Action) -> AclResult<()> {
        let (role, resource) = self.register_pair(&role, &resource)?;
        self.permissions
            .allow(role.as_deref(), resource.as_deref(), action);
        Ok(())
    }

    /// Deny every action on `resource` to `role`.
    pub fn deny(&mut self, role: impl AclEntry, resource: impl AclEntry) -> AclResult<()> {
        self.deny_action(role, resource, Action::All)
    }

    /// Deny `action` on `resource` to `role`.
    ///
    /// Unregistered role and resource identifiers are registered as
    /// top-level entries first.
    ///
    /// # Errors
    ///
    /// [`AclError::InvalidArgument`] if either identifier contains `::`.
    pub fn deny_action(&mut self, role: impl AclEntry, resource: impl AclEntry, action: Action) -> AclResult<()> {
        let (role, resource) = self.register_pair(&role, &resource)?;
        self.permissions
            .deny(role.as_deref(), resource.as_deref(), action);
        Ok(())
    }

    /// Grant `role` every action on every resource.
    pub fn allow_all_resource(&mut self, role: impl AclEntry) -> AclResult<()> {
        let role = extract_id(&role)?;
        check_separator(role.as_deref())?;
        register(&mut self.roles, role.as_deref())?;
        self.permissions
            .allow(role.as_deref(), Some(WILDCARD), Action::All);
        Ok(())
    }

    /// Grant every role every action on `resource`.
    pub fn allow_all_role(&mut self, resource: impl AclEntry) -> AclResult<()> {
        let resource = extract_id(&resource)?;
        check_separator(resource.as_deref())?;
        register(&mut self.resources, resource.as_deref())?;
        self.permissions
            .allow(Some(WILDCARD), resource.as_deref(), Action::All);
        Ok(())
    }

    /// Deny `role` every action on every resource.
    pub fn deny_all_resource(&mut self, role: impl AclEntry) -> AclResult<()> {
        let role = extract_id(&role)?;
        check_separator(role.as_deref())?;
        register(&mut self.roles, role.as_deref())?;
        self.permissions
            .deny(role.as_deref(), Some(WILDCARD), Action::All);
        Ok(())
    }

    /// Deny every role every action on `resource`.
    pub fn deny_all_role(&mut self, resource: impl AclEntry) -> AclResult<()> {
        let resource = extract_id(&resource)?;
        check_separator(resource.as_deref())?;
        register(&mut self.resources, resource.as_deref())?;
        self.permissions
            .deny(Some(WILDCARD), resource.as_deref(), Action::All);
        Ok(())
    }

    /// Check whether `role` may perform every action on `resource`.
    pub fn is_allowed(&self, role: impl AclEntry, resource: impl AclEntry) -> AclResult<bool> {
        self.is_allowed_action(role, resource, Action::All)
    }

    /// Check whether `role` may perform `action` on `resource`.
    ///
    /// Never indeterminate: if nothing along either ancestor path decides
    /// the question the answer is `false`.
    pub fn is_allowed_action(&self, role: impl AclEntry, resource: impl AclEntry, action: Action) -> AclResult<bool> {
        let role = extract_id(&role)?;
        let resource = extract_id(&resource)?;
        Ok(self.resolve(role.as_deref(), resource.as_deref(), action, Query::Allowed))
    }

    /// Check whether `role` is denied every action on `resource`.
    pub fn is_denied(&self, role: impl AclEntry, resource: impl AclEntry) -> AclResult<bool> {
        self.is_denied_action(role, resource, Action::All)
    }

    /// Check whether `role` is denied `action` on `resource`.
    ///
    /// Never indeterminate: if nothing along either ancestor path decides
    /// the question the answer is `false`.
    pub fn is_denied_action(&self, role: impl AclEntry, resource: impl AclEntry, action: Action) -> AclResult<bool> {
        let role = extract_id(&role)?;
        let resource = extract_id(&resource)?;
        Ok(self.resolve(role.as_deref(), resource.as_deref(), action, Query::Denied))
    }

    fn resolve(&self, role: Option<&str>, resource: Option<&str>, action: Action, query: Query) -> bool {
        let role_path = self.roles.ancestor_path(role);
        let resource_path = self.resources.ancestor_path(resource);

        for aro in &role_path {
            for aco in &resource_path {
                let (aro, aco) = (Some(aro.as_str()), Some(aco.as_str()));
                let verdict = match (query, action) {
                    (Query::Allowed, Action::All) => self.permissions.is_allowed_all(aro, aco),
                    (Query::Denied, Action::All) => self.permissions.is_denied_all(aro, aco),
                    (Query::Allowed, _) => self.permissions.is_allowed(aro, aco, action),
                    (Query::Denied, _) => self.permissions.is_denied(aro, aco, action),
                };
                if let Some(verdict) = verdict {
                    tracing::trace!(
                        role = ?role,
                        resource = ?resource,
                        action = %action,
                        ?query,
                        matched_role = ?aro,
                        matched_resource = ?aco,
                        verdict,
                        "Resolved access"
                    );
                    return verdict;
                }
            }
        }
        tracing::trace!(role = ?role, resource = ?resource, action = %action, ?query, "No rule matched");
        false
    }

    /// Remove every permission entry of `role` on `resource`.
    ///
    /// # Errors
    ///
    /// [`AclError::PermissionNotFound`] if there is nothing to remove.
    pub fn remove(&mut self, role: impl AclEntry, resource: impl AclEntry) -> AclResult<()> {
        self.remove_action(role, resource, Action::All)
    }

    /// Remove the `action` entry of `role` on `resource`.
    ///
    /// See [`PermissionTable::remove`] for how the wildcard is expanded.
    ///
    /// # Errors
    ///
    /// [`AclError::PermissionNotFound`] if there is nothing to remove.
    pub fn remove_action(&mut self, role: impl AclEntry, resource: impl AclEntry, action: Action) -> AclResult<()> {
        let role = extract_id(&role)?;
        let resource = extract_id(&resource)?;
        self.permissions
            .remove(role.as_deref(), resource.as_deref(), action)
    }

    /// Remove a resource and every permission that references it.
    ///
    /// With `cascade` the resource's descendants and their permissions go
    /// too; otherwise its children are reattached to its parent.
    ///
    /// # Returns
    ///
    /// The removed resource identifiers.
    ///
    /// # Errors
    ///
    /// - [`AclError::InvalidArgument`] for the null identifier
    /// - [`AclError::EntryNotFound`] if the resource is not registered
    pub fn remove_resource(&mut self, resource: impl AclEntry, cascade: bool) -> AclResult<Vec<String>> {
        let id = required_id(&resource, "resource", "remove")?;
        let removed = self.resources.remove(&id, cascade)?;
        let purged: usize = removed
            .iter()
            .map(|r| self.permissions.remove_by_resource(r))
            .sum();
        tracing::debug!(resource = %id, cascade, removed = removed.len(), purged, "Removed resource");
        Ok(removed)
    }

    /// Remove a role and every permission that references it.
    ///
    /// With `cascade` the role's descendants and their permissions go too;
    /// otherwise its children are reattached to its parent.
    ///
    /// # Returns
    ///
    /// The removed role identifiers.
    ///
    /// # Errors
    ///
    /// - [`AclError::InvalidArgument`] for the null identifier
    /// - [`AclError::EntryNotFound`] if the role is not registered
    pub fn remove_role(&mut self, role: impl AclEntry, cascade: bool) -> AclResult<Vec<String>> {
        let id = required_id(&role, "role", "remove")?;
        let removed = self.roles.remove(&id, cascade)?;
        let purged: usize = removed
            .iter()
            .map(|r| self.permissions.remove_by_role(r))
            .sum();
        tracing::debug!(role = %id, cascade, removed = removed.len(), purged, "Removed role");
        Ok(removed)
    }

    /// Make the fallback verdict a grant.
    pub fn make_default_allow(&mut self) {
        self.permissions.make_default_allow();
    }

    /// Make the fallback verdict a denial.
    pub fn make_default_deny(&mut self) {
        self.permissions.make_default_deny();
    }

    /// Reset all stores to their freshly constructed state.
    pub fn clear(&mut self) {
        self.permissions = seeded_table(&self.config);
        self.resources.clear();
        self.roles.clear();
        tracing::debug!("Cleared access control lists");
    }

    /// Detached copy of the permission table.
    pub fn export_permissions(&self) -> PermissionMap {
        self.permissions.export()
    }

    /// Detached copy of the resource hierarchy.
    pub fn export_resources(&self) -> ParentMap {
        self.resources.export()
    }

    /// Detached copy of the role hierarchy.
    pub fn export_roles(&self) -> ParentMap {
        self.roles.export()
    }

    /// Replace the permission table with a copy of `permissions`.
    ///
    /// # Errors
    ///
    /// [`AclError::NonEmptyRegistry`] if the table holds anything beyond
    /// the default key.
    pub fn import_permissions(&mut self, permissions: &PermissionMap) -> AclResult<()> {
        if !self.permissions.is_pristine() {
            return Err(AclError::NonEmptyRegistry("permissions"));
        }
        self.permissions.import_map(permissions);
        Ok(())
    }

    /// Replace the resource hierarchy with a copy of `resources`.
    ///
    /// # Errors
    ///
    /// [`AclError::NonEmptyRegistry`] if any resource is registered.
    pub fn import_resources(&mut self, resources: &ParentMap) -> AclResult<()> {
        if !self.resources.is_empty() {
            return Err(AclError::NonEmptyRegistry("resources"));
        }
        self.resources.import_registry(resources);
        Ok(())
    }

    /// Replace the role hierarchy with a copy of `roles`.
    ///
    /// # Errors
    ///
    /// [`AclError::NonEmptyRegistry`] if any role is registered.
    pub fn import_roles(&mut self, roles: &ParentMap) -> AclResult<()> {
        if !self.roles.is_empty() {
            return Err(AclError::NonEmptyRegistry("roles"));
        }
        self.roles.import_registry(roles);
        Ok(())
    }

    /// Text dump of both hierarchies and the permission table.
    pub fn visualize(&self) -> String {
        format!("{}\n{}\n{}\n", self.roles, self.resources, self.permissions)
    }

    /// Text dump of the permission table.
    pub fn visualize_permissions(&self) -> String {
        self.permissions.to_string()
    }

    /// Indented tree of the resource hierarchy.
    pub fn visualize_resources<L: EntryLoader>(&self, loader: &L) -> String {
        self.resources.display(loader)
    }

    /// Indented tree of the role hierarchy.
    pub fn visualize_roles<L: EntryLoader>(&self, loader: &L) -> String {
        self.roles.display(loader)
    }

    fn register_pair<R, S>(&mut self, role: &R, resource: &S) -> AclResult<(Option<String>, Option<String>)>
    where
        R: AclEntry,
        S: AclEntry,
    {
        let role = extract_id(role)?;
        let resource = extract_id(resource)?;
        check_separator(role.as_deref())?;
        check_separator(resource.as_deref())?;
        register(&mut self.roles, role.as_deref())?;
        register(&mut self.resources, resource.as_deref())?;
        Ok((role, resource))
    }
}

fn seeded_table(config: &AclConfig) -> PermissionTable {
    let mut table = PermissionTable::new();
    if config.default_policy == DefaultPolicy::Allow {
        table.make_default_allow();
    }
    table
}

/// Register `id` as a top-level entry unless it is already known.
fn register(registry: &mut Registry, id: Option<&str>) -> AclResult<()> {
    let Some(id) = id.filter(|id| *id != WILDCARD) else {
        return Ok(());
    };
    match registry.add(id, None) {
        Ok(()) | Err(AclError::DuplicateEntry(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

fn required_id<E: AclEntry + ?Sized>(entry: &E, kind: &str, verb: &str) -> AclResult<String> {
    extract_id(entry)?.ok_or_else(|| AclError::InvalidArgument(format!("Cannot {verb} null {kind}")))
}
