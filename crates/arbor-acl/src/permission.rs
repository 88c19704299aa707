//! # Permissions
//!
//! The permission table maps a role/resource pair to the actions granted or
//! denied on it. Either side of the pair may be the wildcard `*`, and the
//! [`Action::All`] entry stands in for any action without its own entry.
//!
//! ```text
//! Key = role::resource
//!
//! Examples:
//!   "*::*"           {ALL: false}              - default deny
//!   "editor::docs"   {ALL: true, DELETE: false} - everything but delete
//!   "*::public"      {READ: true}              - anyone may read
//! ```
//!
//! Lookups return `Option<bool>`: `None` is the unknown verdict, meaning
//! nothing at this key decides the question.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::action::Action;
use crate::entry::WILDCARD;
use crate::error::{AclError, AclResult};

/// Grant state per action for a single key.
pub type ActionMap = BTreeMap<Action, bool>;

/// The complete table, keyed by role/resource pair.
pub type PermissionMap = BTreeMap<PermissionKey, ActionMap>;

/// A role/resource pair identifying one row of the permission table.
///
/// A null side is stored as the wildcard `*`.
///
/// # Example
///
/// ```
/// use arbor_acl::permission::PermissionKey;
///
/// let key = PermissionKey::new(Some("editor"), None);
/// assert_eq!(key.to_string(), "editor::*");
///
/// let parsed: PermissionKey = "editor::*".parse().unwrap();
/// assert_eq!(parsed, key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermissionKey {
    /// Role identifier, `*` for any role.
    pub role: String,
    /// Resource identifier, `*` for any resource.
    pub resource: String,
}

impl PermissionKey {
    /// Separator between role and resource in the string form.
    pub const SEPARATOR: &'static str = "::";

    /// Create a key, substituting `*` for a null or empty side.
    pub fn new(role: Option<&str>, resource: Option<&str>) -> Self {
        Self {
            role: or_wildcard(role),
            resource: or_wildcard(resource),
        }
    }

    /// The `*::*` key holding the default policy.
    pub fn default_key() -> Self {
        Self::new(None, None)
    }

    /// Check if this is the `*::*` key.
    pub fn is_default(&self) -> bool {
        self.role == WILDCARD && self.resource == WILDCARD
    }
}

fn or_wildcard(id: Option<&str>) -> String {
    match id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => WILDCARD.to_string(),
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.role, Self::SEPARATOR, self.resource)
    }
}

impl FromStr for PermissionKey {
    type Err = AclError;

    /// Parse `role::resource`. Exactly one separator is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AclError::InvalidArgument(format!("malformed permission key '{s}'"));
        let (role, resource) = s.split_once(Self::SEPARATOR).ok_or_else(malformed)?;
        if resource.contains(Self::SEPARATOR) {
            return Err(malformed());
        }
        Ok(Self::new(Some(role), Some(resource)))
    }
}

impl Serialize for PermissionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PermissionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Table of grants and denials per role/resource pair.
///
/// A freshly created table holds a single `*::*` entry denying everything.
///
/// # Example
///
/// ```
/// use arbor_acl::permission::PermissionTable;
/// use arbor_acl::Action;
///
/// let mut table = PermissionTable::new();
/// table.allow(Some("editor"), Some("docs"), Action::All);
/// table.deny(Some("editor"), Some("docs"), Action::Delete);
///
/// assert_eq!(table.is_allowed(Some("editor"), Some("docs"), Action::Read), Some(true));
/// assert_eq!(table.is_allowed(Some("editor"), Some("docs"), Action::Delete), Some(false));
/// assert_eq!(table.is_allowed_all(Some("editor"), Some("docs")), Some(false));
/// assert_eq!(table.is_allowed(Some("viewer"), Some("docs"), Action::Read), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    perms: PermissionMap,
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionTable {
    /// Create a table seeded with the default deny.
    pub fn new() -> Self {
        let mut table = Self {
            perms: PermissionMap::new(),
        };
        table.make_default_deny();
        table
    }

    /// Grant `action` on `resource` to `role`.
    ///
    /// Other actions already set on the same key are left untouched, even
    /// when `action` is [`Action::All`].
    pub fn allow(&mut self, role: Option<&str>, resource: Option<&str>, action: Action) {
        self.set(PermissionKey::new(role, resource), action, true);
    }

    /// Deny `action` on `resource` to `role`.
    ///
    /// Other actions already set on the same key are left untouched, even
    /// when `action` is [`Action::All`].
    pub fn deny(&mut self, role: Option<&str>, resource: Option<&str>, action: Action) {
        self.set(PermissionKey::new(role, resource), action, false);
    }

    fn set(&mut self, key: PermissionKey, action: Action, granted: bool) {
        tracing::debug!(key = %key, action = %action, granted, "Set permission");
        self.perms.entry(key).or_default().insert(action, granted);
    }

    /// Overwrite the `*::*` entry with a grant on everything.
    pub fn make_default_allow(&mut self) {
        self.perms
            .insert(PermissionKey::default_key(), ActionMap::from([(Action::All, true)]));
    }

    /// Overwrite the `*::*` entry with a denial on everything.
    pub fn make_default_deny(&mut self) {
        self.perms
            .insert(PermissionKey::default_key(), ActionMap::from([(Action::All, false)]));
    }

    /// Check whether `role` may perform `action` on `resource`.
    ///
    /// # Returns
    ///
    /// - The explicit entry for `action`, if set
    /// - Otherwise the [`Action::All`] entry, if set
    /// - Otherwise `None`
    pub fn is_allowed(&self, role: Option<&str>, resource: Option<&str>, action: Action) -> Option<bool> {
        let perm = self.perms.get(&PermissionKey::new(role, resource))?;
        perm.get(&action).or_else(|| perm.get(&Action::All)).copied()
    }

    /// Check whether `role` is denied `action` on `resource`.
    ///
    /// The negation of [`is_allowed`](Self::is_allowed), keeping `None` as is.
    pub fn is_denied(&self, role: Option<&str>, resource: Option<&str>, action: Action) -> Option<bool> {
        self.is_allowed(role, resource, action).map(|granted| !granted)
    }

    /// Check whether `role` may perform every action on `resource`.
    ///
    /// Any explicit denial at the key yields `Some(false)`. Otherwise the key
    /// counts as granting everything if it sets [`Action::All`] or sets every
    /// concrete action.
    pub fn is_allowed_all(&self, role: Option<&str>, resource: Option<&str>) -> Option<bool> {
        self.all_actions(&PermissionKey::new(role, resource), true)
    }

    /// Check whether `role` is denied every action on `resource`.
    ///
    /// Mirror image of [`is_allowed_all`](Self::is_allowed_all): any explicit
    /// grant at the key yields `Some(false)`.
    pub fn is_denied_all(&self, role: Option<&str>, resource: Option<&str>) -> Option<bool> {
        self.all_actions(&PermissionKey::new(role, resource), false)
    }

    fn all_actions(&self, key: &PermissionKey, granted: bool) -> Option<bool> {
        let perm = self.perms.get(key)?;
        let mut concrete = 0;
        for (action, value) in perm {
            if *value != granted {
                return Some(false);
            }
            if !action.is_wildcard() {
                concrete += 1;
            }
        }
        if perm.contains_key(&Action::All) || concrete == Action::CONCRETE.len() {
            return Some(true);
        }
        None
    }

    /// Remove the entry for `action` from a key.
    ///
    /// - Removing a present action deletes just that entry, or the whole key
    ///   for [`Action::All`].
    /// - Removing an absent concrete action from a key that has
    ///   [`Action::All`] copies the wildcard value into the remaining
    ///   concrete actions, overwriting any explicit entry, and drops the
    ///   wildcard. The removed action becomes unknown.
    /// - Removing [`Action::All`] from a key without it deletes the key.
    ///
    /// A key left with no entries is dropped.
    ///
    /// # Errors
    ///
    /// [`AclError::PermissionNotFound`] if the key is absent, or if neither
    /// `action` nor [`Action::All`] is set on it.
    pub fn remove(&mut self, role: Option<&str>, resource: Option<&str>, action: Action) -> AclResult<()> {
        let key = PermissionKey::new(role, resource);
        let Some(perm) = self.perms.get_mut(&key) else {
            return Err(AclError::PermissionNotFound {
                permission: key.to_string(),
                role: key.role.clone(),
                resource: key.resource.clone(),
            });
        };

        if perm.contains_key(&action) {
            if action.is_wildcard() {
                self.perms.remove(&key);
                tracing::debug!(key = %key, "Removed permission key");
                return Ok(());
            }
            perm.remove(&action);
        } else if let Some(wildcard) = perm.remove(&Action::All) {
            for other in Action::CONCRETE.into_iter().filter(|a| *a != action) {
                perm.insert(other, wildcard);
            }
        } else if action.is_wildcard() {
            self.perms.remove(&key);
            tracing::debug!(key = %key, "Removed permission key");
            return Ok(());
        } else {
            return Err(AclError::permission_not_found(action, &key.role, &key.resource));
        }

        if perm.is_empty() {
            self.perms.remove(&key);
        }
        tracing::debug!(key = %key, action = %action, "Removed permission");
        Ok(())
    }

    /// Remove every key whose resource is exactly `resource_id`.
    ///
    /// # Returns
    ///
    /// The number of keys removed.
    pub fn remove_by_resource(&mut self, resource_id: &str) -> usize {
        self.remove_where(|key| key.resource == resource_id)
    }

    /// Remove every key whose role is exactly `role_id`.
    ///
    /// # Returns
    ///
    /// The number of keys removed.
    pub fn remove_by_role(&mut self, role_id: &str) -> usize {
        self.remove_where(|key| key.role == role_id)
    }

    fn remove_where<F: Fn(&PermissionKey) -> bool>(&mut self, matches: F) -> usize {
        let before = self.perms.len();
        self.perms.retain(|key, _| !matches(key));
        before - self.perms.len()
    }

    /// Check if the table has a row for `key`.
    pub fn has(&self, key: &PermissionKey) -> bool {
        self.perms.contains_key(key)
    }

    /// Get the action map stored for `key`.
    pub fn get(&self, key: &PermissionKey) -> Option<&ActionMap> {
        self.perms.get(key)
    }

    /// Number of keys in the table.
    pub fn size(&self) -> usize {
        self.perms.len()
    }

    /// Check if the table holds nothing beyond the default key.
    pub fn is_pristine(&self) -> bool {
        self.perms.keys().all(PermissionKey::is_default)
    }

    /// Remove every key, including the default.
    pub fn clear(&mut self) {
        self.perms.clear();
    }

    /// Snapshot of the table, detached from it.
    pub fn export(&self) -> PermissionMap {
        self.perms.clone()
    }

    /// Replace the table contents with a copy of `map`.
    ///
    /// Keys with an empty action map are skipped.
    pub fn import_map(&mut self, map: &PermissionMap) {
        self.perms = map
            .iter()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(key, actions)| (key.clone(), actions.clone()))
            .collect();
        tracing::debug!(keys = self.perms.len(), "Imported permissions");
    }
}

impl fmt::Display for PermissionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size: {}", self.size())?;
        writeln!(f, "-------")?;
        for (key, actions) in &self.perms {
            writeln!(f, "- {key}")?;
            for (action, granted) in actions {
                writeln!(f, "\t{action}\t{granted}")?;
            }
        }
        Ok(())
    }
}
