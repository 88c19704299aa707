//! # Entries
//!
//! Roles and resources are plain string identifiers as far as the engine is
//! concerned. This module defines how caller-supplied values are reduced to
//! those identifiers, and the capability the tree renderer uses to turn an
//! identifier back into something human readable.

use crate::error::{AclError, AclResult};

/// Identifier denoting the root of a hierarchy, and "any" in permission keys.
pub const WILDCARD: &str = "*";

/// A value that can be used as a role or resource.
///
/// Plain strings are identifiers in their own right. `None` and the empty
/// string extract to the null identifier, which the engine treats as the
/// root/wildcard. Richer types go through [`HasIdentifier`].
pub trait AclEntry {
    /// Extract the identifier, `Ok(None)` meaning the null identifier.
    fn entry_id(&self) -> AclResult<Option<&str>>;
}

impl AclEntry for str {
    fn entry_id(&self) -> AclResult<Option<&str>> {
        Ok(if self.is_empty() { None } else { Some(self) })
    }
}

impl AclEntry for String {
    fn entry_id(&self) -> AclResult<Option<&str>> {
        self.as_str().entry_id()
    }
}

impl<T: AclEntry + ?Sized> AclEntry for &T {
    fn entry_id(&self) -> AclResult<Option<&str>> {
        (**self).entry_id()
    }
}

impl<T: AclEntry> AclEntry for Option<T> {
    fn entry_id(&self) -> AclResult<Option<&str>> {
        match self {
            Some(value) => value.entry_id(),
            None => Ok(None),
        }
    }
}

/// Capability for domain objects that carry an identifier.
///
/// # Example
///
/// ```
/// use arbor_acl::{Acl, HasIdentifier};
///
/// struct User {
///     id: String,
/// }
///
/// impl HasIdentifier for User {
///     fn identifier(&self) -> Option<&str> {
///         Some(&self.id)
///     }
/// }
///
/// let user = User { id: "alice".into() };
/// let mut acl = Acl::new();
/// acl.allow(user.as_entry(), "reports").unwrap();
/// assert!(acl.is_allowed(user.as_entry(), "reports").unwrap());
/// ```
pub trait HasIdentifier {
    /// The identifier of this object, or `None` if it has none.
    fn identifier(&self) -> Option<&str>;

    /// Borrow this object as an [`AclEntry`].
    fn as_entry(&self) -> Identified<'_, Self>
    where
        Self: Sized,
    {
        Identified(self)
    }
}

/// Adapter passing a [`HasIdentifier`] value where an [`AclEntry`] is expected.
#[derive(Debug)]
pub struct Identified<'a, T: ?Sized>(pub &'a T);

impl<T: ?Sized> Clone for Identified<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Identified<'_, T> {}

impl<T: HasIdentifier + ?Sized> AclEntry for Identified<'_, T> {
    fn entry_id(&self) -> AclResult<Option<&str>> {
        match self.0.identifier() {
            Some("") => Ok(None),
            Some(id) => Ok(Some(id)),
            None => Err(AclError::InvalidEntryType),
        }
    }
}

/// Extract an owned identifier from an entry.
pub(crate) fn extract_id<E: AclEntry + ?Sized>(entry: &E) -> AclResult<Option<String>> {
    Ok(entry.entry_id()?.map(str::to_owned))
}

/// An entry that can describe itself for display.
pub trait DescribeEntry {
    /// Human-readable description of the entry.
    fn entry_description(&self) -> String;
}

impl DescribeEntry for String {
    fn entry_description(&self) -> String {
        self.clone()
    }
}

/// Maps identifiers back to describable entries when rendering a hierarchy.
pub trait EntryLoader {
    /// The entry type produced by this loader.
    type Entry: DescribeEntry;

    /// Look up the entry for an identifier.
    fn retrieve_entry(&self, id: &str) -> Option<Self::Entry>;
}

/// Loader that describes every identifier as itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLoader;

impl EntryLoader for IdentityLoader {
    type Entry = String;

    fn retrieve_entry(&self, id: &str) -> Option<String> {
        Some(id.to_string())
    }
}
