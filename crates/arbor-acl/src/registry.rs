//! # Hierarchy Registry
//!
//! A forest of string identifiers linked by parent pointers. Roles and
//! resources each get their own registry. An empty parent means the entry
//! hangs directly off the implicit root, written `*` in ancestor paths.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::entry::{DescribeEntry, EntryLoader, WILDCARD};
use crate::error::{AclError, AclResult};
use crate::permission::PermissionKey;

/// Identifier to parent identifier. The empty string marks a top-level entry.
pub type ParentMap = BTreeMap<String, String>;

/// Registry of identifiers organised as a forest.
///
/// # Example
///
/// ```
/// use arbor_acl::registry::Registry;
///
/// let mut reg = Registry::new();
/// reg.add("org", None).unwrap();
/// reg.add("team", Some("org")).unwrap();
/// reg.add("alice", Some("team")).unwrap();
///
/// assert_eq!(reg.ancestor_path(Some("alice")), vec!["alice", "team", "org", "*"]);
/// assert_eq!(reg.ancestor_path(None), vec!["*"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: ParentMap,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: ParentMap::new(),
        }
    }

    /// Add an entry, optionally under an existing parent.
    ///
    /// # Errors
    ///
    /// - [`AclError::InvalidArgument`] if `id` is the wildcard or contains
    ///   the permission key separator
    /// - [`AclError::DuplicateEntry`] if `id` is already registered
    /// - [`AclError::EntryNotFound`] if `parent` is given but not registered
    pub fn add(&mut self, id: &str, parent: Option<&str>) -> AclResult<()> {
        if id == WILDCARD {
            return Err(AclError::InvalidArgument(format!(
                "'{WILDCARD}' is reserved and cannot be registered"
            )));
        }
        check_separator(Some(id))?;
        if self.has(id) {
            return Err(AclError::DuplicateEntry(id.to_string()));
        }
        let parent = match parent {
            Some(p) if !p.is_empty() => {
                if !self.has(p) {
                    return Err(AclError::EntryNotFound(p.to_string()));
                }
                p
            }
            _ => "",
        };
        self.entries.insert(id.to_string(), parent.to_string());
        tracing::debug!(id = %id, parent = %parent, "Registered entry");
        Ok(())
    }

    /// Check if the identifier is registered.
    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Check if any entry has `id` as its parent.
    pub fn has_child(&self, id: &str) -> bool {
        self.entries.values().any(|parent| parent == id)
    }

    /// Get the parent of an entry.
    ///
    /// # Returns
    ///
    /// `None` if the entry is not registered, `Some("")` for top-level entries.
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Direct children of `id`, in identifier order.
    pub fn children(&self, id: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, parent)| parent.as_str() == id)
            .map(|(child, _)| child.clone())
            .collect()
    }

    /// Compute the path from an entry up to the root.
    ///
    /// The path starts at `id` when it is registered, follows parent links
    /// and always ends with the root token `*`. A null or unregistered `id`
    /// yields just `["*"]`. The path is computed fresh on every call.
    pub fn ancestor_path(&self, id: Option<&str>) -> Vec<String> {
        let mut path = Vec::new();
        let Some(mut current) = id else {
            path.push(WILDCARD.to_string());
            return path;
        };
        let mut seen = BTreeSet::new();

        while let Some(parent) = self.entries.get(current) {
            if !seen.insert(current) {
                tracing::warn!(id = %current, "Parent cycle detected in registry");
                break;
            }
            path.push(current.to_string());
            current = parent.as_str();
        }
        path.push(WILDCARD.to_string());
        path
    }

    /// Remove an entry.
    ///
    /// Without `cascade`, direct children of `id` are reattached to `id`'s
    /// own parent. With `cascade`, every descendant is removed as well.
    ///
    /// # Returns
    ///
    /// Every removed identifier, `id` first.
    ///
    /// # Errors
    ///
    /// [`AclError::EntryNotFound`] if `id` is not registered.
    pub fn remove(&mut self, id: &str, cascade: bool) -> AclResult<Vec<String>> {
        let parent = self
            .entries
            .remove(id)
            .ok_or_else(|| AclError::EntryNotFound(id.to_string()))?;
        let mut removed = vec![id.to_string()];

        if cascade {
            let mut pending: VecDeque<String> = self.children(id).into();
            while let Some(child) = pending.pop_front() {
                if self.entries.remove(&child).is_none() {
                    continue;
                }
                pending.extend(self.children(&child));
                removed.push(child);
            }
        } else {
            for child in self.children(id) {
                self.entries.insert(child, parent.clone());
            }
        }

        tracing::debug!(id = %id, cascade, removed = removed.len(), "Removed entry");
        Ok(removed)
    }

    /// Number of registered entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of the parent map, detached from the registry.
    pub fn export(&self) -> ParentMap {
        self.entries.clone()
    }

    /// Replace the registry contents with a copy of `map`.
    pub fn import_registry(&mut self, map: &ParentMap) {
        self.entries = map.clone();
        tracing::debug!(entries = self.entries.len(), "Imported registry");
    }

    /// Render the hierarchy as an indented tree.
    ///
    /// Each entry is printed as `- <description>`, indented one space per
    /// level. Identifiers the loader does not know are printed verbatim.
    pub fn display<L: EntryLoader>(&self, loader: &L) -> String {
        let mut out = String::new();
        let mut stack: Vec<(String, String)> = self
            .children("")
            .into_iter()
            .rev()
            .map(|id| (id, String::new()))
            .collect();

        while let Some((id, leading)) = stack.pop() {
            let description = loader
                .retrieve_entry(&id)
                .map(|entry| entry.entry_description())
                .unwrap_or_else(|| id.clone());
            out.push_str(&leading);
            out.push_str("- ");
            out.push_str(&description);
            out.push('\n');

            let nested = format!(" {leading}");
            for child in self.children(&id).into_iter().rev() {
                stack.push((child, nested.clone()));
            }
        }
        out
    }
}

/// Render an ancestor path as `- -> a -> b -> * <`.
pub fn format_path<S: AsRef<str>>(path: &[S]) -> String {
    let mut out = String::from("-");
    for id in path {
        out.push_str(" -> ");
        out.push_str(id.as_ref());
    }
    out.push_str(" <");
    out
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.entries.keys().map(String::len).max().unwrap_or(0);
        for (id, parent) in &self.entries {
            let parent = if parent.is_empty() { WILDCARD } else { parent };
            writeln!(f, "\t{id:>width$} - {parent}")?;
        }
        Ok(())
    }
}

/// Reject identifiers that would make a `role::resource` key ambiguous.
pub(crate) fn check_separator(id: Option<&str>) -> AclResult<()> {
    match id {
        Some(id) if id.contains(PermissionKey::SEPARATOR) => Err(AclError::InvalidArgument(format!(
            "identifier '{id}' must not contain '{}'",
            PermissionKey::SEPARATOR
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::IdentityLoader;

    #[test]
    fn test_add_remove_entry() {
        let mut reg = Registry::new();
        assert_eq!(reg.size(), 0);

        reg.add("RES-1", None).unwrap();
        assert_eq!(reg.size(), 1);

        let err = reg.add("RES-1", None).unwrap_err();
        assert_eq!(err.to_string(), "Entry 'RES-1' is already in the registry.");

        reg.add("RES-2", None).unwrap();
        assert_eq!(reg.size(), 2);

        let err = reg.remove("RES", false).unwrap_err();
        assert_eq!(err.to_string(), "Entry 'RES' is not in registry.");

        let removed = reg.remove("RES-1", false).unwrap();
        assert_eq!(reg.size(), 1);
        assert_eq!(removed, vec!["RES-1"]);
    }

    #[test]
    fn test_add_rejects_reserved_ids() {
        let mut reg = Registry::new();
        let err = reg.add("*", None).unwrap_err();
        assert!(matches!(err, AclError::InvalidArgument(_)));
        assert!(!reg.has("*"));

        reg.add("org", None).unwrap();
        let err = reg.add("*", Some("org")).unwrap_err();
        assert!(matches!(err, AclError::InvalidArgument(_)));

        let err = reg.add("team::a", Some("org")).unwrap_err();
        assert!(matches!(err, AclError::InvalidArgument(_)));
        assert_eq!(reg.size(), 1);
        assert_eq!(reg.ancestor_path(Some("org")), vec!["org", "*"]);

        // A single colon is an ordinary character.
        reg.add("team:a", Some("org")).unwrap();
    }

    #[test]
    fn test_add_requires_parent() {
        let mut reg = Registry::new();
        let err = reg.add("RES-1-A", Some("RES-1")).unwrap_err();
        assert_eq!(err, AclError::EntryNotFound("RES-1".into()));
        assert_eq!(reg.size(), 0);

        // An empty parent is the same as no parent.
        reg.add("RES-1", Some("")).unwrap();
        assert_eq!(reg.parent("RES-1"), Some(""));
    }

    #[test]
    fn test_add_remove_parents() {
        let mut reg = Registry::new();
        reg.add("RES-1", None).unwrap();
        reg.add("RES-2", None).unwrap();
        reg.add("RES-1-A", Some("RES-1")).unwrap();
        reg.add("RES-1-B", Some("RES-1")).unwrap();
        reg.add("RES-2-A", Some("RES-2")).unwrap();
        reg.add("RES-1-B-1", Some("RES-1-B")).unwrap();
        reg.add("RES-2-A-1", Some("RES-2-A")).unwrap();
        reg.add("RES-2-A-1-i", Some("RES-2-A-1")).unwrap();
        assert_eq!(reg.size(), 8);

        let removed = reg.remove("RES-2", true).unwrap();
        assert_eq!(reg.size(), 4);
        assert_eq!(removed, vec!["RES-2", "RES-2-A", "RES-2-A-1", "RES-2-A-1-i"]);

        let removed = reg.remove("RES-1-B", false).unwrap();
        assert_eq!(removed, vec!["RES-1-B"]);
        assert_eq!(reg.size(), 3);
        assert!(reg.has("RES-1-B-1"));
        assert_eq!(reg.parent("RES-1-B-1"), Some("RES-1"));
        assert!(reg.has_child("RES-1"));

        reg.remove("RES-1-B-1", false).unwrap();
        reg.remove("RES-1-A", true).unwrap();
        assert_eq!(reg.size(), 1);
        assert!(!reg.has_child("RES-1"));
    }

    #[test]
    fn test_ancestor_path() {
        let mut reg = Registry::new();
        assert_eq!(reg.ancestor_path(Some("ROLE-1")), vec!["*"]);

        reg.add("ROLE-1", None).unwrap();
        assert_eq!(reg.ancestor_path(Some("ROLE-1")), vec!["ROLE-1", "*"]);

        reg.add("ROLE-2", None).unwrap();
        reg.add("ROLE-1-1", Some("ROLE-1")).unwrap();
        assert_eq!(reg.ancestor_path(Some("ROLE-1")), vec!["ROLE-1", "*"]);
        assert_eq!(
            reg.ancestor_path(Some("ROLE-1-1")),
            vec!["ROLE-1-1", "ROLE-1", "*"]
        );

        reg.add("ROLE-1-1-1", Some("ROLE-1-1")).unwrap();
        assert_eq!(
            reg.ancestor_path(Some("ROLE-1-1-1")),
            vec!["ROLE-1-1-1", "ROLE-1-1", "ROLE-1", "*"]
        );
        assert_eq!(reg.ancestor_path(None), vec!["*"]);
    }

    #[test]
    fn test_remove_reparents_children() {
        let mut reg = Registry::new();
        reg.add("a", None).unwrap();
        reg.add("b", Some("a")).unwrap();
        reg.add("c", Some("b")).unwrap();

        reg.remove("b", false).unwrap();
        assert_eq!(reg.ancestor_path(Some("c")), vec!["c", "a", "*"]);
    }

    #[test]
    fn test_remove_top_level_reparents_to_root() {
        let mut reg = Registry::new();
        reg.add("a", None).unwrap();
        reg.add("b", Some("a")).unwrap();

        reg.remove("a", false).unwrap();
        assert_eq!(reg.parent("b"), Some(""));
        assert_eq!(reg.ancestor_path(Some("b")), vec!["b", "*"]);
    }

    #[test]
    fn test_remove_cascade_whole_tree() {
        let mut reg = Registry::new();
        reg.add("a", None).unwrap();
        reg.add("b", Some("a")).unwrap();
        reg.add("c", Some("b")).unwrap();

        let removed: BTreeSet<String> = reg.remove("a", true).unwrap().into_iter().collect();
        let expected: BTreeSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(removed, expected);
        assert_eq!(reg.size(), 0);
    }

    #[test]
    fn test_remove_cascade_deep_chain() {
        let mut reg = Registry::new();
        reg.add("n0", None).unwrap();
        for i in 1..5_000 {
            reg.add(&format!("n{i}"), Some(format!("n{}", i - 1).as_str()))
                .unwrap();
        }
        let removed = reg.remove("n0", true).unwrap();
        assert_eq!(removed.len(), 5_000);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_cycle_in_imported_map_terminates() {
        let mut map = ParentMap::new();
        map.insert("a".into(), "b".into());
        map.insert("b".into(), "a".into());
        let mut reg = Registry::new();
        reg.import_registry(&map);

        assert_eq!(reg.ancestor_path(Some("a")), vec!["a", "b", "*"]);
    }

    #[test]
    fn test_export_is_detached() {
        let mut reg = Registry::new();
        reg.add("a", None).unwrap();
        let exported = reg.export();

        reg.add("b", Some("a")).unwrap();
        assert_eq!(exported.len(), 1);

        let mut imported = exported.clone();
        let mut other = Registry::new();
        other.import_registry(&imported);
        imported.insert("z".into(), String::new());
        assert_eq!(other.size(), 1);
        assert!(!other.has("z"));
    }

    #[test]
    fn test_display_tree() {
        let mut reg = Registry::new();
        reg.add("R1", None).unwrap();
        reg.add("R2", None).unwrap();
        reg.add("R1-a", Some("R1")).unwrap();
        reg.add("R1-a-1", Some("R1-a")).unwrap();

        assert_eq!(
            reg.display(&IdentityLoader),
            "- R1\n - R1-a\n  - R1-a-1\n- R2\n"
        );
    }

    #[test]
    fn test_to_string_and_path() {
        let mut reg = Registry::new();
        reg.add("root", None).unwrap();
        reg.add("leaf", Some("root")).unwrap();

        assert_eq!(reg.to_string(), "\tleaf - root\n\troot - *\n");
        assert_eq!(
            format_path(&reg.ancestor_path(Some("leaf"))),
            "- -> leaf -> root -> * <"
        );
    }
}
