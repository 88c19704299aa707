//! # Actions
//!
//! Defines the actions a permission can be declared for.
//! Four concrete actions are tracked individually; [`Action::All`] is the
//! wildcard that stands in for any action not explicitly set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions that can be granted or denied on a resource.
///
/// - **All**: Wildcard covering every action without its own entry
/// - **Create**: Create new resource instances
/// - **Read**: View resource data
/// - **Update**: Modify existing resource data
/// - **Delete**: Remove resource instances
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Wildcard action.
    ///
    /// Applies to every concrete action that has no explicit entry of its own.
    #[default]
    All,

    /// Create new resource.
    Create,

    /// Read/view resource.
    Read,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,
}

impl Action {
    /// The concrete actions, i.e. every action except the wildcard.
    ///
    /// A permission entry that sets all of these explicitly is treated the
    /// same as one that sets [`Action::All`].
    pub const CONCRETE: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];

    /// Get the string representation of the action.
    ///
    /// # Returns
    ///
    /// A static, uppercase string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::All => "ALL",
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use arbor_acl::action::Action;
    ///
    /// assert_eq!(Action::parse("READ"), Some(Action::Read));
    /// assert_eq!(Action::parse("all"), Some(Action::All));
    /// assert_eq!(Action::parse("*"), Some(Action::All));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ALL" | "*" => Some(Action::All),
            "CREATE" => Some(Action::Create),
            "READ" => Some(Action::Read),
            "UPDATE" => Some(Action::Update),
            "DELETE" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Get all actions, wildcard first.
    pub fn all() -> Vec<Self> {
        vec![
            Action::All,
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
        ]
    }

    /// Check if this is the wildcard action.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Action::All)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(Action::parse("ALL"), Some(Action::All));
        assert_eq!(Action::parse("*"), Some(Action::All));
        assert_eq!(Action::parse("create"), Some(Action::Create));
        assert_eq!(Action::parse("Read"), Some(Action::Read));
        assert_eq!(Action::parse("update"), Some(Action::Update));
        assert_eq!(Action::parse("DELETE"), Some(Action::Delete));

        assert_eq!(Action::parse("write"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn test_action_as_str() {
        assert_eq!(Action::All.as_str(), "ALL");
        assert_eq!(Action::Create.as_str(), "CREATE");
        assert_eq!(Action::Read.as_str(), "READ");
        assert_eq!(Action::Update.as_str(), "UPDATE");
        assert_eq!(Action::Delete.as_str(), "DELETE");
        assert_eq!(Action::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_concrete_excludes_wildcard() {
        assert_eq!(Action::CONCRETE.len(), 4);
        assert!(!Action::CONCRETE.contains(&Action::All));
        assert!(Action::All.is_wildcard());
        assert!(Action::CONCRETE.iter().all(|a| !a.is_wildcard()));
    }

    #[test]
    fn test_default_is_wildcard() {
        assert_eq!(Action::default(), Action::All);
    }

    #[test]
    fn test_all_actions_count() {
        let all = Action::all();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0], Action::All);
    }
}
