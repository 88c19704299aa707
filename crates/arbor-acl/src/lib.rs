//! # Arbor ACL
//!
//! Hierarchical access control: roles and resources each form their own
//! tree, and permissions can be declared on any role/resource pair at any
//! level of either tree.
//!
//! ## Overview
//!
//! The crate is made of three parts:
//! - **Registry**: A forest of identifiers with parent links, one for roles
//!   and one for resources
//! - **PermissionTable**: Grant/deny state per role/resource pair and action,
//!   with `*` as the wildcard on either side
//! - **Acl**: The engine, which walks both ancestor paths and returns the
//!   first definite verdict
//!
//! ## Architecture
//!
//! ```text
//! Key    = role::resource        ("*" = any)
//! Action = ALL | CREATE | READ | UPDATE | DELETE
//!
//! Resolution order for (child, resA):
//!   child::resA  child::resRoot  child::*
//!   parent::resA parent::resRoot parent::*
//!   *::resA      *::resRoot      *::*
//! ```
//!
//! The first pair with a definite verdict wins. Role specificity dominates
//! resource specificity, and the `*::*` key carries the default policy.
//!
//! ## Usage
//!
//! ```
//! use arbor_acl::{Acl, Action};
//!
//! let mut acl = Acl::new();
//! acl.add_role("staff").unwrap();
//! acl.add_role_with_parent("intern", "staff").unwrap();
//! acl.add_resource("wiki").unwrap();
//! acl.add_resource_with_parent("payroll", "wiki").unwrap();
//!
//! acl.allow("staff", "wiki").unwrap();
//! acl.deny("staff", "payroll").unwrap();
//! acl.allow_action("intern", "wiki", Action::Read).unwrap();
//!
//! assert!(acl.is_allowed("staff", "wiki").unwrap());
//! assert!(!acl.is_allowed("staff", "payroll").unwrap());
//!
//! // The intern's own READ grant on the wiki is found before the staff
//! // denial on payroll.
//! assert!(acl.is_allowed_action("intern", "payroll", Action::Read).unwrap());
//! assert!(!acl.is_allowed_action("intern", "payroll", Action::Update).unwrap());
//! ```
//!
//! ## Concurrency
//!
//! [`Acl`] has no internal locking. Queries take `&self` and mutations
//! `&mut self`; wrap the engine in a lock if it is shared between threads.

pub mod acl;
pub mod action;
pub mod config;
pub mod entry;
pub mod error;
pub mod permission;
pub mod registry;
pub mod snapshot;

// Re-export main types for convenience
pub use acl::Acl;
pub use action::Action;
pub use config::{AclConfig, ConfigError, DefaultPolicy};
pub use entry::{AclEntry, DescribeEntry, EntryLoader, HasIdentifier, IdentityLoader, Identified, WILDCARD};
pub use error::{AclError, AclResult};
pub use permission::{ActionMap, PermissionKey, PermissionMap, PermissionTable};
pub use registry::{format_path, ParentMap, Registry};
pub use snapshot::AclSnapshot;
