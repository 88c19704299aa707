//! Export/import tests, including a JSON round trip of a saved snapshot.

use arbor_acl::{Acl, AclError, AclSnapshot, Action, IdentityLoader, PermissionKey};

const SAVED: &str = r#"{
    "resources": {
        "laser-gun": "",
        "light-sabre": "",
        "staff": "light-sabre",
        "t": "light-sabre"
    },
    "roles": {
        "jedi": "",
        "sith": "",
        "obiwan": "jedi",
        "luke": "jedi",
        "darth-vader": "sith",
        "darth-maul": "sith"
    },
    "permissions": {
        "*::*": { "ALL": false },
        "jedi::light-sabre": { "ALL": true },
        "jedi::laser-gun": { "ALL": false },
        "sith::light-sabre": { "ALL": true },
        "sith::laser-gun": { "ALL": true },
        "luke::laser-gun": { "ALL": true },
        "jedi::t": { "ALL": false }
    }
}"#;

fn saved() -> AclSnapshot {
    serde_json::from_str(SAVED).unwrap()
}

#[test]
fn test_exports_are_snapshots() {
    let mut acl = Acl::new();
    let resources = acl.export_resources();
    let roles = acl.export_roles();
    let perms = acl.export_permissions();

    acl.add_resource("laser-gun").unwrap();
    acl.add_role("jedi").unwrap();
    acl.deny("jedi", "laser-gun").unwrap();

    assert!(acl.export_resources().len() > resources.len());
    assert!(acl.export_roles().len() > roles.len());
    assert!(acl.export_permissions().len() > perms.len());
}

#[test]
fn test_import_into_populated_engine_fails() {
    let snapshot = saved();
    let mut acl = Acl::new();
    acl.add_resource("laser-gun").unwrap();
    acl.add_role("jedi").unwrap();
    acl.deny("jedi", "laser-gun").unwrap();

    assert_eq!(
        acl.import_resources(&snapshot.resources),
        Err(AclError::NonEmptyRegistry("resources"))
    );
    assert_eq!(
        acl.import_roles(&snapshot.roles),
        Err(AclError::NonEmptyRegistry("roles"))
    );
    assert_eq!(
        acl.import_permissions(&snapshot.permissions),
        Err(AclError::NonEmptyRegistry("permissions"))
    );
}

#[test]
fn test_import_saved_data() {
    let snapshot = saved();
    let mut acl = Acl::new();
    acl.allow("someone", "something").unwrap();
    acl.clear();

    acl.import_resources(&snapshot.resources).unwrap();
    acl.import_roles(&snapshot.roles).unwrap();
    acl.import_permissions(&snapshot.permissions).unwrap();

    assert!(!acl.visualize().is_empty());
    assert!(!acl.visualize_permissions().is_empty());
    assert!(acl
        .visualize_resources(&IdentityLoader)
        .contains("- light-sabre\n - staff\n - t\n"));
    assert!(acl.visualize_roles(&IdentityLoader).contains(" - luke\n"));

    assert!(acl.is_allowed("jedi", "light-sabre").unwrap());
    assert!(acl.is_denied("jedi", "laser-gun").unwrap());
    assert!(acl.is_allowed("luke", "laser-gun").unwrap());
    assert!(acl.is_allowed("sith", "laser-gun").unwrap());
    assert!(acl.is_denied("jedi", "t").unwrap());
    assert!(acl.is_allowed("obiwan", "staff").unwrap());

    acl.deny("sith", "laser-gun").unwrap();
    acl.add_resource_with_parent("double", "light-sabre").unwrap();
    acl.add_role_with_parent("anakin", "jedi").unwrap();
    acl.allow_action("jedi", "double", Action::Update).unwrap();

    // The UPDATE grant is redundant with the ALL grant on light-sabre.
    assert!(acl.is_allowed("jedi", "double").unwrap());
    assert!(acl.is_allowed_action("jedi", "double", Action::Update).unwrap());

    acl.deny_action("jedi", "double", Action::Create).unwrap();
    assert!(!acl.is_allowed("jedi", "double").unwrap());
    assert!(acl.is_allowed_action("jedi", "double", Action::Update).unwrap());
    assert!(acl.is_denied_action("luke", "double", Action::Create).unwrap());
    assert!(acl.is_denied_action("anakin", "double", Action::Create).unwrap());
    assert!(acl.is_denied("sith", "laser-gun").unwrap());
    assert!(acl.is_denied("jedi", "t").unwrap());

    // The imported data is not aliased.
    assert!(acl.export_resources().len() > snapshot.resources.len());
    assert!(acl.export_roles().len() > snapshot.roles.len());
    assert!(acl.export_permissions().len() > snapshot.permissions.len());
}

#[test]
fn test_snapshot_json_round_trip() {
    let mut acl = Acl::new();
    acl.restore(&saved()).unwrap();
    acl.deny_action("luke", "staff", Action::Delete).unwrap();

    let json = serde_json::to_string(&acl.snapshot()).unwrap();
    assert!(json.contains(r#""luke::staff":{"DELETE":false}"#));

    let parsed: AclSnapshot = serde_json::from_str(&json).unwrap();
    let mut restored = Acl::new();
    restored.restore(&parsed).unwrap();

    assert_eq!(restored, acl);
    let key = PermissionKey::new(Some("luke"), Some("staff"));
    assert_eq!(
        restored.permissions().get(&key).and_then(|m| m.get(&Action::Delete)),
        Some(&false)
    );
}

#[test]
fn test_colon_identifiers_round_trip() {
    let mut acl = Acl::new();
    acl.add_role("org:admin").unwrap();
    acl.add_resource("urn:doc").unwrap();
    acl.add_resource_with_parent("urn:doc:1", "urn:doc").unwrap();
    acl.allow("org:admin", "urn:doc").unwrap();
    assert!(acl.allow("org::admin", "urn:doc").is_err());

    let json = serde_json::to_string(&acl.snapshot()).unwrap();
    let parsed: AclSnapshot = serde_json::from_str(&json).unwrap();
    let mut restored = Acl::new();
    restored.restore(&parsed).unwrap();

    assert_eq!(restored, acl);
    assert!(restored.is_allowed("org:admin", "urn:doc:1").unwrap());
}

#[test]
fn test_malformed_permission_key_rejected() {
    let raw = r#"{ "permissions": { "no-separator": { "ALL": true } } }"#;
    assert!(serde_json::from_str::<AclSnapshot>(raw).is_err());

    let raw = r#"{ "permissions": { "a::b": { "EXECUTE": true } } }"#;
    assert!(serde_json::from_str::<AclSnapshot>(raw).is_err());

    let raw = r#"{ "permissions": { "a::b::c": { "ALL": true } } }"#;
    assert!(serde_json::from_str::<AclSnapshot>(raw).is_err());
}
