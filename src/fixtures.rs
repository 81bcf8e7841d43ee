// Schema documents shared by the unit tests (same files the dev-test-runner walks).

pub const WITH_DEFINITIONS: &str = include_str!("../fixtures/with_definitions.json");
pub const DIRECT: &str = include_str!("../fixtures/direct.json");
pub const WITH_NESTED_DEFINITIONS: &str = include_str!("../fixtures/nested_definitions.json");
pub const PRIMITIVE_TYPES: &str = include_str!("../fixtures/primitive_types.json");
pub const REQUIRED_VALIDATION: &str = include_str!("../fixtures/required_validation.json");
pub const ARRAY_OF_OBJECTS: &str = include_str!("../fixtures/array_of_objects.json");
pub const USER_ROLES: &str = include_str!("../fixtures/user_roles.json");
pub const SELF_REFERENCE: &str = include_str!("../fixtures/self_reference.json");
pub const INCONSISTENT_REQUIRED: &str = include_str!("../fixtures/inconsistent_required.json");
pub const UNRESOLVED_REFERENCE: &str = include_str!("../fixtures/unresolved_reference.json");

/// Every fixture that parses (all of them do; some fail later stages).
pub const ALL: &[&str] = &[
    WITH_DEFINITIONS,
    DIRECT,
    WITH_NESTED_DEFINITIONS,
    PRIMITIVE_TYPES,
    REQUIRED_VALIDATION,
    ARRAY_OF_OBJECTS,
    USER_ROLES,
    SELF_REFERENCE,
    INCONSISTENT_REQUIRED,
    UNRESOLVED_REFERENCE,
];

/// The example from the crate docs.
pub const USER: &str = r#"{"definitions":{"user":{"type":"object","required":["id"],"properties":{"id":{"type":"string"},"name":{"type":"string"}}}}}"#;
