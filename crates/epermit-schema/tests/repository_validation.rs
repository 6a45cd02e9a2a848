//! Integration tests: load schema directories from disk, resolve route
//! references, and validate bodies into raw failures.

use epermit_schema::{
    BodyValidator, FailureArgument, FailureKind, RouteSchemaRef, SchemaError, SchemaRepository,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn schema_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let document = json!({
        "definitions": {
            "phoneNumber": {
                "type": "object",
                "properties": {
                    "areaCode": {"type": "integer", "format": "areaCodeFormat"},
                    "number": {"type": "string", "format": "phoneNumberFormat"}
                },
                "required": ["areaCode", "number"]
            }
        },
        "specialUseApplication": {
            "type": "object",
            "properties": {
                "region": {"type": "string", "enum": ["01", "02", "11"]},
                "dayPhone": {"$ref": "#/definitions/phoneNumber"},
                "plan": {"type": "file", "validExtensions": ["pdf"]}
            },
            "required": ["region", "dayPhone"]
        }
    });
    std::fs::write(
        dir.path().join("validation.json"),
        serde_json::to_string(&document).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("events.yml"),
        "event:\n  type: object\n  required: [startDate]\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("README.txt"), "not a schema").unwrap();
    dir
}

fn resolve(repo: &SchemaRepository, reference: &str) -> epermit_schema::ResolvedSchema {
    let route: RouteSchemaRef = reference.parse().unwrap();
    repo.resolve(&route).unwrap()
}

#[test]
fn test_load_directory_skips_non_schema_files() {
    let dir = schema_dir();
    let repo = SchemaRepository::load(dir.path()).unwrap();
    assert_eq!(repo.document_count(), 2);
    assert_eq!(repo.document_names(), vec!["events.yml", "validation.json"]);
    assert_eq!(repo.schema_dir(), dir.path());
}

#[test]
fn test_malformed_document_fails_load() {
    let dir = schema_dir();
    std::fs::write(dir.path().join("broken.json"), "{\"a\":").unwrap();
    let err = SchemaRepository::load(dir.path()).unwrap_err();
    assert!(matches!(err, SchemaError::DocumentLoad { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_resolve_dereferences_definitions() {
    let dir = schema_dir();
    let repo = SchemaRepository::load(dir.path()).unwrap();
    let resolved = resolve(&repo, "server/schemas/validation.json#specialUseApplication");

    assert_eq!(resolved.route().document(), "validation.json");
    assert_eq!(
        resolved.schema_to_use()["properties"]["dayPhone"],
        json!({"$ref": "#/definitions/phoneNumber"})
    );
    assert_eq!(
        resolved.dereferenced()["properties"]["dayPhone"]["required"],
        json!(["areaCode", "number"])
    );
}

#[test]
fn test_resolve_unknown_targets() {
    let dir = schema_dir();
    let repo = SchemaRepository::load(dir.path()).unwrap();

    let err = repo
        .resolve(&RouteSchemaRef::new("other.json", "specialUseApplication"))
        .unwrap_err();
    assert!(matches!(err, SchemaError::DocumentNotFound { .. }));

    let err = repo
        .resolve(&RouteSchemaRef::new("validation.json", "nope"))
        .unwrap_err();
    assert!(matches!(err, SchemaError::SchemaNotFound { .. }));

    let err = "validation.json".parse::<RouteSchemaRef>().unwrap_err();
    assert!(matches!(err, SchemaError::InvalidRouteRef { .. }));
}

#[test]
fn test_validate_reports_raw_failures() {
    let dir = schema_dir();
    let repo = SchemaRepository::load(dir.path()).unwrap();
    let resolved = resolve(&repo, "validation.json#specialUseApplication");
    let body: Value = json!({
        "region": "99",
        "dayPhone": {"areaCode": 5410, "number": "555-0100"}
    });

    let failures = BodyValidator::new().validate(&body, &resolved).unwrap();
    let mut summary: Vec<(FailureKind, &str)> = failures
        .iter()
        .map(|f| (f.name, f.property.as_str()))
        .collect();
    summary.sort_by_key(|(_, property)| *property);
    assert_eq!(
        summary,
        vec![
            (FailureKind::Format, "instance.dayPhone.areaCode"),
            (FailureKind::Format, "instance.dayPhone.number"),
            (FailureKind::Enum, "instance.region"),
        ]
    );

    let number = failures
        .iter()
        .find(|f| f.property == "instance.dayPhone.number")
        .unwrap();
    assert_eq!(
        number.stack,
        "instance.dayPhone.number does not conform to the \"phoneNumberFormat\" format"
    );
}

#[test]
fn test_validate_yaml_document_required() {
    let dir = schema_dir();
    let repo = SchemaRepository::load(dir.path()).unwrap();
    let resolved = resolve(&repo, "events.yml#event");

    let failures = BodyValidator::new().validate(&json!({}), &resolved).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, FailureKind::Required);
    assert_eq!(failures[0].property, "instance");
    assert_eq!(
        failures[0].argument,
        FailureArgument::Text("startDate".into())
    );
    assert_eq!(failures[0].stack, "instance requires property \"startDate\"");
}

#[test]
fn test_recursive_schema_resolves_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let document = json!({
        "trailSegment": {
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "left": {"$ref": "trailSegment"},
                "right": {"$ref": "trailSegment"}
            },
            "required": ["name"]
        }
    });
    std::fs::write(
        dir.path().join("trails.json"),
        serde_json::to_string(&document).unwrap(),
    )
    .unwrap();
    let repo = SchemaRepository::load(dir.path()).unwrap();
    let resolved = resolve(&repo, "trails.json#trailSegment");
    assert_eq!(
        resolved.dereferenced()["properties"]["left"]["properties"]["left"],
        json!({"$ref": "trailSegment"})
    );

    let body = json!({"name": "Ridge", "left": {"name": "Creek"}, "right": {}});
    let failures = BodyValidator::new().validate(&body, &resolved).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, FailureKind::Required);
    assert_eq!(failures[0].property, "instance.right");
}
