/// Integration tests for the conformance checks
///
/// These tests verify that:
/// - Every demo operation round-trips through the schema-matching mock
/// - Schema drift in enums, nullability and inputs is detected and classified
/// - Stale or missing generated files are reported

mod conformance_tests {
    use gqlmirror::check::{check_outputs, diff_schemas, roundtrip_all, DriftChange, Severity, StaleReason};
    use gqlmirror::codegen::{generate_all, write_all};
    use gqlmirror::config::MirrorConfig;
    use gqlmirror::documents::{document_problems, DocumentSet};
    use gqlmirror::mock::MockSchema;
    use gqlmirror::schema::{load_sdl, SchemaModel};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn demo_path(name: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("demos");
        path.push(name);
        path
    }

    fn school_sdl() -> String {
        fs::read_to_string(demo_path("school.graphql")).expect("Failed to read school schema")
    }

    fn load_demo() -> (SchemaModel, DocumentSet) {
        let schema = load_sdl(&school_sdl()).expect("Failed to parse school schema");
        let documents = DocumentSet::load(&[demo_path("operations")]).expect("Failed to load operations");
        (schema, documents)
    }

    #[tokio::test]
    async fn test_demo_operations_roundtrip() {
        let _ = tracing_subscriber::fmt::try_init();

        let (schema, documents) = load_demo();
        let mock = MockSchema::build(&schema).expect("Failed to build mock");

        let failures = roundtrip_all(&mock, &schema, &documents).await;
        assert!(failures.is_empty(), "round trip failures: {:?}", failures);
    }

    #[tokio::test]
    async fn test_roundtrip_catches_new_required_input() {
        let (schema, documents) = load_demo();

        // The server now requires a field the generated inputs never send
        let live = load_sdl(&school_sdl().replace(
            "input SwapInput {\n  first: ID!",
            "input SwapInput {\n  termId: ID!\n  first: ID!",
        ))
        .unwrap();
        let mock = MockSchema::build(&live).unwrap();

        let failures = roundtrip_all(&mock, &schema, &documents).await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].operation, "SwapSlots");
        assert!(failures[0].variables["input"]["first"].is_string());
    }

    #[test]
    fn test_unchanged_schema_has_no_drift() {
        let (schema, _) = load_demo();
        let again = load_sdl(&school_sdl()).unwrap();

        let report = diff_schemas(&schema, &again);
        assert!(report.is_clean());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn test_enum_drift() {
        let (schema, _) = load_demo();
        let live = load_sdl(&school_sdl().replace("  FEMALE\n  MALE\n", "  FEMALE\n  MALE\n  UNSPECIFIED\n")).unwrap();

        let report = diff_schemas(&schema, &live);
        assert_eq!(
            report.changes,
            vec![DriftChange::EnumValueAdded {
                enum_name: "Gender".to_string(),
                value: "UNSPECIFIED".to_string(),
            }]
        );
        assert_eq!(report.count(Severity::Dangerous), 1);
        assert!(!report.has_breaking());

        let removed = diff_schemas(&live, &schema);
        assert!(removed.has_breaking());
    }

    #[test]
    fn test_nullability_drift() {
        let (schema, _) = load_demo();
        let live = load_sdl(&school_sdl().replace("  house: String\n  legacyId", "  house: String!\n  legacyId")).unwrap();

        let report = diff_schemas(&schema, &live);
        assert_eq!(
            report.changes,
            vec![DriftChange::FieldTypeChanged {
                type_name: "Student".to_string(),
                field: "house".to_string(),
                expected: "String".to_string(),
                actual: "String!".to_string(),
            }]
        );
        assert!(report.to_string().contains("Student.house: type changed from String to String!"));
    }

    #[test]
    fn test_removed_field_breaks_operations() {
        let (schema, documents) = load_demo();
        let live = load_sdl(&school_sdl().replace("  conflicts: [String!]\n", "")).unwrap();

        let report = diff_schemas(&schema, &live);
        assert!(report.has_breaking());
        assert!(report.changes.contains(&DriftChange::FieldRemoved {
            type_name: "SwapResult".to_string(),
            field: "conflicts".to_string(),
        }));

        let problems = document_problems(&live, &documents);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("mutation SwapSlots"));
        assert!(problems[0].contains("has no field 'conflicts'"));
    }

    #[test]
    fn test_freshness_detects_stale_outputs() {
        let dir = TempDir::new().unwrap();
        let (schema, documents) = load_demo();

        let mut config = MirrorConfig::example();
        for output in &mut config.output {
            output.path = dir.path().join(&output.path).to_string_lossy().to_string();
        }

        let files = generate_all(&config, &schema, &documents).unwrap();
        let missing = check_outputs(&files).unwrap();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|s| s.reason == StaleReason::Missing));

        write_all(&files).unwrap();
        assert!(check_outputs(&files).unwrap().is_empty());

        // Regenerate against a changed schema: the committed files are now stale
        let live = load_sdl(&school_sdl().replace("  FEMALE\n  MALE\n", "  FEMALE\n  MALE\n  UNSPECIFIED\n")).unwrap();
        let regenerated = generate_all(&config, &live, &documents).unwrap();
        let stale = check_outputs(&regenerated).unwrap();
        assert_eq!(stale.len(), 2);
        assert!(stale.iter().all(|s| matches!(s.reason, StaleReason::Differs { .. })));
    }
}
