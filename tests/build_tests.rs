//! Build-mode tests against the fixture API description.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glapi_model::document::KindEntry;
use glapi_model::{load_document, Api, ApiDocument, ApiError, CategoryKind, OutputFormat};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn names<'a>(keys: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    keys.cloned().collect()
}

fn fixture_api() -> Api {
    let root = load_document(fixtures_path().join("gl_api/gl_API.xml")).unwrap();
    Api::from_xml(&root).unwrap()
}

// =============================================================================
// Model
// =============================================================================

#[test]
fn test_fixture_counts() {
    let api = fixture_api();
    assert_eq!(api.categories().len(), 6);
    assert_eq!(api.enums().len(), 9);
    assert_eq!(api.functions().len(), 9);
    assert_eq!(api.types().len(), 10);
}

#[test]
fn test_included_categories_are_read() {
    let api = fixture_api();
    let sync = &api.categories()["GL_ARB_sync"];
    assert_eq!(
        sync.kind(),
        &CategoryKind::Extension {
            name: "GL_ARB_sync".to_string()
        }
    );
    assert!(sync.functions.contains("ClientWaitSync"));
    assert_eq!(
        api.categories()["1.3"].kind(),
        &CategoryKind::GlVersion { version_x10: 13 }
    );
}

#[test]
fn test_enum_values_decoded() {
    let api = fixture_api();
    assert_eq!(api.enums()["VENDOR"].value_int, 0x1F00);
    assert_eq!(api.enums()["WAIT_FAILED"].value_int, 0x911D);
    assert_eq!(api.enums()["WAIT_FAILED"].value_str, "0x911Du");
    assert_eq!(
        api.enums()["TIMEOUT_IGNORED"].value_int,
        i128::from(u64::MAX)
    );
}

#[test]
fn test_shared_enum_listed_in_both_categories() {
    let api = fixture_api();
    assert!(api.categories()["1.3"].enums.contains("TEXTURE0"));
    assert!(api.categories()["GL_ARB_multitexture"].enums.contains("TEXTURE0"));
}

#[test]
fn test_function_types_canonical() {
    let api = fixture_api();
    assert_eq!(api.functions()["GetString"].return_type, "const GLubyte *");
    assert_eq!(api.functions()["End"].return_type, "void");
    assert_eq!(
        api.functions()["CreateSyncFromCLeventARB"].param_types(),
        vec!["struct _cl_context *", "struct _cl_event *", "GLbitfield"]
    );
}

#[test]
fn test_alias_sets() {
    let api = fixture_api();
    let sets = api.function_aliases().synonym_sets();
    assert_eq!(sets.len(), 8);
    let multitexture = api.function_aliases().synonyms_of("ActiveTexture").unwrap();
    assert_eq!(
        multitexture.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["ActiveTexture", "ActiveTextureARB"]
    );
}

#[test]
fn test_conflicting_fixture_fails_fast() {
    let root = load_document(fixtures_path().join("invalid_api.xml")).unwrap();
    let err = Api::from_xml(&root).unwrap_err();
    match err {
        ApiError::InconsistentEnum { name, existing, new } => {
            assert_eq!(name, "FOO");
            assert_eq!(existing, "0x10");
            assert_eq!(new, "16");
        }
        other => panic!("Expected InconsistentEnum, got {:?}", other),
    }
}

// =============================================================================
// Serialized output
// =============================================================================

#[test]
fn test_json_round_trip_recovers_names() {
    let api = fixture_api();
    let json = api.to_json().unwrap();
    let document = ApiDocument::from_json(&json).unwrap();

    assert_eq!(names(document.categories.keys()), names(api.categories().keys()));
    assert_eq!(names(document.enums.keys()), names(api.enums().keys()));
    assert_eq!(names(document.functions.keys()), names(api.functions().keys()));
    assert_eq!(names(document.types.keys()), names(api.types().keys()));
    assert_eq!(document, api.to_document());
}

#[test]
fn test_json_category_kinds() {
    let document = fixture_api().to_document();
    assert_eq!(
        document.categories["1.0"].kind,
        KindEntry::Gl { gl_10x_version: 10 }
    );
    assert_eq!(
        document.categories["GL_ARB_cl_event"].kind,
        KindEntry::Extension {
            extension_name: "GL_ARB_cl_event".to_string()
        }
    );
}

#[test]
fn test_json_is_byte_identical_across_runs() {
    let first = fixture_api().to_json_with(OutputFormat::Compact).unwrap();
    let second = fixture_api().to_json_with(OutputFormat::Compact).unwrap();
    assert_eq!(first, second);

    let pretty = fixture_api().to_json().unwrap();
    assert!(pretty.starts_with("{\n  \"categories\": {\n    \"1.0\": {"));
}

#[test]
fn test_json_sets_are_sorted() {
    let value: serde_json::Value =
        serde_json::from_str(&fixture_api().to_json().unwrap()).unwrap();
    assert_eq!(
        value["categories"]["1.0"]["functions"],
        serde_json::json!(["Begin", "End", "GetString"])
    );
    assert_eq!(
        value["function_alias_sets"][0],
        serde_json::json!(["ActiveTexture", "ActiveTextureARB"])
    );
}
