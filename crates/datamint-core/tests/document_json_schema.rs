use datamint_core::{CompileOptions, SchemaDocument, document_json_schema, validate_document_json};
use serde_json::json;

#[test]
fn json_schema_requires_count_and_template() {
    let schema = document_json_schema().expect("document schema");
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|value| value.as_array())
        .expect("required array")
        .iter()
        .filter_map(|value| value.as_str())
        .collect();

    assert!(required.contains(&"count"));
    assert!(required.contains(&"template"));
    assert!(!required.contains(&"filename"));
}

#[test]
fn count_has_a_lower_bound_of_one() {
    let schema = document_json_schema().expect("document schema");
    let minimum = schema
        .pointer("/properties/count/minimum")
        .and_then(|value| value.as_f64())
        .expect("count minimum");
    assert_eq!(minimum, 1.0);
}

#[test]
fn example_document_passes_validation() {
    let document = json!({
        "count": 3,
        "filename": "r-{{index}}.json",
        "template": {
            "id": {"$faker": "number.int"},
            "tags": {"$array": {"element": "x", "count": 2}}
        }
    });

    let report = validate_document_json(&document).expect("validate");
    assert!(report.is_ok(), "unexpected issues: {report}");

    let doc = SchemaDocument::from_value(&document, &CompileOptions::default())
        .expect("compile document");
    assert_eq!(doc.count, 3);
    assert_eq!(doc.filename, "r-{{index}}.json");
    assert_eq!(doc.template_source, document["template"]);
}

#[test]
fn non_object_documents_are_rejected() {
    for document in [json!(null), json!("schema"), json!(42)] {
        let report = validate_document_json(&document).expect("validate");
        assert!(!report.is_ok(), "{document} should be rejected");
    }
}
