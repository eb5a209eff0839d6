use std::path::Path;

use jsonschema::JSONSchema;
use schemars::{JsonSchema, schema_for};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::template::{CompileOptions, Template};
use crate::validation::{ValidationIssue, ValidationReport, normalized_json_pointer};

/// Filename used when a document does not name its output.
pub const DEFAULT_FILENAME: &str = "output.json";

/// Placeholder replaced by the record number in per-record filenames.
pub const INDEX_PLACEHOLDER: &str = "{{index}}";

/// Wire shape of a schema document, as read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSpec {
    /// Number of records to generate.
    #[schemars(range(min = 1))]
    #[serde(deserialize_with = "deserialize_count")]
    pub count: u64,
    /// Output filename; may embed `{{index}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Record template, possibly containing `$faker`, `$array`, `$oneOf` and
    /// `$nullable` directives.
    pub template: Value,
}

/// Accepts integral floats such as `2.0`, which JSON Schema treats as integers.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(count) = number.as_u64() {
        return Ok(count);
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value >= 1.0 && value < u64::MAX as f64 => {
            Ok(value as u64)
        }
        _ => Err(D::Error::custom(format!(
            "count must be a positive integer, got {number}"
        ))),
    }
}

/// A validated schema document with its compiled template.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub count: u64,
    pub filename: String,
    pub template: Template,
    /// The template as written, kept for fingerprinting.
    pub template_source: Value,
}

impl SchemaDocument {
    /// Read, validate and compile a schema file.
    pub fn load(path: &Path, options: &CompileOptions) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(Error::Io(err)),
        };
        Self::from_json_str(&content, options)
    }

    pub fn from_json_str(content: &str, options: &CompileOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value, options)
    }

    /// Validate a parsed document and compile its template.
    ///
    /// Structural problems (missing `count`, non-positive or fractional
    /// `count`, non-string `filename`) are reported together; template
    /// compilation runs only once the structure is valid.
    pub fn from_value(value: &Value, options: &CompileOptions) -> Result<Self> {
        let report = validate_document_json(value)?;
        if !report.is_ok() {
            return Err(Error::InvalidDocument(report));
        }

        let spec: DocumentSpec = serde_json::from_value(value.clone())?;
        let template = Template::compile_with(&spec.template, "/template", options)?;

        Ok(Self {
            count: spec.count,
            filename: spec
                .filename
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            template,
            template_source: spec.template,
        })
    }
}

/// JSON Schema describing [`DocumentSpec`].
pub fn document_json_schema() -> Result<Value> {
    Ok(serde_json::to_value(schema_for!(DocumentSpec))?)
}

/// Validate a document against the document JSON Schema.
pub fn validate_document_json(document: &Value) -> Result<ValidationReport> {
    let schema = document_json_schema()?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| Error::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(document) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }

    Ok(report)
}
