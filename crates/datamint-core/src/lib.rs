//! Core contracts for datamint.
//!
//! This crate defines the schema document, the compiled template model with
//! its directive types, and the error and validation types shared by the
//! generator and the CLI.

pub mod document;
pub mod error;
pub mod template;
pub mod validation;

pub use document::{
    DEFAULT_FILENAME, DocumentSpec, INDEX_PLACEHOLDER, SchemaDocument, document_json_schema,
    validate_document_json,
};
pub use error::{DirectiveError, DirectiveErrorKind, Error, Result};
pub use template::{
    ArrayDirective, Cardinality, CompileOptions, DEFAULT_MAX_DEPTH, DEFAULT_NULL_PROBABILITY,
    Directive, DirectiveKind, DirectiveNode, FakerDirective, NullableDirective, OneOfDirective,
    Template,
};
pub use validation::{ValidationIssue, ValidationReport};
