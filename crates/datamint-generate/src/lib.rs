//! Record generation for datamint.
//!
//! A compiled [`datamint_core::Template`] is resolved once per record by the
//! [`Interpreter`], which dispatches `$faker` directives to a
//! [`ProviderRegistry`]. The [`GenerationEngine`] drives a whole document: it
//! derives one RNG per record from the run seed, fails on the first record
//! that cannot be resolved and writes the output files.

pub mod engine;
pub mod errors;
pub mod interpreter;
pub mod locale;
pub mod model;
pub mod output;
pub mod params;
pub mod providers;

pub use engine::{GeneratedRecords, GenerationEngine, hash_record_seed, schema_fingerprint};
pub use errors::{GenerationError, ProviderError};
pub use interpreter::{Interpreter, ProviderUsage};
pub use locale::LocaleKey;
pub use model::{GenerateOptions, GenerationReport, OutputMode};
pub use providers::{Provider, ProviderContext, ProviderRegistry};
