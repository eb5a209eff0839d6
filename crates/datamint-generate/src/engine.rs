use std::path::Path;
use std::time::Instant;

use chrono::{NaiveDateTime, NaiveTime, Utc};
use datamint_core::{CompileOptions, SchemaDocument};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::interpreter::{Interpreter, ProviderUsage};
use crate::model::{GenerateOptions, GenerationReport, OutputMode};
use crate::output::atomic::write_bytes_atomic;
use crate::output::json::{write_separate_files, write_single_file};
use crate::providers::ProviderRegistry;

/// Records resolved from a document, before anything is written.
#[derive(Debug, Clone)]
pub struct GeneratedRecords {
    pub records: Vec<Value>,
    pub seed: u64,
    pub provider_usage: ProviderUsage,
}

/// Entry point for generating records from a schema document.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Load a schema file with this engine's compile options.
    pub fn load_document(&self, path: &Path) -> Result<SchemaDocument, GenerationError> {
        Ok(SchemaDocument::load(path, &self.compile_options()?)?)
    }

    pub fn compile_options(&self) -> Result<CompileOptions, GenerationError> {
        if self.options.max_depth == 0 {
            return Err(GenerationError::InvalidOptions(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(CompileOptions {
            max_depth: self.options.max_depth,
        })
    }

    /// Resolve every record without writing output.
    pub fn generate_records(
        &self,
        document: &SchemaDocument,
        registry: &ProviderRegistry,
    ) -> Result<GeneratedRecords, GenerationError> {
        self.generate_with_seed(document, registry, self.run_seed())
    }

    /// Resolve every record, write the output files and return the report.
    ///
    /// Nothing is written when any record fails to resolve.
    pub fn run(
        &self,
        document: &SchemaDocument,
        registry: &ProviderRegistry,
    ) -> Result<GenerationReport, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self.run_seed();
        let fingerprint = schema_fingerprint(&document.template_source)?;

        info!(
            run_id = %run_id,
            seed,
            records = document.count,
            output_mode = %self.options.output_mode,
            locale = %self.options.locale,
            "generation started"
        );

        let generated = match self.generate_with_seed(document, registry, seed) {
            Ok(generated) => generated,
            Err(err) => {
                warn!(run_id = %run_id, seed, error = %err, "generation failed");
                return Err(err);
            }
        };

        let mut report = GenerationReport::new(run_id.clone(), seed, fingerprint);
        report.records_requested = document.count;
        report.records_generated = generated.records.len() as u64;
        report.output_mode = self.options.output_mode;
        report.provider_usage = generated.provider_usage;

        std::fs::create_dir_all(&self.options.out_dir)?;
        let written = match self.options.output_mode {
            OutputMode::SingleFile => vec![write_single_file(
                &self.options.out_dir,
                &document.filename,
                &generated.records,
            )?],
            OutputMode::SeparateFiles => write_separate_files(
                &self.options.out_dir,
                &document.filename,
                &generated.records,
            )?,
        };
        for file in written {
            debug!(path = %file.path.display(), bytes = file.bytes, "file written");
            report.record_file(file.path, file.bytes);
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        if let Some(path) = &self.options.report_path {
            write_bytes_atomic(path, &serde_json::to_vec_pretty(&report)?)?;
        }

        info!(
            run_id = %run_id,
            records = report.records_generated,
            files = report.files.len(),
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );
        Ok(report)
    }

    fn generate_with_seed(
        &self,
        document: &SchemaDocument,
        registry: &ProviderRegistry,
        seed: u64,
    ) -> Result<GeneratedRecords, GenerationError> {
        let interpreter = Interpreter::new(registry)
            .with_locale(self.options.locale)
            .with_reference_time(self.reference_time());
        let mut usage = ProviderUsage::new();
        let mut records = Vec::new();

        for index in 0..document.count {
            let mut rng = ChaCha8Rng::seed_from_u64(hash_record_seed(seed, index));
            let record = interpreter
                .resolve_counting(&document.template, index, &mut rng, &mut usage)
                .map_err(|source| GenerationError::Record {
                    record: index + 1,
                    source,
                })?;
            records.push(record);
        }

        Ok(GeneratedRecords {
            records,
            seed,
            provider_usage: usage,
        })
    }

    fn run_seed(&self) -> u64 {
        self.options.seed.unwrap_or_else(|| rand::rng().random())
    }

    fn reference_time(&self) -> NaiveDateTime {
        match self.options.base_date {
            Some(date) => date.and_time(NaiveTime::default()),
            None => Utc::now().naive_utc(),
        }
    }
}

/// SHA-256 of the template as written, hex encoded.
pub fn schema_fingerprint(template: &Value) -> Result<String, GenerationError> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(template)?);
    Ok(hex::encode(hasher.finalize()))
}

/// Seed for record `record_index`; records never share a random stream.
pub fn hash_record_seed(run_seed: u64, record_index: u64) -> u64 {
    let mut hash = run_seed ^ record_index.wrapping_mul(0x9e3779b97f4a7c15);
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^ (hash >> 29)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    #[test]
    fn record_seeds_differ_across_indices() {
        let seeds: HashSet<u64> = (0..1000).map(|idx| hash_record_seed(42, idx)).collect();
        assert_eq!(seeds.len(), 1000);
        assert_eq!(hash_record_seed(42, 7), hash_record_seed(42, 7));
        assert_ne!(hash_record_seed(42, 7), hash_record_seed(43, 7));
    }

    #[test]
    fn fingerprint_tracks_template_content() {
        let a = schema_fingerprint(&json!({"a": 1})).expect("fingerprint");
        let b = schema_fingerprint(&json!({"a": 2})).expect("fingerprint");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, schema_fingerprint(&json!({"a": 1})).expect("fingerprint"));
    }

    #[test]
    fn zero_max_depth_is_rejected() {
        let engine = GenerationEngine::new(GenerateOptions {
            max_depth: 0,
            ..GenerateOptions::default()
        });
        assert!(matches!(
            engine.compile_options(),
            Err(GenerationError::InvalidOptions(_))
        ));
    }
}
