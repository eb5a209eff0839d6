use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use datamint_core::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

use crate::locale::LocaleKey;

/// How generated records are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// One pretty-printed JSON array.
    #[default]
    SingleFile,
    /// One pretty-printed JSON file per record.
    SeparateFiles,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::SingleFile => "single_file",
            OutputMode::SeparateFiles => "separate_files",
        })
    }
}

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where output files are written.
    pub out_dir: PathBuf,
    pub output_mode: OutputMode,
    /// Run seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    pub locale: LocaleKey,
    /// Maximum template nesting depth accepted when compiling.
    pub max_depth: usize,
    /// Reference date for relative date providers; today when absent.
    pub base_date: Option<NaiveDate>,
    /// Where to write the generation report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            output_mode: OutputMode::SingleFile,
            seed: None,
            locale: LocaleKey::EnUs,
            max_depth: DEFAULT_MAX_DEPTH,
            base_date: None,
            report_path: None,
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    /// Seed that reproduces this run.
    pub seed: u64,
    /// SHA-256 of the template, hex encoded.
    pub schema_fingerprint: String,
    pub records_requested: u64,
    pub records_generated: u64,
    pub output_mode: OutputMode,
    pub files: Vec<PathBuf>,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub provider_usage: BTreeMap<String, u64>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, schema_fingerprint: String) -> Self {
        Self {
            run_id,
            seed,
            schema_fingerprint,
            records_requested: 0,
            records_generated: 0,
            output_mode: OutputMode::default(),
            files: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
            provider_usage: BTreeMap::new(),
        }
    }

    pub fn record_file(&mut self, path: PathBuf, bytes: u64) {
        self.files.push(path);
        self.bytes_written += bytes;
    }
}
