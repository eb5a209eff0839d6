use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use datamint_core::{DEFAULT_FILENAME, INDEX_PLACEHOLDER};
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::errors::GenerationError;
use crate::output::atomic::write_bytes_atomic;

/// A file written by one of the writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]?\{\{index\}\}[-_]?").expect("placeholder pattern"));

/// File name used in single-file mode: the index placeholder is removed
/// together with one adjacent `-` or `_` on either side.
pub fn single_file_name(filename: &str) -> String {
    let cleaned = PLACEHOLDER.replace_all(filename, "");
    if cleaned.is_empty() || cleaned == ".json" {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned.into_owned()
    }
}

/// File name for record `record_index` (0-based) in separate-files mode.
pub fn record_file_name(filename: &str, record_index: usize) -> String {
    filename.replace(INDEX_PLACEHOLDER, &format!("{:03}", record_index + 1))
}

/// Write every record as one pretty-printed JSON array.
pub fn write_single_file(
    out_dir: &Path,
    filename: &str,
    records: &[Value],
) -> Result<WrittenFile, GenerationError> {
    let path = out_dir.join(single_file_name(filename));
    let data = serde_json::to_vec_pretty(records)?;
    write_bytes_atomic(&path, &data)?;
    Ok(WrittenFile {
        path,
        bytes: data.len() as u64,
    })
}

/// Write each record to its own pretty-printed JSON file.
///
/// Without a placeholder every record lands on the same path; only the last
/// write is returned.
pub fn write_separate_files(
    out_dir: &Path,
    filename: &str,
    records: &[Value],
) -> Result<Vec<WrittenFile>, GenerationError> {
    let indexed = filename.contains(INDEX_PLACEHOLDER);
    if records.len() > 1 && !indexed {
        warn!(
            filename,
            records = records.len(),
            "filename has no {{{{index}}}} placeholder; each record overwrites the previous one"
        );
    }

    let mut written = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let path = out_dir.join(record_file_name(filename, idx));
        let data = serde_json::to_vec_pretty(record)?;
        write_bytes_atomic(&path, &data)?;
        if !indexed {
            written.clear();
        }
        written.push(WrittenFile {
            path,
            bytes: data.len() as u64,
        });
    }
    Ok(written)
}
