use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use datamint_generate::LocaleKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "datamint.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from `datamint.toml`. Every key is optional; command-line
/// flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub seed: Option<u64>,
    pub locale: Option<LocaleKey>,
    pub max_depth: Option<usize>,
    pub separate_files: Option<bool>,
    pub base_date: Option<NaiveDate>,
}

impl FileConfig {
    /// Load the explicit config file, or `datamint.toml` in `cwd` if present.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::load(path),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datamint_cli_{label}_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn parses_every_key() {
        let config: FileConfig = toml::from_str(
            r#"
seed = 42
locale = "pt_BR"
max_depth = 12
separate_files = true
base_date = "2024-03-01"
"#,
        )
        .expect("parse config");
        assert_eq!(
            config,
            FileConfig {
                seed: Some(42),
                locale: Some(LocaleKey::PtBr),
                max_depth: Some(12),
                separate_files: Some(true),
                base_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("sead = 1").is_err());
        assert!(toml::from_str::<FileConfig>("locale = \"fr_FR\"").is_err());
    }

    #[test]
    fn default_file_is_optional_but_explicit_file_is_not() {
        let dir = temp_dir("config");
        assert_eq!(
            FileConfig::discover(None, &dir).expect("no default file"),
            FileConfig::default()
        );

        let missing = dir.join("missing.toml");
        assert!(matches!(
            FileConfig::discover(Some(&missing), &dir),
            Err(ConfigError::NotFound(_))
        ));

        std::fs::write(dir.join(DEFAULT_CONFIG_FILE), "seed = 9\n").expect("write config");
        let config = FileConfig::discover(None, &dir).expect("default file");
        assert_eq!(config.seed, Some(9));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
