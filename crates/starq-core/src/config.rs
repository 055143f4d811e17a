//! Transformer configuration
//!
//! A transformer config file describes one job: where the document comes
//! from, where the result goes, and the rules to apply in between.
//!
//! # Configuration Files
//!
//! ```yaml
//! input:
//!   file: ../input/petstore-openapi.json
//! output:
//!   file: ../output/petstore-openapi-readonly.json
//!   format: json
//! rules:
//!   - name: readonly
//!     jq: '.paths |= map_values(with_entries(select(.key == "get")))'
//! ```
//!
//! Relative paths are resolved against the directory containing the config
//! file, not the process working directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::{Format, ResolvedFormats};
use crate::rule::Rule;

/// Where a [`TransformerConfig`] came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Not loaded from a file; relative paths resolve against the working directory
    #[default]
    Default,
    /// Loaded from the file at this absolute path
    File(PathBuf),
}

impl ConfigSource {
    /// Source for a config file. A leading `file://` is stripped and the path made absolute.
    pub fn file(filename: impl AsRef<Path>) -> Result<Self> {
        let filename = filename.as_ref();
        let trimmed = filename
            .to_str()
            .and_then(|s| s.strip_prefix("file://"))
            .map(Path::new)
            .unwrap_or(filename);
        let abs = std::path::absolute(trimmed).map_err(|source| Error::ConfigPath {
            path: filename.to_path_buf(),
            source,
        })?;
        Ok(ConfigSource::File(abs))
    }

    /// The config file path, if this source is a file
    pub fn as_file_name(&self) -> Option<&Path> {
        match self {
            ConfigSource::Default => None,
            ConfigSource::File(path) => Some(path),
        }
    }

    /// Resolve a path named in the config relative to the config file's directory.
    pub fn resolve(&self, relative: &str) -> std::io::Result<PathBuf> {
        match self.as_file_name().and_then(Path::parent) {
            Some(dir) => std::path::absolute(dir.join(relative)),
            None => std::path::absolute(relative),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default => f.write_str("default"),
            ConfigSource::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

/// `input` block of a transformer config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// File to read instead of stdin
    #[serde(default)]
    pub file: Option<String>,

    /// Format of the input document
    #[serde(default)]
    pub format: Option<Format>,
}

/// `output` block of a transformer config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File to write instead of stdout; truncated if it exists
    #[serde(default)]
    pub file: Option<String>,

    /// Format of the output document
    #[serde(default)]
    pub format: Option<Format>,
}

/// `errors` block of a transformer config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsConfig {
    /// File to write engine diagnostics to instead of stderr
    #[serde(default)]
    pub file: Option<String>,
}

/// One transformation job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformerConfig {
    /// Provenance, used to resolve relative file paths
    #[serde(skip)]
    pub source: ConfigSource,

    /// Input document settings
    #[serde(default)]
    pub input: Option<InputConfig>,

    /// Output document settings
    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Engine diagnostics settings
    #[serde(default)]
    pub errors: Option<ErrorsConfig>,

    /// Rules applied in order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl TransformerConfig {
    /// Load a transformer config file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = TransformerConfig::load("sample/config/petstore-json-to-readonly.yaml")?;
    /// println!("{} rules from {}", config.rules.len(), config.source);
    /// ```
    pub fn load(filename: impl AsRef<Path>) -> Result<Self> {
        let source = ConfigSource::file(filename)?;
        let path = source.as_file_name().unwrap_or(Path::new("")).to_path_buf();

        let contents = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let mut config: TransformerConfig =
            serde_yaml::from_str(&contents).map_err(|source| Error::ConfigParse {
                path: path.clone(),
                source,
            })?;
        config.source = source;

        tracing::debug!(
            "Loaded transformer config {} ({} rules)",
            config.source,
            config.rules.len()
        );
        Ok(config)
    }

    /// Configured input file, as written in the config
    pub fn input_file(&self) -> Option<&str> {
        self.input.as_ref().and_then(|i| i.file.as_deref())
    }

    /// Configured output file, as written in the config
    pub fn output_file(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.file.as_deref())
    }

    /// Configured errors file, as written in the config
    pub fn errors_file(&self) -> Option<&str> {
        self.errors.as_ref().and_then(|e| e.file.as_deref())
    }

    /// Resolve the input and output formats of this job
    pub fn formats(&self) -> ResolvedFormats {
        ResolvedFormats::resolve(
            self.input.as_ref().and_then(|i| i.format),
            self.input_file(),
            self.output.as_ref().and_then(|o| o.format),
            self.output_file(),
        )
    }
}
