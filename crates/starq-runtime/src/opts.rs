//! File-based transformer loading

use std::path::PathBuf;

use starq_core::{GlobalConfig, Transformer, TransformerConfig};

use crate::error::Result;
use crate::runner::TransformerLoader;

/// A [`TransformerLoader`] over config files plus the global rules, typically
/// built from command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// Rules applied around every transformer
    pub global: GlobalConfig,

    /// Transformer config files, run in this order
    pub config_files: Vec<PathBuf>,
}

impl Opts {
    /// Whether there are no config files and no global rules
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.config_files.is_empty()
    }
}

impl TransformerLoader for Opts {
    fn global_config(&self) -> &GlobalConfig {
        &self.global
    }

    /// Loads every config file up front. Without any config files the run
    /// gets a single default transformer that reads stdin and writes stdout.
    fn load_transformers(&self) -> Result<Vec<Box<dyn Transformer>>> {
        if self.config_files.is_empty() {
            return Ok(vec![Box::new(TransformerConfig::default())]);
        }
        let mut transformers: Vec<Box<dyn Transformer>> = Vec::with_capacity(self.config_files.len());
        for filename in &self.config_files {
            transformers.push(Box::new(TransformerConfig::load(filename)?));
        }
        Ok(transformers)
    }
}
