//! starq Runtime
//!
//! This crate runs transformers through the jq engine.
//!
//! # Features
//!
//! - Deterministic, strictly sequential job execution
//! - JSON/YAML conversion around the engine
//! - Guaranteed release of every stream a job opens
//!
//! # Usage
//!
//! ```rust,ignore
//! use starq_runtime::{Opts, Runner};
//!
//! let opts = Opts { config_files: vec!["sample/config/simple.yaml".into()], ..Default::default() };
//! let mut runner = Runner::new(std::io::stdin(), std::io::stdout(), std::io::stderr());
//! runner.run_all_transformers(&opts)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod opts;
pub mod runner;

pub use engine::JqEngine;
pub use error::{Error, Result};
pub use opts::Opts;
pub use runner::{Runner, TransformerLoader};
