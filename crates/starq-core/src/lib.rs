//! starq Core Library
//!
//! This crate provides the core functionality for starq:
//! - Rules and deterministic rule composition
//! - Transformer configuration and stream resolution
//! - Format resolution and the JSON/YAML bridge
//! - Closable stream adapters
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Transformer │────▶│    Rules    │────▶│   Streams   │
//! │   (YAML)    │     │  (combined) │     │ (in/out/err)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use starq_core::{GlobalConfig, TransformerConfig, combine_rules};
//!
//! let config = TransformerConfig::load("./sample/config/simple.yaml")?;
//! let rules = combine_rules(&config.rules, &GlobalConfig::default());
//! for rule in &rules {
//!     println!("{}: {}", rule.name, rule.jq);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod format;
pub mod iox;
pub mod rule;
pub mod transformer;

pub use config::{ConfigSource, TransformerConfig};
pub use error::{CloseErrors, Direction, Error, Result};
pub use format::{Format, ResolvedFormats, resolve_format};
pub use rule::{GlobalConfig, Rule, combine_rules, name_jq_rules};
pub use transformer::Transformer;
