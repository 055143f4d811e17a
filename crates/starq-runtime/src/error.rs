//! Runtime error types
//!
//! Core failures (config, streams, conversion) arrive as `starq_core::Error`
//! and are carried through unchanged; engine and stage failures are added here
//! as context.

/// Result type for runner operations
pub type Result<T> = anyhow::Result<T>;

/// Runner error (anyhow, so the failing stage can be attached as context)
pub type Error = anyhow::Error;
