//! The jq engine
//!
//! Runs the `jq` executable once per job with every rule expression as a
//! positional argument, in composed order.

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, anyhow, bail};
use starq_core::Rule;

use crate::error::Result;

/// Program used when none is configured
pub const DEFAULT_PROGRAM: &str = "jq";

/// External document-query engine, invoked as a subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JqEngine {
    program: OsString,
}

impl Default for JqEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl JqEngine {
    /// Engine backed by `program` (a name looked up on `PATH`, or a path)
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program this engine runs
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Run the engine over `input` and block until it exits.
    ///
    /// Everything the engine writes to stdout goes to `output` and everything
    /// it writes to stderr goes to `errors`, whether or not it succeeds. A
    /// non-zero exit is reported with the engine's own exit status.
    pub fn execute(
        &self,
        rules: &[Rule],
        input: &[u8],
        output: &mut dyn Write,
        errors: &mut dyn Write,
    ) -> Result<()> {
        let program = self.program.to_string_lossy();
        tracing::debug!("Running {} with {} rules", program, rules.len());
        for rule in rules {
            tracing::debug!("  {}: {}", rule.name, rule.jq);
        }

        let mut child = Command::new(&self.program)
            .args(rules.iter().map(|rule| rule.jq.as_str()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {program}"))?;

        // stdin must be fed while stdout/stderr are drained, or both pipes can fill.
        let stdin = child.stdin.take();
        let (finished, fed) = thread::scope(|scope| {
            let feeder = scope.spawn(move || feed(stdin, input));
            let finished = child.wait_with_output();
            (finished, feeder.join())
        });
        let finished = finished.with_context(|| format!("failed to wait for {program}"))?;

        // Both streams are held in memory until the engine exits, then
        // forwarded in full. Diagnostics are forwarded even if the output
        // sink fails, and a failed engine is reported ahead of either.
        let diagnosed = errors.write_all(&finished.stderr);
        let written = output.write_all(&finished.stdout);

        if !finished.status.success() {
            if let Err(err) = &diagnosed {
                tracing::warn!("Failed to write {} diagnostics: {}", program, err);
            }
            if let Err(err) = &written {
                tracing::warn!("Failed to write {} output: {}", program, err);
            }
            bail!("failed to run {}: {}", program, finished.status);
        }
        diagnosed.with_context(|| format!("failed to write {program} diagnostics"))?;
        written.with_context(|| format!("failed to write {program} output"))?;
        fed.map_err(|_| anyhow!("{program} input writer panicked"))?
            .with_context(|| format!("failed to write input to {program}"))?;

        tracing::debug!("{} finished: {} bytes out", program, finished.stdout.len());
        Ok(())
    }
}

fn feed(stdin: Option<std::process::ChildStdin>, input: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input) {
        // The engine is allowed to stop reading early.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}
