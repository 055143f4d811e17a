//! Transformer runner
//!
//! Runs each transformer from a [`TransformerLoader`] against shared
//! stdin/stdout/stderr, one at a time, stopping at the first failure.
//!
//! For every job the runner:
//! 1. opens the input, output and errors streams,
//! 2. combines the job's rules with the global rules,
//! 3. converts YAML input to JSON for the engine,
//! 4. runs the engine once with all the rules,
//! 5. converts the engine's JSON back to YAML if the output calls for it,
//! 6. releases every stream it opened, whether or not the job succeeded.

use std::io::{self, Read, Write};

use anyhow::Context;
use starq_core::format::{json_to_yaml, yaml_to_json};
use starq_core::iox::{ReadCloser, WriteCloser};
use starq_core::{CloseErrors, Format, GlobalConfig, Transformer, combine_rules};

use crate::engine::JqEngine;
use crate::error::Result;

/// Supplies the jobs for a run and the global rules to apply to each.
pub trait TransformerLoader {
    /// Rules applied around every transformer
    fn global_config(&self) -> &GlobalConfig;

    /// Load every transformer for this run, in run order
    fn load_transformers(&self) -> Result<Vec<Box<dyn Transformer>>>;
}

/// Runs transformers against a fixed set of process streams
pub struct Runner<'io> {
    stdin: Box<dyn Read + 'io>,
    stdout: Box<dyn Write + 'io>,
    stderr: Box<dyn Write + 'io>,
    engine: JqEngine,
}

impl<'io> Runner<'io> {
    /// Create a runner over the given streams using the default `jq` engine
    pub fn new(stdin: impl Read + 'io, stdout: impl Write + 'io, stderr: impl Write + 'io) -> Self {
        Self {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            engine: JqEngine::default(),
        }
    }

    /// Use a different engine
    pub fn with_engine(mut self, engine: JqEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Run every transformer from `loader`, in order.
    ///
    /// Nothing runs if loading fails. The first failing transformer stops the
    /// run; output from earlier transformers is left in place.
    pub fn run_all_transformers(&mut self, loader: &dyn TransformerLoader) -> Result<()> {
        let mut transformers = loader
            .load_transformers()
            .context("failed to load transformers")?;
        let global = loader.global_config();

        tracing::info!("Running {} transformers", transformers.len());
        for transformer in &mut transformers {
            self.run_transformer(transformer.as_mut(), global)?;
        }
        Ok(())
    }

    /// Run a single transformer with the given global rules.
    pub fn run_transformer(
        &mut self,
        transformer: &mut dyn Transformer,
        global: &GlobalConfig,
    ) -> Result<()> {
        tracing::info!("Running transformer from {}", transformer.config().source);

        let Runner {
            stdin,
            stdout,
            stderr,
            engine,
        } = self;
        let mut streams = JobStreams::default();
        let result = execute(
            engine,
            transformer,
            global,
            stdin.as_mut(),
            stdout.as_mut(),
            stderr.as_mut(),
            &mut streams,
        );
        let released = streams.close();
        let closed = transformer.close();

        if let Err(err) = result {
            if let Err(release) = released {
                tracing::warn!("Failed to release streams after error: {}", release);
            }
            if let Err(close) = closed {
                tracing::warn!("Failed to close transformer after error: {}", close);
            }
            return Err(err);
        }
        released.context("failed to release transformer streams")?;
        closed?;

        tracing::info!("Finished transformer from {}", transformer.config().source);
        Ok(())
    }
}

fn execute<'a>(
    engine: &JqEngine,
    transformer: &dyn Transformer,
    global: &GlobalConfig,
    stdin: &'a mut dyn Read,
    stdout: &'a mut dyn Write,
    stderr: &'a mut dyn Write,
    streams: &mut JobStreams<'a>,
) -> Result<()> {
    let config = transformer.config();

    let input = streams.input.insert(transformer.input_reader(stdin)?);
    let rules = combine_rules(&config.rules, global);
    let output = streams.output.insert(transformer.output_writer(stdout)?);
    let errors = streams.errors.insert(transformer.errors_writer(stderr)?);

    let formats = config.formats();
    tracing::debug!(
        "Formats: input {:?}, output {:?}",
        formats.input,
        formats.output
    );

    let mut document = Vec::new();
    input
        .read_to_end(&mut document)
        .context("failed to read input")?;
    if formats.input == Format::Yaml {
        document = yaml_to_json(&document)?;
    }

    if formats.output == Format::Yaml {
        let mut captured = Vec::new();
        engine.execute(&rules, &document, &mut captured, errors)?;
        let yaml = json_to_yaml(&captured)?;
        output
            .write_all(&yaml)
            .context("failed to write YAML output")?;
    } else {
        // Written once the engine exits; see `JqEngine::execute`.
        engine.execute(&rules, &document, output, errors)?;
    }
    Ok(())
}

/// Streams opened for one job, released together.
#[derive(Default)]
struct JobStreams<'a> {
    input: Option<Box<dyn ReadCloser + 'a>>,
    output: Option<Box<dyn WriteCloser + 'a>>,
    errors: Option<Box<dyn WriteCloser + 'a>>,
}

impl JobStreams<'_> {
    /// Close in reverse order of opening. Every stream is closed even if an
    /// earlier one fails.
    fn close(&mut self) -> io::Result<()> {
        let mut failures = CloseErrors::new();
        if let Some(mut errors) = self.errors.take() {
            errors.close().unwrap_or_else(|err| failures.push(err));
        }
        if let Some(mut output) = self.output.take() {
            output.close().unwrap_or_else(|err| failures.push(err));
        }
        if let Some(mut input) = self.input.take() {
            input.close().unwrap_or_else(|err| failures.push(err));
        }
        failures.into_result()
    }
}

impl Drop for JobStreams<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!("Failed to release streams: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starq_core::iox::Close;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl Read for Recorder {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Close for Recorder {
        fn close(&mut self) -> io::Result<()> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                Err(io::Error::other(format!("{} failed", self.name)))
            } else {
                Ok(())
            }
        }
    }

    fn recorder(
        name: &'static str,
        log: &Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    ) -> Box<Recorder> {
        Box::new(Recorder {
            name,
            log: log.clone(),
            fail,
        })
    }

    #[test]
    fn test_streams_close_in_reverse_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut streams = JobStreams {
            input: Some(recorder("input", &log, false)),
            output: Some(recorder("output", &log, false)),
            errors: Some(recorder("errors", &log, false)),
        };
        streams.close().unwrap();
        assert_eq!(*log.borrow(), vec!["errors", "output", "input"]);
    }

    #[test]
    fn test_streams_close_all_and_collect_failures() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut streams = JobStreams {
            input: Some(recorder("input", &log, true)),
            output: Some(recorder("output", &log, false)),
            errors: Some(recorder("errors", &log, true)),
        };
        let err = streams.close().unwrap_err();
        assert_eq!(*log.borrow(), vec!["errors", "output", "input"]);

        let failures = CloseErrors::from_io(&err).unwrap();
        assert_eq!(failures.errors().len(), 2);
        assert_eq!(failures.errors()[0].to_string(), "errors failed");
        assert_eq!(failures.errors()[1].to_string(), "input failed");
    }

    #[test]
    fn test_streams_closed_on_drop_only_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut streams = JobStreams {
                input: Some(recorder("input", &log, false)),
                output: None,
                errors: None,
            };
            streams.output = Some(recorder("output", &log, false));
        }
        assert_eq!(*log.borrow(), vec!["output", "input"]);
    }
}
