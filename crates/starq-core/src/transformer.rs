//! The transformer capability
//!
//! A [`Transformer`] is one job as the runner sees it: a config plus the
//! streams that job reads from and writes to. The runner supplies its own
//! stdin/stdout/stderr as defaults; a transformer decides whether to use
//! them or open files named in its config.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::{ConfigSource, TransformerConfig};
use crate::error::{Error, Result};
use crate::iox::{AnyWriter, NopReadCloser, ReadCloser, WriteCloser, nop_write_closer};

/// One transformation job.
pub trait Transformer {
    /// The job's configuration
    fn config(&self) -> &TransformerConfig;

    /// Open the job's input, falling back to `stdin`
    fn input_reader<'a>(&self, stdin: &'a mut dyn Read) -> Result<Box<dyn ReadCloser + 'a>>;

    /// Open the job's output, falling back to `stdout`
    fn output_writer<'a>(&self, stdout: &'a mut dyn Write) -> Result<Box<dyn WriteCloser + 'a>>;

    /// Open the job's diagnostics sink, falling back to `stderr`
    fn errors_writer<'a>(&self, stderr: &'a mut dyn Write) -> Result<Box<dyn WriteCloser + 'a>>;

    /// Release anything the transformer itself holds
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Transformer for TransformerConfig {
    fn config(&self) -> &TransformerConfig {
        self
    }

    fn input_reader<'a>(&self, stdin: &'a mut dyn Read) -> Result<Box<dyn ReadCloser + 'a>> {
        let Some(file) = self.input_file() else {
            return Ok(Box::new(NopReadCloser(stdin)));
        };
        let path = self
            .source
            .resolve(file)
            .map_err(|source| Error::OpenInput {
                path: file.into(),
                source,
            })?;
        tracing::debug!("Opening input file {}", path.display());
        let reader = File::open(&path).map_err(|source| Error::OpenInput { path, source })?;
        Ok(Box::new(BufReader::new(reader)))
    }

    fn output_writer<'a>(&self, stdout: &'a mut dyn Write) -> Result<Box<dyn WriteCloser + 'a>> {
        match self.output_file() {
            None => Ok(nop_write_closer(AnyWriter::writer(stdout))),
            Some(file) => create_file(&self.source, file, |path, source| Error::OpenOutput {
                path,
                source,
            }),
        }
    }

    fn errors_writer<'a>(&self, stderr: &'a mut dyn Write) -> Result<Box<dyn WriteCloser + 'a>> {
        match self.errors_file() {
            None => Ok(nop_write_closer(AnyWriter::writer(stderr))),
            Some(file) => create_file(&self.source, file, |path, source| Error::OpenErrors {
                path,
                source,
            }),
        }
    }
}

/// Open `file` (relative to the config) for truncating write, creating missing parent directories.
fn create_file<'a>(
    source: &ConfigSource,
    file: &str,
    open_error: impl Fn(std::path::PathBuf, std::io::Error) -> Error,
) -> Result<Box<dyn WriteCloser + 'a>> {
    let path = source
        .resolve(file)
        .map_err(|err| open_error(file.into(), err))?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        ensure_dir(dir)?;
    }
    tracing::debug!("Opening output file {}", path.display());
    let writer = File::create(&path).map_err(|err| open_error(path, err))?;
    Ok(Box::new(BufWriter::new(writer)))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
