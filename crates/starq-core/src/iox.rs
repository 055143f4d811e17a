//! Closable stream adapters
//!
//! Jobs hand the runner a mix of owned files and borrowed process streams.
//! These adapters give all of them the same [`Close`] contract so the runner
//! can release every stream the same way, whether or not closing does
//! anything.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use crate::error::CloseErrors;

/// Explicit release of a stream.
///
/// Closing flushes whatever the stream buffers and runs its release hook.
/// Dropping the stream afterwards releases the underlying handle.
pub trait Close {
    /// Release the stream, reporting any failure to do so
    fn close(&mut self) -> io::Result<()>;
}

/// A readable stream that can be closed
pub trait ReadCloser: Read + Close {}

impl<T: Read + Close + ?Sized> ReadCloser for T {}

/// A writable stream that can be closed
pub trait WriteCloser: Write + Close {}

impl<T: Write + Close + ?Sized> WriteCloser for T {}

impl<T: Close + ?Sized> Close for Box<T> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: Close + ?Sized> Close for &mut T {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl Close for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<R: Read> Close for BufReader<R> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Close for BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// A reader that may or may not already know how to close itself.
pub enum AnyReader<'a> {
    /// Already closable
    Closer(Box<dyn ReadCloser + 'a>),
    /// Plain reader without a close capability
    Reader(Box<dyn Read + 'a>),
}

impl<'a> AnyReader<'a> {
    /// Wrap a closable reader
    pub fn closer(reader: impl ReadCloser + 'a) -> Self {
        AnyReader::Closer(Box::new(reader))
    }

    /// Wrap a plain reader
    pub fn reader(reader: impl Read + 'a) -> Self {
        AnyReader::Reader(Box::new(reader))
    }
}

/// A writer that may or may not already know how to close itself.
pub enum AnyWriter<'a> {
    /// Already closable
    Closer(Box<dyn WriteCloser + 'a>),
    /// Plain writer without a close capability
    Writer(Box<dyn Write + 'a>),
}

impl<'a> AnyWriter<'a> {
    /// Wrap a closable writer
    pub fn closer(writer: impl WriteCloser + 'a) -> Self {
        AnyWriter::Closer(Box::new(writer))
    }

    /// Wrap a plain writer
    pub fn writer(writer: impl Write + 'a) -> Self {
        AnyWriter::Writer(Box::new(writer))
    }
}

/// Runs a release hook at most once; later calls succeed without doing anything.
struct OnceHook<'a>(Option<Box<dyn FnOnce() -> io::Result<()> + 'a>>);

impl<'a> OnceHook<'a> {
    fn new(hook: impl FnOnce() -> io::Result<()> + 'a) -> Self {
        Self(Some(Box::new(hook)))
    }

    fn run(&mut self) -> io::Result<()> {
        match self.0.take() {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }
}

/// Reader whose [`Close`] runs a caller supplied hook.
pub struct ProxyReadCloser<'a> {
    reader: Box<dyn Read + 'a>,
    close_fn: OnceHook<'a>,
}

impl Read for ProxyReadCloser<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Close for ProxyReadCloser<'_> {
    fn close(&mut self) -> io::Result<()> {
        self.close_fn.run()
    }
}

/// Give `reader` a close capability.
///
/// A reader that is already closable is returned unchanged and `close_fn` is
/// discarded. Otherwise closing the result runs `close_fn` exactly once.
pub fn proxy_read_closer<'a>(
    reader: AnyReader<'a>,
    close_fn: impl FnOnce() -> io::Result<()> + 'a,
) -> Box<dyn ReadCloser + 'a> {
    match reader {
        AnyReader::Closer(closer) => closer,
        AnyReader::Reader(reader) => Box::new(ProxyReadCloser {
            reader,
            close_fn: OnceHook::new(close_fn),
        }),
    }
}

/// Writer whose [`Close`] runs a caller supplied hook.
pub struct ProxyWriteCloser<'a> {
    writer: Box<dyn Write + 'a>,
    close_fn: OnceHook<'a>,
}

impl<'a> ProxyWriteCloser<'a> {
    /// Wrap `writer` unconditionally; closing runs `close_fn` exactly once
    pub fn new(writer: impl Write + 'a, close_fn: impl FnOnce() -> io::Result<()> + 'a) -> Self {
        Self {
            writer: Box::new(writer),
            close_fn: OnceHook::new(close_fn),
        }
    }
}

impl Write for ProxyWriteCloser<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Close for ProxyWriteCloser<'_> {
    fn close(&mut self) -> io::Result<()> {
        self.close_fn.run()
    }
}

/// Reader with a close that does nothing.
pub struct NopReadCloser<R>(pub R);

impl<R: Read> Read for NopReadCloser<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R> Close for NopReadCloser<R> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer with no release hook of its own.
///
/// Closing still flushes the inner writer, so a borrowed process stream
/// reaches its destination before the job ends. A flush failure is the only
/// way this close can fail.
pub struct NopWriteCloser<W>(pub W);

impl<W: Write> Write for NopWriteCloser<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> Close for NopWriteCloser<W> {
    fn close(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Return `writer` unchanged if it is already closable, otherwise wrap it in a
/// [`NopWriteCloser`], whose close only flushes.
pub fn nop_write_closer<'a>(writer: AnyWriter<'a>) -> Box<dyn WriteCloser + 'a> {
    match writer {
        AnyWriter::Closer(closer) => closer,
        AnyWriter::Writer(writer) => Box::new(NopWriteCloser(writer)),
    }
}

/// Fans every write out to all of its writers and closes all of them together.
pub struct MultiWriteCloser<'a> {
    writers: Vec<Box<dyn WriteCloser + 'a>>,
}

impl<'a> MultiWriteCloser<'a> {
    /// Combine `writers`; writes and closes visit them in this order
    pub fn new(writers: Vec<Box<dyn WriteCloser + 'a>>) -> Self {
        Self { writers }
    }
}

impl Write for MultiWriteCloser<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for writer in &mut self.writers {
            writer.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Close for MultiWriteCloser<'_> {
    /// Closes every writer even when earlier ones fail. All failures come back
    /// together as a [`CloseErrors`].
    fn close(&mut self) -> io::Result<()> {
        let mut errors = CloseErrors::new();
        for writer in &mut self.writers {
            if let Err(err) = writer.close() {
                errors.push(err);
            }
        }
        errors.into_result()
    }
}
