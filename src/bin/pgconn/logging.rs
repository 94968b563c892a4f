//! Log output for the CLI.
//!
//! Rows are printed to stdout as JSON lines, so log lines go to stderr (and the
//! optional `--log` file) to keep stdout parseable.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::writer::MakeWriter;

/// Writes log lines to stderr and, optionally, a log file.
#[derive(Clone)]
pub(crate) struct LogWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl LogWriter {
    pub(crate) fn new(path: Option<PathBuf>) -> io::Result<Self> {
        let file = match path {
            Some(path) => Some(Arc::new(Mutex::new(File::create(path)?))),
            None => None,
        };
        Ok(Self { file })
    }
}

pub(crate) struct LogWriterGuard {
    file: Option<Arc<Mutex<File>>>,
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriterGuard {
            file: self.file.clone(),
        }
    }
}

fn lock(file: &Mutex<File>) -> MutexGuard<'_, File> {
    match file.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Write for LogWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = &self.file {
            lock(file).write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = &self.file {
            lock(file).flush()?;
        }
        Ok(())
    }
}
