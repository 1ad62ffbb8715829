//! Sum file writer in coreutils md5sum text format.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SUM_FILE_FIELD_SEPARATOR: &str = "  ";

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Error creating or writing a sum file.
#[derive(Debug, thiserror::Error)]
pub enum SumFileError {
    /// The destination already exists. The writer never appends to or
    /// truncates a previous run's output.
    #[error("sum file '{0}' already exists, refusing to overwrite")]
    AlreadyExists(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Buffered writer producing one `checksum  path` line per file.
#[derive(Debug)]
pub struct SumFileWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl SumFileWriter {
    /// Create the sum file. Fails before any line is written if `path`
    /// already exists.
    pub fn create(path: &Path) -> Result<Self, SumFileError> {
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    SumFileError::AlreadyExists(path.to_path_buf())
                } else {
                    SumFileError::Io(e)
                }
            })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Write the line for one file, terminated with the platform newline.
    /// Output is buffered; nothing is flushed per line.
    pub fn write_line(&mut self, file: &Path, checksum: &str) -> io::Result<()> {
        write!(
            self.writer,
            "{}{}{}{}",
            checksum,
            SUM_FILE_FIELD_SEPARATOR,
            file.display(),
            LINE_ENDING
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close. Prefer this over dropping so write errors surface.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for SumFileWriter {
    // Flush on early exits too (the close path already flushed).
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
