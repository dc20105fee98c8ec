//! Temporary files holding test datasets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Glob pattern for `pattern` inside this directory, as a source path string.
    #[must_use]
    pub fn pattern(&self, pattern: &str) -> String {
        path_string(&self.file_path(pattern))
    }

    /// Write `lines`, each followed by a newline, and return the file's path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_lines<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> std::io::Result<String> {
        let path = self.file_path(filename);
        let mut w = BufWriter::new(File::create(&path)?);
        write_lines_to(&mut w, lines)?;
        w.flush()?;
        Ok(path_string(&path))
    }

    /// Write raw bytes and return the file's path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_bytes(&self, filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        let path = self.file_path(filename);
        std::fs::write(&path, bytes)?;
        Ok(path_string(&path))
    }

    /// Write `lines` gzip-compressed. `filename` should end in `.gz` for the
    /// codec to be picked up on read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[cfg(feature = "compression-gzip")]
    pub fn write_gzip_lines<S: AsRef<str>>(
        &self,
        filename: &str,
        lines: &[S],
    ) -> std::io::Result<String> {
        use flate2::{Compression, write::GzEncoder};

        let path = self.file_path(filename);
        let mut enc = GzEncoder::new(BufWriter::new(File::create(&path)?), Compression::default());
        write_lines_to(&mut enc, lines)?;
        enc.finish()?.flush()?;
        Ok(path_string(&path))
    }
}

impl Default for TempDirPath {
    fn default() -> Self {
        Self::new().expect("Failed to create temporary directory")
    }
}

/// Newline-joined bytes of `lines`, with a trailing newline.
#[must_use]
pub fn lines_to_bytes<S: AsRef<str>>(lines: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(line.as_ref().as_bytes());
        out.push(b'\n');
    }
    out
}

fn write_lines_to<W: Write, S: AsRef<str>>(w: &mut W, lines: &[S]) -> std::io::Result<()> {
    for line in lines {
        w.write_all(line.as_ref().as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
