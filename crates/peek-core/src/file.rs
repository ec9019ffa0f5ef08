//! Source file handling.
use std::fs::File as StdFile;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use peek_error::{Error, Result};

/// Snapshot of a file's bytes together with the mtime observed before reading.
#[derive(Debug, Clone)]
pub struct SourceFile {
    content: Vec<u8>,
    pub modified: SystemTime,
}

impl SourceFile {
    /// Read `path` from disk, stat-ing it first so the recorded mtime is never
    /// newer than the content.
    pub fn read(path: &Path) -> Result<Self> {
        let modified = modified_time(path)?;
        let mut file = StdFile::open(path).map_err(|err| Error::from(err).with_path(path))?;
        let capacity = file.metadata().map_or(0, |meta| meta.len() as usize);
        let mut content = Vec::with_capacity(capacity);
        file.read_to_end(&mut content)
            .map_err(|err| Error::from(err).with_path(path))?;

        Ok(Self { content, modified })
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Current modification time of `path`.
///
/// A missing file maps to `ErrorKind::FileNotFound`.
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    let meta = std::fs::metadata(path).map_err(|err| Error::from(err).with_path(path))?;
    meta.modified()
        .map_err(|err| Error::from(err).with_path(path))
}
