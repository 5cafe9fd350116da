use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Where downloads end up.
pub trait DownloadSink {
    /// Store `bytes` under `filename`; returns where it was saved.
    fn save(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Keeps downloads in memory, keyed by filename. Later saves overwrite.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filename: &str) -> Option<&[u8]> {
        self.files.get(filename).map(Vec::as_slice)
    }
}

impl DownloadSink for MemorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.files.insert(filename.to_string(), bytes.to_vec());
        Ok(PathBuf::from(filename))
    }
}
