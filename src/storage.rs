//! Request-scoped storage – the writable directory one build stages
//! uploads in, promotes canonical JPEGs to, and writes its artifact into.
//!
//! Every build gets its own handle instead of sharing an ambient upload
//! folder, so concurrent builds cannot clobber each other's files. All
//! operations speak `io::Result`; the pipeline folds that into its own
//! error type.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Handle to one build's storage directory.
pub struct RequestStore {
    root: PathBuf,
    /// Keeps a temporary directory alive for the store's lifetime.
    _temp: Option<TempDir>,
}

impl RequestStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn at(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, _temp: None })
    }

    /// A store in a fresh temporary directory, removed on drop.
    pub fn temporary() -> io::Result<Self> {
        let temp = TempDir::new()?;
        Ok(Self {
            root: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied name to a path inside the store. Only the
    /// final path component is honoured, so names cannot escape the root.
    fn path_of(&self, name: &str) -> PathBuf {
        let file_name = Path::new(name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "upload".into());
        self.root.join(file_name)
    }

    /// Write an upload's raw bytes under its original name.
    pub fn stage_original(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_of(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Write the canonical JPEG and drop the staged original when its path
    /// differs. After this only the canonical file remains for the upload.
    pub fn promote(&self, staged: &Path, canonical_name: &str, jpeg: &[u8]) -> io::Result<PathBuf> {
        let canonical = self.path_of(canonical_name);
        fs::write(&canonical, jpeg)?;
        if staged != canonical && staged.exists() {
            fs::remove_file(staged)?;
        }
        Ok(canonical)
    }

    /// Persist a finished document under its artifact name.
    pub fn write_artifact(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_of(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Read a previously written artifact back by name.
    pub fn read_artifact(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_of(name))
    }
}
