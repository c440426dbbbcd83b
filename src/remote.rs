//! Remote object storage boundary.
//!
//! The build hands finished files to a [`RemoteStore`] after they are
//! safely on local disk. Uploads are strictly best-effort: a failure is
//! logged and the build carries on, so the local artifact always stays
//! downloadable. The shipped implementation mirrors files into a
//! directory; anything network-backed lives behind the same trait.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Destination for finished files, invoked at most once per file per build.
pub trait RemoteStore {
    /// Upload the file at `path` under `name`, returning an opaque
    /// identifier for the stored object.
    fn upload(&self, name: &str, path: &Path) -> io::Result<String>;
}

/// A [`RemoteStore`] that copies files into a local directory.
pub struct DirMirror {
    root: PathBuf,
}

impl DirMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RemoteStore for DirMirror {
    fn upload(&self, name: &str, path: &Path) -> io::Result<String> {
        fs::create_dir_all(&self.root)?;
        let dest = self.root.join(name);
        fs::copy(path, &dest)?;
        Ok(dest.display().to_string())
    }
}

/// Offer a file to the remote store, swallowing failures.
pub fn offer(remote: &dyn RemoteStore, name: &str, path: &Path) {
    match remote.upload(name, path) {
        Ok(id) => log::debug!("uploaded {name} as {id}"),
        Err(e) => log::warn!("remote upload of {name} failed, keeping local copy only: {e}"),
    }
}
