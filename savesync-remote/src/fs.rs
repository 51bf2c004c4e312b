//! The remote filesystem capability the tree operations are written against.

use std::path::Path;

use crate::error::RemoteError;

/// Kind of a remote directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One child of a remote directory. `.` and `..` are never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Metadata returned by [`RemoteFs::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStat {
    pub kind: EntryKind,
    pub size: u64,
}

/// Minimal remote filesystem: enough to mirror a directory tree.
///
/// Paths are POSIX-style strings as produced by [`crate::remote_path`].
/// Every operation is a single request; recursion lives in [`crate::tree`].
pub trait RemoteFs {
    fn stat(&self, path: &str) -> Result<RemoteStat, RemoteError>;

    fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Create one directory. Fails if it exists or its parent is missing.
    fn mkdir(&self, path: &str) -> Result<(), RemoteError>;

    fn remove_file(&self, path: &str) -> Result<(), RemoteError>;

    /// Remove one empty directory.
    fn remove_dir(&self, path: &str) -> Result<(), RemoteError>;

    /// Copy a local file to `remote`, replacing any existing file.
    fn upload(&self, local: &Path, remote: &str) -> Result<(), RemoteError>;

    /// Copy `remote` to a local file, replacing any existing file.
    fn download(&self, remote: &str, local: &Path) -> Result<(), RemoteError>;
}

/// Opens sessions against one remote endpoint.
///
/// A session is closed when it is dropped, so scoping a session to a block
/// closes it on every exit path.
pub trait Connect {
    type Session: RemoteFs;

    fn connect(&self) -> Result<Self::Session, RemoteError>;

    /// Endpoint description for logs. Never includes credentials.
    fn describe(&self) -> String;
}
