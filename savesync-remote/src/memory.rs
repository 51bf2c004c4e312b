//! In-process remote filesystem.
//!
//! `MemoryFs` behaves like a strict SFTP server: `mkdir` needs an existing
//! parent, `rmdir` needs an empty directory, and path strings are taken
//! literally, so `/C:/saves` and `C:/saves` are different locations. Clones
//! share the same tree, which lets a test hold one handle while the code
//! under test connects through another.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{local_err, remote_io_err, RemoteError, RemoteOp};
use crate::fs::{Connect, EntryKind, RemoteEntry, RemoteFs, RemoteStat};
use crate::remote_path::normalize;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    protected: BTreeSet<String>,
}

/// Shared in-memory remote tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<Mutex<State>>,
    reachable: bool,
    connections: Arc<AtomicUsize>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self {
            reachable: true,
            ..Self::default()
        }
    }

    /// A remote whose every connection attempt is refused.
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Number of sessions opened through [`Connect::connect`].
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Create `path` and its ancestors.
    pub fn create_dir_all(&self, path: &str) {
        let path = normalize(path);
        let mut state = self.lock();
        let mut cur = String::new();
        for (i, seg) in path.split('/').enumerate() {
            if seg.is_empty() {
                if i == 0 {
                    cur.push('/');
                }
                continue;
            }
            if !cur.is_empty() && !cur.ends_with('/') {
                cur.push('/');
            }
            cur.push_str(seg);
            state.nodes.entry(cur.clone()).or_insert(Node::Dir);
        }
    }

    /// Write a file, creating its parent directories.
    pub fn write_file(&self, path: &str, contents: &[u8]) {
        let path = normalize(path);
        if let Some(parent) = parent_of(&path) {
            self.create_dir_all(parent);
        }
        self.lock().nodes.insert(path, Node::File(contents.to_vec()));
    }

    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        match self.lock().nodes.get(&normalize(path)) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        let path = normalize(path);
        path == "/" || matches!(self.lock().nodes.get(&path), Some(Node::Dir))
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.lock().nodes.keys().cloned().collect()
    }

    /// Make deletes of `path` fail with `PermissionDenied`.
    pub fn protect(&self, path: &str) {
        self.lock().protected.insert(normalize(path));
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parent_of(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) => None,
        Some(i) => Some(&path[..i]),
        None => None,
    }
}

fn not_found(op: RemoteOp, path: &str) -> RemoteError {
    remote_io_err(op, path, io::Error::new(ErrorKind::NotFound, "no such file"))
}

impl State {
    fn is_dir(&self, path: &str) -> bool {
        path == "/" || matches!(self.nodes.get(path), Some(Node::Dir))
    }

    fn parent_exists(&self, path: &str) -> bool {
        match parent_of(path) {
            None => true,
            Some(parent) => self.is_dir(parent),
        }
    }

    fn children(&self, dir: &str) -> Vec<(String, EntryKind)> {
        self.nodes
            .iter()
            .filter(|(path, _)| path.as_str() != dir && parent_of(path) == Some(dir))
            .map(|(path, node)| {
                let name = path.rsplit('/').next().unwrap_or(path).to_string();
                let kind = match node {
                    Node::Dir => EntryKind::Dir,
                    Node::File(_) => EntryKind::File,
                };
                (name, kind)
            })
            .collect()
    }
}

impl RemoteFs for MemoryFs {
    fn stat(&self, path: &str) -> Result<RemoteStat, RemoteError> {
        let state = self.lock();
        if path == "/" {
            return Ok(RemoteStat { kind: EntryKind::Dir, size: 0 });
        }
        match state.nodes.get(path) {
            Some(Node::Dir) => Ok(RemoteStat { kind: EntryKind::Dir, size: 0 }),
            Some(Node::File(bytes)) => Ok(RemoteStat {
                kind: EntryKind::File,
                size: bytes.len() as u64,
            }),
            None => Err(not_found(RemoteOp::Stat, path)),
        }
    }

    fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        let state = self.lock();
        if !state.is_dir(path) {
            return Err(not_found(RemoteOp::ReadDir, path));
        }
        Ok(state
            .children(path)
            .into_iter()
            .map(|(name, kind)| RemoteEntry { name, kind })
            .collect())
    }

    fn mkdir(&self, path: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        if path == "/" || state.nodes.contains_key(path) {
            return Err(remote_io_err(
                RemoteOp::Mkdir,
                path,
                io::Error::new(ErrorKind::AlreadyExists, "already exists"),
            ));
        }
        if !state.parent_exists(path) {
            return Err(not_found(RemoteOp::Mkdir, path));
        }
        state.nodes.insert(path.to_string(), Node::Dir);
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        if state.protected.contains(path) {
            return Err(remote_io_err(
                RemoteOp::RemoveFile,
                path,
                io::Error::new(ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        match state.nodes.get(path) {
            Some(Node::File(_)) => {
                state.nodes.remove(path);
                Ok(())
            }
            _ => Err(not_found(RemoteOp::RemoveFile, path)),
        }
    }

    fn remove_dir(&self, path: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        if state.protected.contains(path) {
            return Err(remote_io_err(
                RemoteOp::RemoveDir,
                path,
                io::Error::new(ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        if !matches!(state.nodes.get(path), Some(Node::Dir)) {
            return Err(not_found(RemoteOp::RemoveDir, path));
        }
        if !state.children(path).is_empty() {
            return Err(remote_io_err(
                RemoteOp::RemoveDir,
                path,
                io::Error::other("directory not empty"),
            ));
        }
        state.nodes.remove(path);
        Ok(())
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let bytes = std::fs::read(local).map_err(|e| local_err(local, e))?;
        let mut state = self.lock();
        if !state.parent_exists(remote) || state.is_dir(remote) {
            return Err(not_found(RemoteOp::Upload, remote));
        }
        state.nodes.insert(remote.to_string(), Node::File(bytes));
        Ok(())
    }

    fn download(&self, remote: &str, local: &Path) -> Result<(), RemoteError> {
        let bytes = match self.lock().nodes.get(remote) {
            Some(Node::File(bytes)) => bytes.clone(),
            _ => return Err(not_found(RemoteOp::Download, remote)),
        };
        std::fs::write(local, bytes).map_err(|e| local_err(local, e))
    }
}

impl Connect for MemoryFs {
    type Session = MemoryFs;

    fn connect(&self) -> Result<Self::Session, RemoteError> {
        if !self.reachable {
            return Err(RemoteError::Unreachable {
                addr: self.describe(),
                source: io::Error::new(ErrorKind::ConnectionRefused, "connection refused"),
            });
        }
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
