//! # savesync-remote
//!
//! Remote side of save mirroring: a small filesystem capability
//! ([`RemoteFs`]), an `ssh2`-backed SFTP implementation, an in-memory one,
//! and the path and tree operations built on top of them.
//!
//! - [`remote_path`]: normalization and candidate generation
//! - [`probe`]: existence checks across candidates
//! - [`tree`]: `mkdir -p`, recursive empty, upload/download of whole trees

pub mod error;
pub mod fs;
pub mod memory;
pub mod probe;
pub mod remote_path;
pub mod sftp;
pub mod tree;

pub use error::{RemoteError, RemoteOp};
pub use fs::{Connect, EntryKind, RemoteEntry, RemoteFs, RemoteStat};
pub use memory::MemoryFs;
pub use probe::Probe;
pub use sftp::{SftpSession, SshConnector, CONNECT_TIMEOUT};
