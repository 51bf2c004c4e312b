//! # savesync-sync
//!
//! Backups, transfer strategies, and the sync pipeline.
//!
//! Call [`pipeline::run`] with a [`Game`](savesync_core::Game), a
//! [`Direction`](savesync_core::Direction) and a connector. Everything else in
//! this crate is reachable for callers that need a single step.

pub mod backup;
pub mod error;
pub mod local_fs;
pub mod pipeline;
pub mod transport;

pub use backup::BackupSnapshot;
pub use error::{SyncError, ToolError};
pub use pipeline::{run, Stage, SyncEnv, SyncReport};
pub use transport::external::{ScpTool, ScpTools};
pub use transport::{TransferOutcome, Transport, TransportKind};
