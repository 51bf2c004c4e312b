//! Existence probing across path candidates.

use crate::error::RemoteError;
use crate::fs::RemoteFs;
use crate::remote_path::candidates;

/// Result of [`exists`].
///
/// `last_error` is the failure from the final candidate tried when nothing
/// resolved. It is diagnostic only; a missing path is not an error.
#[derive(Debug)]
pub struct Probe {
    pub found: bool,
    pub resolved: String,
    pub last_error: Option<RemoteError>,
}

/// Stat each candidate of `remote_path` in order; the first that answers wins.
///
/// When none resolves, `resolved` is `remote_path` unchanged.
pub fn exists<F: RemoteFs + ?Sized>(fs: &F, remote_path: &str) -> Probe {
    let mut last_error = None;
    for candidate in candidates(remote_path) {
        match fs.stat(&candidate) {
            Ok(_) => {
                tracing::debug!("probe: {remote_path} resolved to {candidate}");
                return Probe {
                    found: true,
                    resolved: candidate,
                    last_error: None,
                };
            }
            Err(e) => {
                tracing::debug!("probe: {candidate} not found: {e}");
                last_error = Some(e);
            }
        }
    }
    Probe {
        found: false,
        resolved: remote_path.to_string(),
        last_error,
    }
}
