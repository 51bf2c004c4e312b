//! Transfers through an installed `pscp` or `scp` binary.
//!
//! Neither tool can replace a directory in place, so a push first empties the
//! remote directory over SFTP and a pull goes through a staging directory.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use savesync_core::{Game, RemoteConfig};
use savesync_remote::remote_path::{last_segment, normalize};
use savesync_remote::{tree, Connect};

use crate::error::{io_err, SyncError, ToolError};
use crate::local_fs;
use crate::transport::{TransferOutcome, Transport, TransportKind};

const STAGING_PREFIX: &str = "savesync_download_";

// ---------------------------------------------------------------------------
// Tool discovery
// ---------------------------------------------------------------------------

/// Copy tools found on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScpTools {
    pub pscp: Option<PathBuf>,
    pub scp: Option<PathBuf>,
}

impl ScpTools {
    pub fn detect() -> Self {
        let tools = Self {
            pscp: which::which("pscp").ok(),
            scp: which::which("scp").ok(),
        };
        tracing::debug!("copy tools: pscp={:?} scp={:?}", tools.pscp, tools.scp);
        tools
    }

    pub fn any(&self) -> bool {
        self.pscp.is_some() || self.scp.is_some()
    }

    /// `pscp` when present, since it takes the password on the command line.
    pub fn preferred(&self) -> Result<ScpTool, ToolError> {
        if let Some(path) = &self.pscp {
            return Ok(ScpTool::Pscp(path.clone()));
        }
        if let Some(path) = &self.scp {
            return Ok(ScpTool::Scp(path.clone()));
        }
        Err(ToolError::NotFound)
    }
}

/// The binary a transfer will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScpTool {
    /// PuTTY `pscp`; accepts `-pw`.
    Pscp(PathBuf),
    /// OpenSSH `scp`; needs key-based auth to run unattended.
    Scp(PathBuf),
}

impl ScpTool {
    pub fn program(&self) -> &Path {
        match self {
            ScpTool::Pscp(p) | ScpTool::Scp(p) => p,
        }
    }

    pub fn accepts_password(&self) -> bool {
        matches!(self, ScpTool::Pscp(_))
    }

    /// Flags shared by every invocation: password (pscp only), port, recursion.
    fn base_args(&self, remote: &RemoteConfig) -> Vec<OsString> {
        let mut args = Vec::new();
        if self.accepts_password() && !remote.password.is_empty() {
            args.push("-pw".into());
            args.push(remote.password.clone().into());
        }
        args.push("-P".into());
        args.push(remote.effective_port().to_string().into());
        args.push("-r".into());
        args
    }
}

// ---------------------------------------------------------------------------
// Process invocation
// ---------------------------------------------------------------------------

/// Run `program` to completion with inherited stdio.
///
/// Exit status 0 is success; anything else is [`ToolError::Exit`] carrying
/// the code. The logged command line never shows the value after `-pw`.
pub fn run_tool(program: &Path, args: &[OsString]) -> Result<(), ToolError> {
    tracing::info!("running: {}", masked_command_line(program, args));
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| ToolError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(ToolError::Exit {
            program: program.to_path_buf(),
            code: status.code(),
        })
    }
}

fn masked_command_line(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    let mut hide_next = false;
    for arg in args {
        line.push(' ');
        if hide_next {
            line.push_str("***");
            hide_next = false;
        } else {
            line.push_str(&arg.to_string_lossy());
            hide_next = arg.as_os_str() == OsStr::new("-pw");
        }
    }
    line
}

/// `user@host:dir`, quoting `dir` for the remote shell when it has spaces.
fn remote_spec(remote: &RemoteConfig, dir: &str) -> String {
    if dir.chars().any(char::is_whitespace) {
        format!("{}@{}:\"{dir}\"", remote.user, remote.host)
    } else {
        format!("{}@{}:{dir}", remote.user, remote.host)
    }
}

/// Where the downloaded tree actually starts inside `staging`.
///
/// Copy tools usually nest the source directory under the destination, so a
/// child named after the last segment of `remote_dir` (or `fallback_name`
/// when the path has none) is taken as the payload. Otherwise the staging
/// directory itself is. This is a best-effort guess about tool behavior.
pub fn payload_root(staging: &Path, remote_dir: &str, fallback_name: &str) -> PathBuf {
    let name = last_segment(remote_dir).unwrap_or_else(|| fallback_name.to_string());
    let nested = staging.join(name);
    if nested.is_dir() {
        nested
    } else {
        staging.to_path_buf()
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Subprocess transport. Clearing the remote side before a push still goes
/// through `connector`.
pub struct ExternalTransport<'a, C: Connect> {
    connector: &'a C,
    remote: &'a RemoteConfig,
    tool: ScpTool,
}

impl<'a, C: Connect> ExternalTransport<'a, C> {
    /// Fails with [`ToolError::NotFound`] when neither tool is installed.
    pub fn new(connector: &'a C, remote: &'a RemoteConfig, tools: &ScpTools) -> Result<Self, ToolError> {
        let tool = tools.preferred()?;
        if !tool.accepts_password() {
            tracing::warn!(
                "using {} which cannot take a password; it will stall or fail unless key-based login is configured (install pscp to avoid this)",
                tool.program().display()
            );
        }
        Ok(Self {
            connector,
            remote,
            tool,
        })
    }

    pub fn tool(&self) -> &ScpTool {
        &self.tool
    }

    fn tool_note(&self) -> Option<String> {
        (!self.tool.accepts_password()).then(|| {
            format!(
                "{} was used without a password; key-based login was required",
                self.tool.program().display()
            )
        })
    }
}

impl<C: Connect> Transport for ExternalTransport<'_, C> {
    fn kind(&self) -> TransportKind {
        TransportKind::External
    }

    fn push(&self, game: &Game, remote_dir: &str) -> Result<TransferOutcome, SyncError> {
        let sources = local_fs::list_children(&game.local_path)?;
        let target = {
            let session = self.connector.connect()?;
            tracing::info!("clearing remote directory {remote_dir} over sftp");
            tree::ensure_empty(&session, remote_dir)?
        };
        let mut notes: Vec<String> = self.tool_note().into_iter().collect();

        if sources.is_empty() {
            let note = format!(
                "{} is empty; remote directory was cleared and nothing was copied",
                game.local_path.display()
            );
            tracing::warn!("{note}");
            notes.push(note);
            return Ok(TransferOutcome {
                resolved_remote: target,
                notes,
            });
        }

        let mut args = self.tool.base_args(self.remote);
        args.extend(sources.into_iter().map(PathBuf::into_os_string));
        args.push(remote_spec(self.remote, &format!("{target}/")).into());
        run_tool(self.tool.program(), &args)?;

        Ok(TransferOutcome {
            resolved_remote: target,
            notes,
        })
    }

    fn pull(&self, game: &Game, remote_dir: &str) -> Result<TransferOutcome, SyncError> {
        let source = normalize(remote_dir);
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;
        tracing::debug!("staging download in {}", staging.path().display());

        let mut args = self.tool.base_args(self.remote);
        args.push(remote_spec(self.remote, &source).into());
        args.push(staging.path().as_os_str().to_os_string());
        run_tool(self.tool.program(), &args)?;

        let payload = payload_root(staging.path(), &source, &game.name.0);
        tracing::debug!("payload root: {}", payload.display());
        local_fs::reset_dir(&game.local_path)?;
        let copied = local_fs::copy_tree(&payload, &game.local_path)?;
        tracing::info!("copied {copied} file(s) into {}", game.local_path.display());

        if let Err(e) = staging.close() {
            tracing::warn!("could not remove staging directory: {e}");
        }
        Ok(TransferOutcome {
            resolved_remote: source,
            notes: self.tool_note().into_iter().collect(),
        })
    }
}
