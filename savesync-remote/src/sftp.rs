//! SFTP sessions over `ssh2`.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use ssh2::{FileStat, Session, Sftp};

use savesync_core::RemoteConfig;

use crate::error::{local_err, remote_io_err, sftp_err, RemoteError, RemoteOp};
use crate::fs::{Connect, EntryKind, RemoteEntry, RemoteFs, RemoteStat};

/// Bound on TCP connect and on every blocking SSH call.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const DIR_MODE: i32 = 0o755;

/// Opens password-authenticated SFTP sessions for a [`RemoteConfig`].
#[derive(Debug, Clone)]
pub struct SshConnector {
    remote: RemoteConfig,
    timeout: Duration,
}

impl SshConnector {
    pub fn new(remote: RemoteConfig) -> Self {
        Self {
            remote,
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.remote.host, self.remote.effective_port())
    }

    fn open_tcp(&self) -> Result<TcpStream, RemoteError> {
        let addr = self.addr();
        let unreachable = |source| RemoteError::Unreachable {
            addr: addr.clone(),
            source,
        };
        let resolved = (self.remote.host.as_str(), self.remote.effective_port())
            .to_socket_addrs()
            .map_err(unreachable)?;

        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses");
        for sock in resolved {
            match TcpStream::connect_timeout(&sock, self.timeout) {
                Ok(tcp) => return Ok(tcp),
                Err(e) => {
                    tracing::debug!("connect to {sock} failed: {e}");
                    last_err = e;
                }
            }
        }
        Err(unreachable(last_err))
    }

    fn authenticate(&self, session: &Session) -> Result<(), RemoteError> {
        let user = self.remote.user.as_str();
        let mut last_err = None;

        if self.remote.password.is_empty() {
            match session.userauth_agent(user) {
                Ok(()) if session.authenticated() => return Ok(()),
                Ok(()) => {}
                Err(e) => last_err = Some(e),
            }
        } else {
            match session.userauth_password(user, &self.remote.password) {
                Ok(()) if session.authenticated() => return Ok(()),
                Ok(()) => {}
                Err(e) => last_err = Some(e),
            }

            // Some servers only offer keyboard-interactive for passwords.
            let mut prompt = PasswordPrompt {
                password: self.remote.password.clone(),
            };
            match session.userauth_keyboard_interactive(user, &mut prompt) {
                Ok(()) if session.authenticated() => return Ok(()),
                Ok(()) => {}
                Err(e) => last_err = Some(e),
            }
        }

        Err(RemoteError::Auth {
            user: user.to_string(),
            source: last_err,
        })
    }
}

struct PasswordPrompt {
    password: String,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt {
    fn prompt(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.clone()).collect()
    }
}

impl Connect for SshConnector {
    type Session = SftpSession;

    fn connect(&self) -> Result<SftpSession, RemoteError> {
        let addr = self.addr();
        tracing::info!("connecting to {}", self.describe());
        let tcp = self.open_tcp()?;

        let handshake = |source| RemoteError::Handshake {
            addr: addr.clone(),
            source,
        };
        let mut session = Session::new().map_err(handshake)?;
        session.set_tcp_stream(tcp);
        session.set_timeout(self.timeout.as_millis().min(u32::MAX as u128) as u32);
        session.handshake().map_err(handshake)?;

        self.authenticate(&session)?;

        let sftp = session.sftp().map_err(handshake)?;
        tracing::debug!("SFTP channel open to {addr}");
        Ok(SftpSession { session, sftp })
    }

    fn describe(&self) -> String {
        self.remote.describe()
    }
}

/// An authenticated SFTP channel. Disconnects when dropped.
pub struct SftpSession {
    session: Session,
    sftp: Sftp,
}

impl Drop for SftpSession {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "savesync done", None) {
            tracing::debug!("SSH disconnect: {e}");
        }
    }
}

fn kind_of(stat: &FileStat) -> EntryKind {
    if stat.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::File
    }
}

impl RemoteFs for SftpSession {
    fn stat(&self, path: &str) -> Result<RemoteStat, RemoteError> {
        let stat = self
            .sftp
            .stat(Path::new(path))
            .map_err(|e| sftp_err(RemoteOp::Stat, path, e))?;
        Ok(RemoteStat {
            kind: kind_of(&stat),
            size: stat.size.unwrap_or(0),
        })
    }

    fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        let raw = self
            .sftp
            .readdir(Path::new(path))
            .map_err(|e| sftp_err(RemoteOp::ReadDir, path, e))?;
        Ok(raw
            .into_iter()
            .filter_map(|(entry_path, stat)| {
                let name = entry_path.file_name()?.to_string_lossy().into_owned();
                if name == "." || name == ".." {
                    return None;
                }
                Some(RemoteEntry {
                    name,
                    kind: kind_of(&stat),
                })
            })
            .collect())
    }

    fn mkdir(&self, path: &str) -> Result<(), RemoteError> {
        self.sftp
            .mkdir(Path::new(path), DIR_MODE)
            .map_err(|e| sftp_err(RemoteOp::Mkdir, path, e))
    }

    fn remove_file(&self, path: &str) -> Result<(), RemoteError> {
        self.sftp
            .unlink(Path::new(path))
            .map_err(|e| sftp_err(RemoteOp::RemoveFile, path, e))
    }

    fn remove_dir(&self, path: &str) -> Result<(), RemoteError> {
        self.sftp
            .rmdir(Path::new(path))
            .map_err(|e| sftp_err(RemoteOp::RemoveDir, path, e))
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let mut src = std::fs::File::open(local).map_err(|e| local_err(local, e))?;
        let mut dst = self
            .sftp
            .create(Path::new(remote))
            .map_err(|e| sftp_err(RemoteOp::Upload, remote, e))?;
        io::copy(&mut src, &mut dst).map_err(|e| remote_io_err(RemoteOp::Upload, remote, e))?;
        Ok(())
    }

    fn download(&self, remote: &str, local: &Path) -> Result<(), RemoteError> {
        let mut src = self
            .sftp
            .open(Path::new(remote))
            .map_err(|e| sftp_err(RemoteOp::Download, remote, e))?;
        let mut dst = std::fs::File::create(local).map_err(|e| local_err(local, e))?;
        io::copy(&mut src, &mut dst).map_err(|e| remote_io_err(RemoteOp::Download, remote, e))?;
        Ok(())
    }
}
