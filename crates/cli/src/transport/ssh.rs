// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread::sleep;
use std::time::Duration;

use ssh2::{Channel, Session};
use tracing::debug;

use crate::error::{BootError, OpenFail};
use crate::transport::{drain_all, drain_line, Transport};

const RETRY_BACKOFF: Duration = Duration::from_secs(2);

enum ConnectError {
    Auth,
    Other(String),
}

/// Console reached through a console server's SSH front end. The server
/// credentials here are distinct from the device credentials used by the
/// login state machine once the shell is up.
pub struct SshConsole {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: Duration,
    attempts: u32,
    session: Option<Session>,
    channel: Option<Channel>,
    pending: Vec<u8>,
}

impl SshConsole {
    pub fn new(
        host: String,
        port: u16,
        user: String,
        password: String,
        timeout: Duration,
        attempts: u32,
    ) -> Self {
        Self {
            host,
            port,
            user,
            password,
            timeout,
            attempts: attempts.max(1),
            session: None,
            channel: None,
            pending: Vec::new(),
        }
    }

    fn resolve(&self) -> Result<SocketAddr, BootError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                debug!(host = %self.host, port = self.port, error = %e, "ssh resolve failed");
                BootError::OpenFailed(OpenFail::PortNotReady)
            })?
            .next()
            .ok_or(BootError::OpenFailed(OpenFail::PortNotReady))
    }

    fn try_connect(&self, addr: &SocketAddr) -> Result<(Session, Channel), ConnectError> {
        let tcp = TcpStream::connect_timeout(addr, self.timeout.max(Duration::from_secs(5)))
            .map_err(|e| ConnectError::Other(e.to_string()))?;
        let mut session = Session::new().map_err(|e| ConnectError::Other(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| ConnectError::Other(e.to_string()))?;
        session
            .userauth_password(&self.user, &self.password)
            .map_err(|_| ConnectError::Auth)?;
        if !session.authenticated() {
            return Err(ConnectError::Auth);
        }
        let mut channel =
            session.channel_session().map_err(|e| ConnectError::Other(e.to_string()))?;
        channel
            .request_pty("vt100", None, None)
            .map_err(|e| ConnectError::Other(e.to_string()))?;
        channel.shell().map_err(|e| ConnectError::Other(e.to_string()))?;
        session.set_timeout(self.timeout.as_millis() as u32);
        Ok((session, channel))
    }

    fn channel(&mut self) -> Result<&mut Channel, BootError> {
        self.channel.as_mut().ok_or_else(|| {
            BootError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "ssh session is not open",
            ))
        })
    }
}

impl Transport for SshConsole {
    fn open(&mut self) -> Result<(), BootError> {
        let addr = self.resolve()?;
        let mut auth_rejected = false;
        for attempt in 1..=self.attempts {
            match self.try_connect(&addr) {
                Ok((session, channel)) => {
                    self.session = Some(session);
                    self.channel = Some(channel);
                    self.write("")?;
                    return Ok(());
                }
                Err(ConnectError::Auth) => {
                    debug!(host = %self.host, attempt, "ssh authentication rejected");
                    auth_rejected = true;
                }
                Err(ConnectError::Other(detail)) => {
                    debug!(host = %self.host, attempt, detail, "ssh connect failed");
                }
            }
            if attempt < self.attempts {
                sleep(RETRY_BACKOFF);
            }
        }
        if auth_rejected {
            Err(BootError::OpenFailed(OpenFail::AuthFailed))
        } else {
            Err(BootError::OpenFailed(OpenFail::PortNotReady))
        }
    }

    fn close(&mut self) -> Result<(), BootError> {
        if let Some(mut channel) = self.channel.take() {
            let _ = channel.close();
            let _ = channel.wait_close();
        }
        if let Some(session) = self.session.take() {
            let _ = session.disconnect(None, "closing console session", None);
        }
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, content: &str) -> Result<(), BootError> {
        let line = format!("{content}\n");
        self.rawwrite(&line)
    }

    fn rawwrite(&mut self, content: &str) -> Result<(), BootError> {
        let channel = self.channel()?;
        channel.write_all(content.as_bytes())?;
        channel.flush()?;
        Ok(())
    }

    fn readline(&mut self) -> Result<String, BootError> {
        let mut chunk = [0u8; 512];
        loop {
            if let Some(line) = drain_line(&mut self.pending) {
                return Ok(line);
            }
            match self.channel()?.read(&mut chunk) {
                Ok(0) => {
                    return Err(BootError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "ssh channel closed",
                    )))
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut
                            | std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    return Ok(drain_all(&mut self.pending));
                }
                Err(e) => return Err(BootError::Io(e)),
            }
        }
    }
}
