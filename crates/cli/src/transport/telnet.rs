// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telnet connection to a terminal server.
//!
//! All option negotiation is silently discarded on the read side. Some
//! option bytes are printable ASCII (AUTHENTICATION is 0x25, `%`) and if
//! they leaked through they would satisfy the shell prompt pattern.
//!
//! Writes are paced per byte at 10/baud seconds (start bit, eight data
//! bits, stop bit) when a baud rate is configured, so consoles with tiny
//! input buffers are not overrun by a full-speed TCP burst.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::thread::sleep;
use std::time::Duration;

use tracing::debug;

use crate::error::{BootError, OpenFail};
use crate::transport::{drain_all, drain_line, Transport};

const OPEN_ATTEMPTS: u32 = 3;
const OPEN_BACKOFF: Duration = Duration::from_secs(2);

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IacState {
    Data,
    Command,
    Option,
    Subneg,
    SubnegCommand,
}

/// Streaming filter that strips telnet command sequences from incoming
/// bytes. State survives across reads so sequences split over TCP segment
/// boundaries are still recognized.
#[derive(Debug)]
pub(crate) struct IacFilter {
    state: IacState,
}

impl IacFilter {
    pub(crate) fn new() -> Self {
        Self { state: IacState::Data }
    }

    pub(crate) fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &byte in input {
            self.state = match self.state {
                IacState::Data => {
                    if byte == IAC {
                        IacState::Command
                    } else {
                        out.push(byte);
                        IacState::Data
                    }
                }
                IacState::Command => match byte {
                    IAC => {
                        out.push(IAC);
                        IacState::Data
                    }
                    WILL | WONT | DO | DONT => IacState::Option,
                    SB => IacState::Subneg,
                    _ => IacState::Data,
                },
                IacState::Option => IacState::Data,
                IacState::Subneg => {
                    if byte == IAC {
                        IacState::SubnegCommand
                    } else {
                        IacState::Subneg
                    }
                }
                IacState::SubnegCommand => {
                    if byte == SE {
                        IacState::Data
                    } else {
                        IacState::Subneg
                    }
                }
            };
        }
    }
}

/// Console reached through a terminal server's telnet port.
pub struct TelnetConsole {
    host: String,
    port: u16,
    timeout: Duration,
    baud: u32,
    stream: Option<TcpStream>,
    filter: IacFilter,
    pending: Vec<u8>,
}

impl TelnetConsole {
    pub fn new(host: String, port: u16, timeout: Duration, baud: u32) -> Self {
        Self {
            host,
            port,
            timeout,
            baud,
            stream: None,
            filter: IacFilter::new(),
            pending: Vec::new(),
        }
    }

    fn resolve(&self) -> Result<SocketAddr, BootError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                debug!(host = %self.host, port = self.port, error = %e, "telnet resolve failed");
                BootError::OpenFailed(OpenFail::PortNotReady)
            })?
            .next()
            .ok_or(BootError::OpenFailed(OpenFail::PortNotReady))
    }

    fn stream(&mut self) -> Result<&mut TcpStream, BootError> {
        self.stream.as_mut().ok_or_else(|| {
            BootError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "telnet session is not open",
            ))
        })
    }

    fn pace(&self) -> Option<Duration> {
        if self.baud == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(10.0 / f64::from(self.baud)))
        }
    }
}

impl Transport for TelnetConsole {
    fn open(&mut self) -> Result<(), BootError> {
        let addr = self.resolve()?;
        let connect_timeout = self.timeout.max(Duration::from_secs(1));
        for attempt in 1..=OPEN_ATTEMPTS {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_nodelay(true)?;
                    self.stream = Some(stream);
                    // Poke the port so the far end produces a prompt.
                    self.write("")?;
                    return Ok(());
                }
                Err(e) => {
                    debug!(%addr, attempt, error = %e, "telnet connect failed");
                    if attempt < OPEN_ATTEMPTS {
                        sleep(OPEN_BACKOFF);
                    }
                }
            }
        }
        Err(BootError::OpenFailed(OpenFail::PortNotReady))
    }

    fn close(&mut self) -> Result<(), BootError> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, content: &str) -> Result<(), BootError> {
        let line = format!("{content}\n");
        self.rawwrite(&line)
    }

    fn rawwrite(&mut self, content: &str) -> Result<(), BootError> {
        let pace = self.pace();
        let stream = self.stream()?;
        match pace {
            Some(delay) => {
                for byte in content.as_bytes() {
                    stream.write_all(std::slice::from_ref(byte))?;
                    sleep(delay);
                }
            }
            None => stream.write_all(content.as_bytes())?,
        }
        stream.flush()?;
        Ok(())
    }

    fn readline(&mut self) -> Result<String, BootError> {
        let mut chunk = [0u8; 512];
        loop {
            if let Some(line) = drain_line(&mut self.pending) {
                return Ok(line);
            }
            match self.stream()?.read(&mut chunk) {
                Ok(0) => {
                    return Err(BootError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "telnet peer closed the connection",
                    )))
                }
                Ok(n) => {
                    let received = chunk[..n].to_vec();
                    self.filter.feed(&received, &mut self.pending);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                    ) =>
                {
                    return Ok(drain_all(&mut self.pending));
                }
                Err(e) => return Err(BootError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
#[path = "telnet_tests.rs"]
mod tests;
