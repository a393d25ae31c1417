// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{Read, Write};
use std::time::Duration;

use tracing::debug;

use crate::error::{BootError, OpenFail};
use crate::transport::{drain_all, drain_line, Transport};

/// Console attached through a local serial device (`/dev/ttyUSB0` and
/// friends). Construction only records the settings; the port is opened by
/// [`Transport::open`] when the session starts.
pub struct SerialConsole {
    device: String,
    baud: u32,
    timeout: Duration,
    port: Option<Box<dyn serialport::SerialPort>>,
    pending: Vec<u8>,
}

impl SerialConsole {
    pub fn new(device: String, baud: u32, timeout: Duration) -> Self {
        Self { device, baud, timeout, port: None, pending: Vec::new() }
    }

    fn port(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>, BootError> {
        self.port.as_mut().ok_or_else(not_open)
    }
}

fn not_open() -> BootError {
    BootError::Io(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "serial port is not open",
    ))
}

impl Transport for SerialConsole {
    fn open(&mut self) -> Result<(), BootError> {
        let port = serialport::new(self.device.as_str(), self.baud)
            .timeout(self.timeout)
            .open()
            .map_err(|e| {
                debug!(device = %self.device, error = %e, "serial open failed");
                BootError::OpenFailed(OpenFail::PortNotReady)
            })?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BootError> {
        if let Some(mut port) = self.port.take() {
            let _ = port.flush();
        }
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, content: &str) -> Result<(), BootError> {
        let line = format!("{content}\n");
        self.rawwrite(&line)
    }

    fn rawwrite(&mut self, content: &str) -> Result<(), BootError> {
        let port = self.port()?;
        port.write_all(content.as_bytes())?;
        port.flush()?;
        Ok(())
    }

    fn readline(&mut self) -> Result<String, BootError> {
        let mut chunk = [0u8; 256];
        loop {
            if let Some(line) = drain_line(&mut self.pending) {
                return Ok(line);
            }
            match self.port()?.read(&mut chunk) {
                Ok(0) => {
                    return Err(BootError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "serial port closed",
                    )))
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
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
