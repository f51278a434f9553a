use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort, SerialPortInfo};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::WidgetPort;

/// Baud rate presented to the OS driver.
///
/// The widget is a USB CDC device; the DMX line timing is generated by its
/// own hardware, so this value only has to match what the vendor driver
/// expects.
pub const BAUD_RATE: u32 = 57_600;

/// Hardware-level read timeout.
///
/// Reads are always preceded by a bytes-available check, so this is a
/// backstop against a wedged driver, not a protocol wait.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// A serial connection to a widget.
///
/// Owns the underlying port exclusively from [`SerialLink::open`] until
/// drop. At most one `SerialLink` can exist per physical port at a time;
/// the OS enforces that, and `open` surfaces the conflict as
/// [`TransportError::Open`].
pub struct SerialLink {
    inner: Box<dyn SerialPort>,
    port_name: String,
}

impl SerialLink {
    /// Open the named serial port (blocking).
    pub fn open(port_name: &str) -> Result<Self> {
        let inner = serialport::new(port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                port: port_name.to_string(),
                source,
            })?;

        info!(port = %port_name, baud = BAUD_RATE, "opened widget serial link");

        Ok(Self {
            inner,
            port_name: port_name.to_string(),
        })
    }

    /// The name this port was opened with.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl WidgetPort for SerialLink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf)?;
        self.inner.flush()?;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(self.inner.bytes_to_read()? as usize)
    }

    fn discard_input(&mut self) -> Result<()> {
        self.inner.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        debug!(port = %self.port_name, "closing widget serial link");
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("port", &self.port_name)
            .finish()
    }
}

/// Enumerate serial ports visible to the host.
pub fn enumerate() -> Result<Vec<SerialPortInfo>> {
    Ok(serialport::available_ports()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_port_fails_with_open_error() {
        let result = SerialLink::open("/dev/nonexistent-widget-port");
        match result {
            Err(TransportError::Open { port, .. }) => {
                assert_eq!(port, "/dev/nonexistent-widget-port");
            }
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn enumerate_does_not_fail() {
        // The host may have zero ports; the call itself must still succeed.
        let ports = enumerate().unwrap();
        for info in ports {
            assert!(!info.port_name.is_empty());
        }
    }
}
