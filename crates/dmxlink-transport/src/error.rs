/// Errors that can occur on the serial transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the named serial port.
    ///
    /// The usual cause is another process (or another handle) already
    /// holding the port; the OS enforces exclusive ownership, not dmxlink.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// An I/O error occurred while reading or writing the port.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A port control operation (buffer query/discard) failed.
    #[error("serial control error: {0}")]
    Control(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
