use std::time::Duration;

use dmxlink_frame::labels::label_name;

/// Errors that can occur in widget session operations.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] dmxlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] dmxlink_frame::FrameError),

    /// The protocol reserves this label but dmxlink does not implement it.
    /// Raised before any bytes reach the link.
    #[error("message label {} ({}) is not implemented", .0, label_name(*.0))]
    UnsupportedLabel(u8),

    /// Parameter readback after a set did not match what was requested.
    /// The in-memory parameters are left unchanged and the session is
    /// Unsynchronized; retry or reopen.
    #[error("parameter readback mismatch: {field} requested {requested}, device reports {actual}")]
    ParameterSync {
        field: &'static str,
        requested: u8,
        actual: u8,
    },

    /// A timing parameter lies outside the range the device accepts.
    #[error("{field} {value} out of range [{min}, {max}]")]
    ParameterOutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },

    /// Universe data length outside the protocol's 24..=512 slot window.
    #[error("universe size {0} out of range [24, 512]")]
    UniverseSize(usize),

    /// DMX channel number outside 1..=512.
    #[error("channel {0} out of range [1, 512]")]
    ChannelOutOfRange(u16),

    /// A configured reply deadline elapsed with no complete reply buffered.
    /// The link's turn-taking state is now unknown; drop the handle and
    /// reopen the port rather than retrying on it.
    #[error("no reply after {0:?}")]
    ReplyTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
