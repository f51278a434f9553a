/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the protocol maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A length does not fit in the 16-bit wire field.
    #[error("length {value} out of range (max {max})")]
    ValueOutOfRange { value: usize, max: usize },

    /// A reply's total length is not what the exchange expected.
    #[error("frame length mismatch (expected {expected} bytes, got {actual})")]
    LengthMismatch { expected: usize, actual: usize },

    /// A reply echoed a different label than the request.
    #[error("unexpected message label (expected {expected}, got {actual})")]
    UnexpectedLabel { expected: u8, actual: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
