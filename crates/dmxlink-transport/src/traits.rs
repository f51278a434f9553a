use crate::error::Result;

/// Byte-stream access to a widget serial link.
///
/// This is the fundamental I/O seam of dmxlink. The production
/// implementation is [`crate::SerialLink`]; tests substitute scripted
/// ports. The widget protocol is half-duplex request/reply, so the trait
/// exposes exactly what that discipline needs: blocking writes, blocking
/// exact-length reads, a bytes-available query for reply polling, and an
/// input discard for the pre-send flush.
pub trait WidgetPort: Send {
    /// Write the entire buffer to the link.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Read exactly `buf.len()` bytes from the link.
    ///
    /// Callers check [`WidgetPort::bytes_to_read`] first; this should only
    /// block on short hardware latencies, never on protocol waits.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Number of bytes currently buffered and readable without blocking.
    fn bytes_to_read(&mut self) -> Result<usize>;

    /// Discard any unread bytes buffered on the link.
    fn discard_input(&mut self) -> Result<()>;
}
