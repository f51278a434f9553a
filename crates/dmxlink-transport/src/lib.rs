//! Serial transport abstraction for DMX USB widgets.
//!
//! Provides the byte-stream primitive everything else builds on: open a
//! named serial endpoint, write bytes, read bytes, query how many bytes are
//! buffered, discard stale input. The [`WidgetPort`] trait is the seam the
//! session layer is written against; [`SerialLink`] is the production
//! implementation over the `serialport` crate.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{enumerate, SerialLink, BAUD_RATE};
pub use serialport::{SerialPortInfo, SerialPortType};
pub use traits::WidgetPort;
