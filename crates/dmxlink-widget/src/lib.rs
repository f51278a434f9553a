//! Device session management for DMX USB widgets.
//!
//! This is the "just works" layer: open a [`DmxWidget`] on a serial port,
//! synchronize timing parameters with set-then-verify, stream universes,
//! stop cleanly. Built on the strict request/reply turn-taking the widget
//! protocol demands: one outstanding request per link, replies matched to
//! requests by order alone.

pub mod error;
pub mod exchange;
pub mod params;
pub mod universe;
pub mod widget;

pub use error::{Result, WidgetError};
pub use exchange::{Exchange, ExchangeConfig};
pub use params::{
    SyncState, WidgetIdentity, WidgetParameters, BREAK_TIME_MAX, BREAK_TIME_MIN,
    MARK_AFTER_BREAK_MAX, MARK_AFTER_BREAK_MIN, OUTPUT_RATE_MAX, OUTPUT_RATE_MIN, USER_CONFIG_LEN,
};
pub use universe::{build_universe, DEFAULT_START_CODE, MAX_SLOTS, MIN_SLOTS, UNIVERSE_SIZE};
pub use widget::DmxWidget;
