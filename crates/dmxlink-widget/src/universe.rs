//! Sparse channel assignments to dense universe data.

use crate::error::{Result, WidgetError};

/// Number of addressable slots in a DMX512 universe.
pub const UNIVERSE_SIZE: usize = 512;

/// Smallest universe the output operation will transmit.
pub const MIN_SLOTS: usize = 24;

/// Largest universe the output operation will transmit.
pub const MAX_SLOTS: usize = 512;

/// Start code for standard intensity data.
pub const DEFAULT_START_CODE: u8 = 0;

/// Build a full universe from sparse (channel, value) assignments.
///
/// Channels are 1-based per DMX addressing convention. Every slot not
/// named in `assignments` is zero; there is no merging with prior state.
/// Values are `u8`, so the 0..=255 bound holds by construction.
pub fn build_universe(assignments: &[(u16, u8)]) -> Result<[u8; UNIVERSE_SIZE]> {
    let mut slots = [0u8; UNIVERSE_SIZE];
    for &(channel, value) in assignments {
        if channel < 1 || channel > UNIVERSE_SIZE as u16 {
            return Err(WidgetError::ChannelOutOfRange(channel));
        }
        slots[usize::from(channel) - 1] = value;
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_assignment_zero_fills_the_rest() {
        let slots = build_universe(&[(3, 200)]).unwrap();

        assert_eq!(slots.len(), UNIVERSE_SIZE);
        assert_eq!(slots[2], 200);
        let lit = slots.iter().filter(|&&v| v != 0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn boundary_channels() {
        let slots = build_universe(&[(1, 10), (512, 20)]).unwrap();
        assert_eq!(slots[0], 10);
        assert_eq!(slots[511], 20);
    }

    #[test]
    fn later_assignment_wins_for_same_channel() {
        let slots = build_universe(&[(7, 50), (7, 60)]).unwrap();
        assert_eq!(slots[6], 60);
    }

    #[test]
    fn channel_zero_rejected() {
        let err = build_universe(&[(0, 1)]).unwrap_err();
        assert!(matches!(err, WidgetError::ChannelOutOfRange(0)));
    }

    #[test]
    fn channel_past_universe_rejected() {
        let err = build_universe(&[(513, 1)]).unwrap_err();
        assert!(matches!(err, WidgetError::ChannelOutOfRange(513)));
    }

    #[test]
    fn empty_assignments_yield_blackout() {
        let slots = build_universe(&[]).unwrap();
        assert!(slots.iter().all(|&v| v == 0));
    }
}
