//! Message labels defined by the widget protocol.
//!
//! The protocol reserves labels for firmware reprogramming, RDM, and
//! received-DMX reporting; dmxlink recognizes them but does not implement
//! them. [`is_supported`] is the gate the exchange applies before any I/O.

/// Enter the widget's firmware bootloader. Unimplemented.
pub const REPROGRAM_FIRMWARE: u8 = 1;

/// Program one flash page of widget firmware. Unimplemented.
pub const PROGRAM_FLASH_PAGE: u8 = 2;

/// Query break/mark-after-break/rate and the user configuration blob.
pub const GET_PARAMETERS: u8 = 3;

/// Set break/mark-after-break/rate and the user configuration blob.
pub const SET_PARAMETERS: u8 = 4;

/// Widget-to-host report of a received DMX packet. Unimplemented.
pub const RECEIVED_DMX_PACKET: u8 = 5;

/// Output-only DMX send. The protocol's one write-without-read operation.
pub const OUTPUT_ONLY_DMX: u8 = 6;

/// RDM packet transmission. Unimplemented.
pub const RDM_PACKET: u8 = 7;

/// Receive DMX on change mode. Unimplemented.
pub const RECEIVE_DMX_ON_CHANGE: u8 = 8;

/// Changed-slot report for receive-on-change mode. Unimplemented.
pub const RECEIVE_DMX_CHANGE_OF_STATE: u8 = 9;

/// Query the widget's 32-bit serial number.
pub const GET_SERIAL: u8 = 10;

/// RDM discovery request. Unimplemented.
pub const SEND_RDM_DISCOVERY: u8 = 11;

/// Returns a human-readable name for a label.
pub fn label_name(label: u8) -> &'static str {
    match label {
        REPROGRAM_FIRMWARE => "REPROGRAM_FIRMWARE",
        PROGRAM_FLASH_PAGE => "PROGRAM_FLASH_PAGE",
        GET_PARAMETERS => "GET_PARAMETERS",
        SET_PARAMETERS => "SET_PARAMETERS",
        RECEIVED_DMX_PACKET => "RECEIVED_DMX_PACKET",
        OUTPUT_ONLY_DMX => "OUTPUT_ONLY_DMX",
        RDM_PACKET => "RDM_PACKET",
        RECEIVE_DMX_ON_CHANGE => "RECEIVE_DMX_ON_CHANGE",
        RECEIVE_DMX_CHANGE_OF_STATE => "RECEIVE_DMX_CHANGE_OF_STATE",
        GET_SERIAL => "GET_SERIAL",
        SEND_RDM_DISCOVERY => "SEND_RDM_DISCOVERY",
        _ => "UNKNOWN",
    }
}

/// Returns true if dmxlink implements the label.
pub fn is_supported(label: u8) -> bool {
    matches!(
        label,
        GET_PARAMETERS | SET_PARAMETERS | OUTPUT_ONLY_DMX | GET_SERIAL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_set_is_exactly_the_implemented_labels() {
        let supported: Vec<u8> = (0..=12).filter(|&l| is_supported(l)).collect();
        assert_eq!(
            supported,
            vec![GET_PARAMETERS, SET_PARAMETERS, OUTPUT_ONLY_DMX, GET_SERIAL]
        );
    }

    #[test]
    fn every_protocol_label_has_a_name() {
        for label in 1..=11 {
            assert_ne!(label_name(label), "UNKNOWN");
        }
        assert_eq!(label_name(0), "UNKNOWN");
        assert_eq!(label_name(12), "UNKNOWN");
    }
}
