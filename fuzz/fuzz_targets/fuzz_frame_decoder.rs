//! Fuzz target: `SafetyFrame::decode`
//!
//! Drives arbitrary payloads through the safety-frame decoder and asserts
//! that it never panics, that anything it accepts re-encodes to the exact
//! input bytes, and that foreign identifiers are always rejected.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use safety_node::protocol::{CAN_ID_SAFETY, FrameError, MAX_PAYLOAD, SafetyFrame};

fuzz_target!(|data: &[u8]| {
    if let Ok(frame) = SafetyFrame::decode(CAN_ID_SAFETY, data) {
        let encoded = frame.encode();
        assert!(encoded.len() <= MAX_PAYLOAD);
        assert_eq!(encoded.as_slice(), data, "decode/encode disagree");
    }

    // The first byte doubles as a foreign identifier.
    if let Some(&b) = data.first() {
        let id = u32::from(b) | 0x100;
        assert_eq!(
            SafetyFrame::decode(id, data),
            Err(FrameError::WrongId(id))
        );
    }
});
