#![no_main]

use libfuzzer_sys::fuzz_target;
use trtp_codec::Packet;

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic; anything that decodes must re-encode
    if let Ok(pkt) = Packet::decode(data) {
        if pkt.payload().is_some() || pkt.length() == 0 {
            assert!(pkt.encode().is_ok());
        }
    }
});
