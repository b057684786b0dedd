#![no_main]

use aoe4_overlay::api::{PlayerMatch, RatingPoint};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stats service responses are untrusted; parsing must never panic
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(player_match) = serde_json::from_str::<PlayerMatch>(s) {
            let _ = player_match.last_match.teams();
        }
        let _result: Result<Vec<RatingPoint>, _> = serde_json::from_str(s);
    }
});
