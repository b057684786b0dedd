#![no_main]

use aoe4_overlay::config::{GRAPH_KEYS, Settings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever parses must normalize to exactly the four graph keys
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(mut settings) = serde_json::from_str::<Settings>(s)
    {
        settings.normalize();
        assert_eq!(settings.show_graph.len(), GRAPH_KEYS.len());
        assert!((200..=10_000).contains(&settings.app_width));
    }
});
