#![no_main]

use libfuzzer_sys::fuzz_target;
use vulnsync_reconciler::TrackingStore;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(store) = TrackingStore::from_json(content) {
            let reparsed = TrackingStore::from_json(&store.to_json());
            assert_eq!(reparsed.as_ref(), Ok(&store));
        }
    }
});
