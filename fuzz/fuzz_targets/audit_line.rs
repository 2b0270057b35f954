#![no_main]

use libfuzzer_sys::fuzz_target;
use vulnsync_audit::{AuditParser, FormatFamily};

// 어떤 계열의 디코더도 임의 입력에서 패닉하지 않아야 합니다.
fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = AuditParser::new();
        for family in FormatFamily::ALL {
            if let Ok(outcome) = parser.parse_str(family, content) {
                assert!(outcome.lines_skipped <= outcome.lines_total);
                assert!(outcome.records.len() <= outcome.lines_total);
            }
        }
    }
});
