//! Fuzz test for the WORDBOOK Parser
//!
//! This fuzz target tests the parser with arbitrary byte sequences to find:
//! - Panics or crashes
//! - Stack exhaustion on deep nesting
//! - Values that break their invariants
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use wordbook_dsl::parse_text;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        match parse_text(input) {
            Ok(values) => {
                let line_count = input.matches('\n').count() + 1;
                for value in &values {
                    assert!(!value.is_empty(), "Parsed values always have words");
                    assert!(value.line() >= 1, "Value line should be >= 1");
                    assert!(value.line() <= line_count, "Value line past end of input");
                }
            }
            Err(err) => {
                assert!(err.position.line >= 1, "Error line should be >= 1");
                assert!(!err.to_string().is_empty(), "Error message should not be empty");
            }
        }
    }
});
