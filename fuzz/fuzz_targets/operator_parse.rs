//! Fuzz target for operator parsing.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_operator_parse
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry_query::filter::Operator;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing never panics, and a parsed operator parses back to itself.
        if let Ok(op) = input.parse::<Operator>() {
            assert_eq!(op.as_sql().parse::<Operator>().ok(), Some(op));
        }
    }
});
