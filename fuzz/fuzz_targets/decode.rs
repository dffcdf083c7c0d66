#![no_main]

use libfuzzer_sys::fuzz_target;
use termjson::{DecodeOptions, EncodeOptions};

fuzz_target!(|data: &[u8]| {
    let options = DecodeOptions::new();
    if let Ok(term) = termjson::decode_from_text(data, &options) {
        // Integers beyond 64 bits decode but do not encode.
        if let Ok(text) = termjson::encode_to_text(&term, &EncodeOptions::new()) {
            let again = termjson::decode_from_text(&text, &options).unwrap();
            assert_eq!(again, term);
        }
    }
});
