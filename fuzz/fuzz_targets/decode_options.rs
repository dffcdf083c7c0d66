#![no_main]

use libfuzzer_sys::fuzz_target;
use termjson::{DecodeOptions, EncodeOptions, Escape, Floats, Keys};

fuzz_target!(|data: &[u8]| {
    let options = DecodeOptions::new()
        .keys(Keys::Atoms)
        .floats(Floats::Decimals);
    if let Ok(term) = termjson::decode_from_text(data, &options) {
        let options = EncodeOptions::new().pretty(true).escape(Escape::UnicodeSafe);
        if let Ok(text) = termjson::encode_to_text(&term, &options) {
            assert!(text.is_ascii());
        }
    }
});
