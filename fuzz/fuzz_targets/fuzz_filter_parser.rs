#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // must not panic; rendered filters must parse back
        if let Ok(filter) = queryrunner::query::parse_filter_json(s) {
            let rendered = filter.to_document();
            let again = queryrunner::Filter::from_document(&rendered);
            assert!(again.is_ok(), "rendered filter failed to parse: {rendered}");
        }
    }
});
