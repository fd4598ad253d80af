#![no_main]

use libfuzzer_sys::fuzz_target;
use nrb_core::InsertEvent;
use nrb_core::codec::{byte_length_at, code_point_at, valid_prefix};

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }

    // Readers must never index past the slice.
    let mut i = 0;
    while i < data.len() {
        let step = byte_length_at(data, i);
        assert!(step >= 1 && i + step <= data.len());
        if let Some((c, len)) = code_point_at(data, i) {
            assert_eq!(c.len_utf8(), len);
        }
        i += step;
    }

    let prefix = valid_prefix(data);
    assert!(data.starts_with(prefix.as_bytes()));

    // Decoding a transfer buffer never yields more than its payload.
    for capacity in [1usize, 2, 16, 256] {
        let event = InsertEvent::from_buffer(data, capacity);
        assert!(event.text.len() < capacity.max(1));
        assert!(data.starts_with(event.text.as_bytes()));
    }
});
