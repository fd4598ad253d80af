#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nrb_text::codec;
use nrb_text::measure::LengthUnit;
use nrb_widgets::text_field::{LengthLimitEngine, TextFieldConfig};

#[derive(Debug, Arbitrary)]
struct Input {
    dest: String,
    candidate: String,
    unit: u8,
    max: u8,
    start: u16,
    end: u16,
    caret: u16,
}

fuzz_target!(|input: Input| {
    if input.dest.len() > 1024 || input.candidate.len() > 1024 {
        return;
    }
    let unit = match input.unit % 3 {
        0 => LengthUnit::Byte,
        1 => LengthUnit::Character,
        _ => LengthUnit::VisualWidth,
    };
    let max = usize::from(input.max);
    let mut engine = LengthLimitEngine::new(&TextFieldConfig::default());
    engine.configure(Some(max), unit);

    // Arbitrary (even mid-surrogate or inverted) ranges must not panic.
    let range = usize::from(input.start)..usize::from(input.end);
    let outcome = engine.filter(&input.candidate, &input.dest, range.clone());
    let accepted = outcome.apply(&input.candidate);
    assert!(input.candidate.starts_with(accepted));
    let remaining = engine.measure(&input.dest, range);
    if remaining <= max {
        assert!(remaining + engine.measure(accepted, 0..0) <= max);
    }

    let caret = usize::from(input.caret);
    if let Some(fix) = engine.enforce_on_change_commit(&input.dest, caret) {
        assert!(engine.measure(&fix.text, 0..0) <= max);
        assert!(fix.cursor.unwrap_or(0) <= codec::utf16_len(&fix.text));
    }
});
