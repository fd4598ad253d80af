//! Property-based invariant tests for length measurement and truncation.
//!
//! 1. Appending text never decreases the measured length
//! 2. Character length equals the code-point count
//! 3. Visual width of ASCII is its length, of CJK twice the count
//! 4. Truncation lands on a boundary, fits the budget, and is maximal
//! 5. Excluding a range never increases the measured length

use nrb_text::codec;
use nrb_text::measure::{LengthUnit, measure_length, truncate_index};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

const MEASURED: [LengthUnit; 3] = [
    LengthUnit::Byte,
    LengthUnit::Character,
    LengthUnit::VisualWidth,
];

fn arb_unit() -> impl Strategy<Value = LengthUnit> {
    prop_oneof![
        Just(LengthUnit::Byte),
        Just(LengthUnit::Character),
        Just(LengthUnit::VisualWidth),
    ]
}

/// Mixed ASCII, CJK, zero-width, and astral text.
fn arb_text(max_len: usize) -> impl Strategy<Value = String> {
    let ch = prop_oneof![
        4 => proptest::char::range('a', 'z'),
        2 => proptest::char::range('\u{4E00}', '\u{9FFF}'),
        1 => proptest::char::range('\u{1F600}', '\u{1F64F}'),
        1 => Just('\u{200B}'),
        1 => any::<char>(),
    ];
    prop::collection::vec(ch, 0..max_len).prop_map(|chars| chars.into_iter().collect())
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Monotonicity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn appending_never_shrinks(base in arb_text(40), tail in arb_text(10)) {
        for unit in MEASURED {
            let before = measure_length(&base, unit, 0..0);
            let mut grown = base.clone();
            grown.push_str(&tail);
            prop_assert!(measure_length(&grown, unit, 0..0) >= before);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-3. Unit definitions
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn character_is_code_point_count(text in arb_text(60)) {
        prop_assert_eq!(
            measure_length(&text, LengthUnit::Character, 0..0),
            text.chars().count()
        );
    }

    #[test]
    fn visual_width_of_ascii(text in "[ -~]{0,80}") {
        prop_assert_eq!(measure_length(&text, LengthUnit::VisualWidth, 0..0), text.len());
    }

    #[test]
    fn visual_width_of_cjk(n in 0usize..50) {
        let text: String = std::iter::repeat_n('汉', n).collect();
        prop_assert_eq!(measure_length(&text, LengthUnit::VisualWidth, 0..0), 2 * n);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Truncation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn truncation_is_boundary_fitting_and_maximal(
        text in arb_text(60),
        unit in arb_unit(),
        keep in 0usize..80,
    ) {
        let index = truncate_index(&text, unit, keep);
        prop_assert!(text.is_char_boundary(index));

        let prefix = &text[..index];
        prop_assert!(std::str::from_utf8(prefix.as_bytes()).is_ok());
        prop_assert!(measure_length(prefix, unit, 0..0) <= keep);

        if let Some(next) = text[index..].chars().next() {
            let extended = &text[..index + next.len_utf8()];
            prop_assert!(measure_length(extended, unit, 0..0) > keep);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Exclusion
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn exclusion_never_adds(text in arb_text(40), a in 0usize..60, b in 0usize..60) {
        let (start, end) = (a.min(b), a.max(b));
        for unit in MEASURED {
            prop_assert!(measure_length(&text, unit, start..end) <= measure_length(&text, unit, 0..0));
        }
    }

    #[test]
    fn excluding_everything_is_zero(text in arb_text(40)) {
        let len = codec::utf16_len(&text);
        for unit in MEASURED {
            prop_assert_eq!(measure_length(&text, unit, 0..len), 0);
        }
    }
}
