//! Property-based tests for document numbering.
//!
//! - Property 1: Allocations are strictly increasing without gaps
//! - Property 2: `{SEQ}` renders the counter losslessly
//! - Property 3: Unknown tokens are always rejected

use chrono::NaiveDate;
use proptest::prelude::*;

use super::error::SequenceError;
use super::service::SequenceService;
use super::template::{FormatTemplate, SEQ_WIDTH};
use super::types::TranscodeState;
use arus_shared::types::TranscodeId;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn state(last_number: i64) -> TranscodeState {
    TranscodeState {
        id: TranscodeId::new(1),
        code: "JV".to_string(),
        prefix: "JV".to_string(),
        format: "{PREFIX}/{MM}{YYYY}/{SEQ}".to_string(),
        last_number,
        is_active: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Gapless monotonic allocation
    // =========================================================================

    /// *For any* starting counter and number of allocations applied one after
    /// another, the allocated values SHALL be exactly start+1 ..= start+n.
    #[test]
    fn prop_sequential_allocations_are_gapless(
        start in 0i64..1_000_000,
        count in 1usize..200,
        today in date_strategy(),
    ) {
        let mut current = state(start);
        let mut values = Vec::with_capacity(count);

        for _ in 0..count {
            let allocation = SequenceService::allocate(&current, today).unwrap();
            current.last_number = allocation.value;
            values.push(allocation.value);
        }

        let expected: Vec<i64> = (1..=count as i64).map(|i| start + i).collect();
        prop_assert_eq!(values, expected);
    }

    // =========================================================================
    // Property 2: Sequence rendering
    // =========================================================================

    /// *For any* counter value, the `{SEQ}` part SHALL be at least
    /// `SEQ_WIDTH` characters long and parse back to the same value.
    #[test]
    fn prop_seq_token_round_trips(seq in 1i64..100_000_000, today in date_strategy()) {
        let template = FormatTemplate::parse("{SEQ}").unwrap();
        let rendered = template.render("", today, seq);

        prop_assert!(rendered.len() >= SEQ_WIDTH);
        prop_assert_eq!(rendered.parse::<i64>().unwrap(), seq);
    }

    /// *For any* date, the rendered month and year SHALL match the date.
    #[test]
    fn prop_date_tokens_follow_allocation_date(today in date_strategy(), seq in 1i64..10_000) {
        let template = FormatTemplate::parse("{YYYY}-{MM}-{DD}#{SEQ}").unwrap();
        let rendered = template.render("", today, seq);

        prop_assert_eq!(&rendered[..10], today.format("%Y-%m-%d").to_string());
    }

    // =========================================================================
    // Property 3: Template validation
    // =========================================================================

    /// *For any* upper-case token outside the known set, parsing SHALL fail.
    #[test]
    fn prop_unknown_token_rejected(token in "[A-Z]{1,8}") {
        prop_assume!(!["PREFIX", "YYYY", "YY", "MM", "DD", "SEQ"].contains(&token.as_str()));

        let raw = format!("{{{token}}}/{{SEQ}}");
        let parsed = FormatTemplate::parse(&raw);
        prop_assert!(matches!(parsed, Err(SequenceError::InvalidTemplate(_))));
    }
}
