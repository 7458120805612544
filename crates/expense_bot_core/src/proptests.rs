//! Property-based tests for entry parsing
//!
//! Trailing currency and date tokens must be recovered no matter how many
//! title words precede them.

use crate::domain::{Currency, PLACEHOLDER_TITLE};
use crate::parser::parse_entry;
use proptest::prelude::*;

fn arb_currency() -> impl Strategy<Value = Option<Currency>> {
    prop_oneof![
        Just(None),
        Just(Some(Currency::Try)),
        Just(Some(Currency::Gel)),
        Just(Some(Currency::Usd)),
        Just(Some(Currency::Rub)),
    ]
}

fn arb_short_date() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[0-9]{6}")
}

fn arb_title_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[а-я]{1,8}", 0..6)
}

/// Randomizes the case of a currency code the way users type it.
fn arb_code_case() -> impl Strategy<Value = bool> {
    any::<bool>()
}

proptest! {
    #[test]
    fn recovers_trailing_tokens(
        whole in -100_000i64..100_000,
        cents in 0u32..100,
        comma in any::<bool>(),
        words in arb_title_words(),
        currency in arb_currency(),
        lower in arb_code_case(),
        date in arb_short_date(),
    ) {
        let separator = if comma { "," } else { "." };
        let mut parts = vec![format!("{whole}{separator}{cents:02}")];
        parts.extend(words.iter().cloned());
        if let Some(c) = currency {
            parts.push(if lower { c.code().to_lowercase() } else { c.code().to_string() });
        }
        if let Some(d) = &date {
            parts.push(d.clone());
        }

        let entry = parse_entry(&parts.join(" ")).unwrap();

        let expected_amount: f64 = format!("{whole}.{cents:02}").parse().unwrap();
        prop_assert_eq!(entry.amount, expected_amount);
        prop_assert_eq!(entry.currency, currency.unwrap_or_default());
        prop_assert_eq!(entry.raw_date, date);
        if words.is_empty() {
            prop_assert_eq!(entry.title, PLACEHOLDER_TITLE);
        } else {
            prop_assert_eq!(entry.title, words.join(" "));
        }
    }

    #[test]
    fn non_numeric_first_token_always_fails(word in "[а-яa-z]{1,10}", rest in "[а-я ]{0,20}") {
        prop_assume!(word.parse::<f64>().is_err());
        let line = format!("{word} {rest}");
        prop_assert!(parse_entry(&line).is_err());
    }
}
