//! crates/expense_bot_core/src/parser.rs
//!
//! Turns one free-text line like `3000.45 Такси до отеля USD 150425` into a
//! [`ParsedEntry`]: leading amount, optional trailing short date, optional
//! trailing currency, and whatever is left over as the title.

use crate::domain::{Currency, ParsedEntry, PLACEHOLDER_TITLE};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("The message is empty; expected an amount first")]
    MissingAmount,
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
}

/// Parses an entry. Fails only when the first token is missing or not a number.
pub fn parse_entry(raw: &str) -> Result<ParsedEntry, ParseError> {
    let mut tokens = raw.split_whitespace();
    let amount_token = tokens.next().ok_or(ParseError::MissingAmount)?;
    let amount = parse_amount(amount_token)?;

    let mut rest: Vec<&str> = tokens.collect();

    // Trailing tokens are checked right-to-left, date first, each at most once.
    let raw_date = match rest.last() {
        Some(last) if is_short_date(last) => rest.pop().map(str::to_string),
        _ => None,
    };

    let currency = match rest.last().and_then(|last| last.parse::<Currency>().ok()) {
        Some(currency) => {
            rest.pop();
            currency
        }
        None => Currency::default(),
    };

    let title = if rest.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        rest.join(" ")
    };

    Ok(ParsedEntry {
        amount,
        title,
        currency,
        raw_date,
    })
}

/// Accepts a comma as the decimal separator. The whole token must be a finite number.
fn parse_amount(token: &str) -> Result<f64, ParseError> {
    let normalized = token.replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::InvalidAmount(token.to_string()))
}

/// Exactly six ASCII digits (`ddmmyy`).
pub fn is_short_date(token: &str) -> bool {
    token.len() == 6 && token.bytes().all(|b| b.is_ascii_digit())
}
