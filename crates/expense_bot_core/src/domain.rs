//! crates/expense_bot_core/src/domain.rs
//!
//! Defines the pure, core data structures for the expense bot.
//! These structs are independent of any chat transport or storage API.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Title used when an entry carries nothing but an amount (and maybe currency/date).
pub const PLACEHOLDER_TITLE: &str = "(без названия)";

/// Identity of the chat user who owns a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//=========================================================================================
// Options
//=========================================================================================

/// One selectable value of a single-select schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
    /// Visual tag of the option. Categories and subcategories are joined on it.
    pub color: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The kind of a schema property, as far as the catalog cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Select(Vec<SelectOption>),
    /// Any other property type, keyed by the store's own type name.
    Other(String),
}

/// A snapshot of the remote store's schema: property name -> kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSchema {
    pub properties: HashMap<String, PropertyKind>,
}

//=========================================================================================
// Parsed entry
//=========================================================================================

/// Currencies an entry may be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    Try,
    Gel,
    Usd,
    #[default]
    Rub,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Try, Currency::Gel, Currency::Usd, Currency::Rub];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Gel => "GEL",
            Currency::Usd => "USD",
            Currency::Rub => "RUB",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a token is not one of the supported currency codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    /// Case-insensitive match against the supported codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

/// The result of parsing one free-text message.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub amount: f64,
    pub title: String,
    pub currency: Currency,
    /// A `ddmmyy` token, if the message ended with one.
    pub raw_date: Option<String>,
}

//=========================================================================================
// Session
//=========================================================================================

/// Which selection a session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AwaitingCategory,
    AwaitingSubcategory,
    AwaitingAccount,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::AwaitingCategory => "category",
            Step::AwaitingSubcategory => "subcategory",
            Step::AwaitingAccount => "account",
        };
        f.write_str(name)
    }
}

/// Per-user accumulator of the parsed entry plus the selections made so far.
///
/// Selections are copied by name, so the session never points back into the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub entry: ParsedEntry,
    pub step: Step,
    pub category: Option<String>,
    /// Color tag of the chosen category, used to filter subcategories.
    pub category_color: Option<String>,
    pub subcategory: Option<String>,
    pub account: Option<String>,
}

impl Session {
    pub fn new(entry: ParsedEntry) -> Self {
        Self {
            entry,
            step: Step::AwaitingCategory,
            category: None,
            category_color: None,
            subcategory: None,
            account: None,
        }
    }

    /// Turns a fully-selected session into a record, or hands it back untouched.
    pub fn into_record(self, date: ResolvedDate) -> Result<ExpenseRecord, Session> {
        match (self.category.clone(), self.subcategory.clone(), self.account.clone()) {
            (Some(category), Some(subcategory), Some(account)) => Ok(ExpenseRecord {
                date,
                title: self.entry.title,
                category,
                subcategory,
                amount: self.entry.amount,
                currency: self.entry.currency,
                account,
            }),
            _ => Err(self),
        }
    }
}

//=========================================================================================
// Finalized output
//=========================================================================================

/// Calendar fields derived at finalize time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// `YYYY-MM-DD`.
    pub iso_date: String,
    pub month_name: String,
    /// Four-digit year.
    pub year: String,
}

/// One finalized expense, ready for the record sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub date: ResolvedDate,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub amount: f64,
    pub currency: Currency,
    pub account: String,
}
