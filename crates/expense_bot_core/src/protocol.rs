//! crates/expense_bot_core/src/protocol.rs
//!
//! Defines the callback tokens carried by selection buttons, and the replies the
//! selection flow hands back to the transport.

use std::fmt;
use std::str::FromStr;

use crate::domain::{ExpenseRecord, ParsedEntry, Step};

const CATEGORY_PREFIX: &str = "cat_";
const SUBCATEGORY_PREFIX: &str = "subcat_";
const ACCOUNT_PREFIX: &str = "acct_";

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_BYTES: usize = 64;

//=========================================================================================
// Button callbacks (transport -> flow)
//=========================================================================================

/// A decoded button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Positional index into the category list.
    Category(usize),
    /// Stable option id, since the presented subcategory list is filtered.
    Subcategory(String),
    /// Positional index into the account list.
    Account(usize),
}

impl Selection {
    /// The step this selection answers.
    pub fn step(&self) -> Step {
        match self {
            Selection::Category(_) => Step::AwaitingCategory,
            Selection::Subcategory(_) => Step::AwaitingSubcategory,
            Selection::Account(_) => Step::AwaitingAccount,
        }
    }

    /// Encodes the selection as callback data (`cat_<i>`, `subcat_<id>`, `acct_<i>`).
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(data: &str) -> Result<Self, UnknownCallback> {
        data.parse()
    }

    /// Whether the encoded token can be carried by a button at all.
    pub fn fits_callback(&self) -> bool {
        self.encode().len() <= MAX_CALLBACK_BYTES
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Category(index) => write!(f, "{CATEGORY_PREFIX}{index}"),
            Selection::Subcategory(id) => write!(f, "{SUBCATEGORY_PREFIX}{id}"),
            Selection::Account(index) => write!(f, "{ACCOUNT_PREFIX}{index}"),
        }
    }
}

/// Callback data that is not one of the known tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown callback data: {0}")]
pub struct UnknownCallback(pub String);

impl FromStr for Selection {
    type Err = UnknownCallback;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(data.to_string());

        if let Some(index) = data.strip_prefix(CATEGORY_PREFIX) {
            return parse_index(index).map(Selection::Category).ok_or_else(unknown);
        }
        if let Some(id) = data.strip_prefix(SUBCATEGORY_PREFIX) {
            if id.is_empty() {
                return Err(unknown());
            }
            return Ok(Selection::Subcategory(id.to_string()));
        }
        if let Some(index) = data.strip_prefix(ACCOUNT_PREFIX) {
            return parse_index(index).map(Selection::Account).ok_or_else(unknown);
        }
        Err(unknown())
    }
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

//=========================================================================================
// Replies (flow -> transport)
//=========================================================================================

/// One button of a selection keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub selection: Selection,
}

/// What the transport should show after a successful flow step.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowReply {
    /// A new entry was parsed; pick a category.
    ChooseCategory {
        entry: ParsedEntry,
        choices: Vec<Choice>,
    },
    /// Category recorded; pick one of its subcategories.
    ChooseSubcategory {
        category: String,
        choices: Vec<Choice>,
    },
    /// Subcategory recorded; pick an account.
    ChooseAccount {
        subcategory: String,
        choices: Vec<Choice>,
    },
    /// The record was created and the session is gone.
    Completed(ExpenseRecord),
}
