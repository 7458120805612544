//! crates/expense_bot_core/src/flow.rs
//!
//! The selection flow: a per-user state machine driven by free text and
//! button presses.
//!
//! ```text
//! text ──► AwaitingCategory ──cat_i──► AwaitingSubcategory ──subcat_id──► AwaitingAccount ──acct_i──► finalize
//! ```
//!
//! A new text message always starts over (the previous session is dropped).
//! Finalizing removes the session before the sink is called, so a failed
//! write loses the entry and the user has to send it again.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::catalog::OptionCatalog;
use crate::date::resolve_date;
use crate::domain::{SelectOption, Session, Step, UserId};
use crate::parser::{parse_entry, ParseError};
use crate::ports::{Clock, PortError, RecordSink};
use crate::protocol::{Choice, FlowReply, Selection};
use crate::session::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Could not parse the entry: {0}")]
    InvalidEntry(#[from] ParseError),
    #[error("No entry is in progress for this user")]
    SessionNotFound,
    /// Stale, out-of-order, or out-of-range button press.
    #[error("No {step} option matches '{key}'")]
    SelectionNotFound { step: Step, key: String },
    #[error("Category '{category}' has no subcategories with a matching color")]
    NoMatchingSubcategories { category: String },
    #[error("The entry is missing a selection and cannot be saved")]
    Incomplete,
    #[error("Failed to save the record: {0}")]
    Sink(#[source] PortError),
}

impl FlowError {
    /// Everything except a sink failure leaves the user able to carry on
    /// (or restart) without losing anything that was saved.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FlowError::Sink(_))
    }
}

pub type FlowResult = Result<FlowReply, FlowError>;

/// Orchestrates the category -> subcategory -> account selection for every user.
pub struct SelectionFlow {
    catalog: Arc<OptionCatalog>,
    sessions: SessionStore,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
}

impl SelectionFlow {
    pub fn new(catalog: Arc<OptionCatalog>, sink: Arc<dyn RecordSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            sessions: SessionStore::new(),
            sink,
            clock,
        }
    }

    /// A snapshot of the user's in-flight session.
    pub async fn session(&self, user: UserId) -> Option<Session> {
        self.sessions.get(user).await
    }

    /// Parses `text` and opens a new session, replacing any unfinished one.
    pub async fn start(&self, user: UserId, text: &str) -> FlowResult {
        let entry = parse_entry(text)?;

        if self.sessions.insert(user, Session::new(entry.clone())).await {
            info!(%user, "Replaced an unfinished entry with a new one");
        }
        info!(%user, amount = entry.amount, currency = %entry.currency, "Entry parsed; awaiting category");

        Ok(FlowReply::ChooseCategory {
            entry,
            choices: indexed_choices(&self.catalog.categories, Selection::Category),
        })
    }

    /// Drops the user's session. Returns `true` if there was one.
    pub async fn cancel(&self, user: UserId) -> bool {
        let dropped = self.sessions.remove(user).await.is_some();
        if dropped {
            info!(%user, "Entry cancelled");
        }
        dropped
    }

    /// Applies one button press to the user's session.
    pub async fn choose(&self, user: UserId, selection: Selection) -> FlowResult {
        match selection {
            Selection::Category(index) => self.choose_category(user, index).await,
            Selection::Subcategory(id) => self.choose_subcategory(user, &id).await,
            Selection::Account(index) => self.choose_account(user, index).await,
        }
    }

    async fn choose_category(&self, user: UserId, index: usize) -> FlowResult {
        let catalog = &self.catalog;
        let result = self
            .sessions
            .update(user, |session| {
                expect_step(session, Step::AwaitingCategory, &index.to_string())?;
                let category = catalog
                    .category(index)
                    .ok_or_else(|| not_found(Step::AwaitingCategory, index))?;

                session.category = Some(category.name.clone());
                session.category_color = Some(category.color.clone());

                let subcategories = catalog.subcategories_for(&category.color);
                if subcategories.is_empty() {
                    return Err(FlowError::NoMatchingSubcategories {
                        category: category.name.clone(),
                    });
                }

                session.step = Step::AwaitingSubcategory;
                Ok(FlowReply::ChooseSubcategory {
                    category: category.name.clone(),
                    choices: subcategories
                        .into_iter()
                        .map(|s| Choice {
                            label: s.name.clone(),
                            selection: Selection::Subcategory(s.id.clone()),
                        })
                        .collect(),
                })
            })
            .await
            .ok_or(FlowError::SessionNotFound)?;

        match &result {
            Ok(_) => info!(%user, index, "Category chosen; awaiting subcategory"),
            Err(FlowError::NoMatchingSubcategories { category }) => {
                warn!(%user, %category, "No subcategory shares the category's color")
            }
            Err(e) => warn!(%user, index, error = %e, "Category selection rejected"),
        }
        result
    }

    async fn choose_subcategory(&self, user: UserId, id: &str) -> FlowResult {
        let catalog = &self.catalog;
        let result = self
            .sessions
            .update(user, |session| {
                expect_step(session, Step::AwaitingSubcategory, id)?;
                let color = session.category_color.as_deref().unwrap_or_default();
                let subcategory = catalog
                    .subcategory_in(color, id)
                    .ok_or_else(|| not_found(Step::AwaitingSubcategory, id))?;

                session.subcategory = Some(subcategory.name.clone());
                session.step = Step::AwaitingAccount;
                Ok(FlowReply::ChooseAccount {
                    subcategory: subcategory.name.clone(),
                    choices: indexed_choices(&catalog.accounts, Selection::Account),
                })
            })
            .await
            .ok_or(FlowError::SessionNotFound)?;

        match &result {
            Ok(_) => info!(%user, id, "Subcategory chosen; awaiting account"),
            Err(e) => warn!(%user, id, error = %e, "Subcategory selection rejected"),
        }
        result
    }

    async fn choose_account(&self, user: UserId, index: usize) -> FlowResult {
        let catalog = &self.catalog;
        let (checked, taken) = self
            .sessions
            .update_or_take(user, |session| {
                let checked = expect_step(session, Step::AwaitingAccount, &index.to_string())
                    .and_then(|()| {
                        catalog
                            .account(index)
                            .ok_or_else(|| not_found(Step::AwaitingAccount, index))
                    })
                    .and_then(|account| {
                        if session.category.is_none() || session.subcategory.is_none() {
                            return Err(FlowError::Incomplete);
                        }
                        session.account = Some(account.name.clone());
                        Ok(())
                    });
                let finalize = checked.is_ok();
                (checked, finalize)
            })
            .await
            .ok_or(FlowError::SessionNotFound)?;

        if let Err(e) = checked {
            warn!(%user, index, error = %e, "Account selection rejected");
            return Err(e);
        }
        let session = taken.ok_or(FlowError::SessionNotFound)?;
        self.finalize(user, session).await
    }

    /// The session is already out of the table here, whatever the sink says.
    async fn finalize(&self, user: UserId, session: Session) -> FlowResult {
        let date = resolve_date(session.entry.raw_date.as_deref(), self.clock.now());
        let record = session.into_record(date).map_err(|_| FlowError::Incomplete)?;

        match self.sink.create_record(&record).await {
            Ok(()) => {
                info!(%user, date = %record.date.iso_date, "Record created");
                Ok(FlowReply::Completed(record))
            }
            Err(e) => {
                error!(%user, error = %e, "Failed to create record; entry discarded");
                Err(FlowError::Sink(e))
            }
        }
    }
}

fn expect_step(session: &Session, expected: Step, key: &str) -> Result<(), FlowError> {
    if session.step == expected {
        Ok(())
    } else {
        Err(not_found(expected, key))
    }
}

fn not_found(step: Step, key: impl ToString) -> FlowError {
    FlowError::SelectionNotFound {
        step,
        key: key.to_string(),
    }
}

fn indexed_choices(options: &[SelectOption], to_selection: fn(usize) -> Selection) -> Vec<Choice> {
    options
        .iter()
        .enumerate()
        .map(|(index, option)| Choice {
            label: option.name.clone(),
            selection: to_selection(index),
        })
        .collect()
}
