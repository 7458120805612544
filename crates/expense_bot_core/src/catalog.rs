//! crates/expense_bot_core/src/catalog.rs
//!
//! The option catalog: a frozen snapshot of the three single-select fields
//! (category, subcategory, account) taken once at startup.

use tracing::{info, warn};

use crate::domain::{DatabaseSchema, PropertyKind, SelectOption};
use crate::fields;
use crate::ports::{PortResult, SchemaSource};
use crate::protocol::Selection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionCatalog {
    pub categories: Vec<SelectOption>,
    pub subcategories: Vec<SelectOption>,
    pub accounts: Vec<SelectOption>,
}

impl OptionCatalog {
    /// Fetches the schema and builds the catalog from it.
    pub async fn load(source: &dyn SchemaSource) -> PortResult<Self> {
        let schema = source.fetch_schema().await?;
        let catalog = Self::from_schema(&schema);
        info!(
            categories = ?names(&catalog.categories),
            subcategories = ?names(&catalog.subcategories),
            accounts = ?names(&catalog.accounts),
            "Option catalog loaded"
        );
        Ok(catalog)
    }

    /// Builds the catalog. A field that is missing or not a single-select stays empty.
    /// Subcategories whose id cannot fit in a button's callback data are left out.
    pub fn from_schema(schema: &DatabaseSchema) -> Self {
        Self {
            categories: select_options(schema, fields::CATEGORY),
            subcategories: addressable(select_options(schema, fields::SUBCATEGORY)),
            accounts: select_options(schema, fields::ACCOUNT),
        }
    }

    pub fn category(&self, index: usize) -> Option<&SelectOption> {
        self.categories.get(index)
    }

    pub fn account(&self, index: usize) -> Option<&SelectOption> {
        self.accounts.get(index)
    }

    /// Subcategories sharing the given color tag, in catalog order.
    pub fn subcategories_for(&self, color: &str) -> Vec<&SelectOption> {
        self.subcategories
            .iter()
            .filter(|s| s.color == color)
            .collect()
    }

    /// Looks a subcategory up by id, restricted to the given color.
    pub fn subcategory_in(&self, color: &str, id: &str) -> Option<&SelectOption> {
        self.subcategories
            .iter()
            .find(|s| s.id == id && s.color == color)
    }
}

fn select_options(schema: &DatabaseSchema, field: &str) -> Vec<SelectOption> {
    match schema.properties.get(field) {
        Some(PropertyKind::Select(options)) => options.clone(),
        Some(PropertyKind::Other(kind)) => {
            warn!(field, kind = %kind, "Field is not a single-select; leaving its options empty");
            Vec::new()
        }
        None => {
            warn!(field, "Field is missing from the schema; leaving its options empty");
            Vec::new()
        }
    }
}

fn addressable(options: Vec<SelectOption>) -> Vec<SelectOption> {
    options
        .into_iter()
        .filter(|option| {
            let fits = Selection::Subcategory(option.id.clone()).fits_callback();
            if !fits {
                warn!(subcategory = %option.name, id = %option.id, "Option id is too long for callback data; skipping it");
            }
            fits
        })
        .collect()
}

fn names(options: &[SelectOption]) -> Vec<&str> {
    options.iter().map(|o| o.name.as_str()).collect()
}
