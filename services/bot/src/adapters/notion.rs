//! services/bot/src/adapters/notion.rs
//!
//! This module contains the Notion adapter, the concrete implementation of the
//! `SchemaSource` and `RecordSink` ports from the `core` crate. It talks to the
//! Notion REST API using `reqwest`.

use std::collections::HashMap;

use async_trait::async_trait;
use expense_bot_core::domain::{DatabaseSchema, ExpenseRecord, PropertyKind, SelectOption};
use expense_bot_core::fields;
use expense_bot_core::ports::{PortError, PortResult, RecordSink, SchemaSource};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that reads the database schema and creates pages in one Notion database.
#[derive(Clone)]
pub struct NotionAdapter {
    client: Client,
    api_url: String,
    api_key: String,
    version: String,
    database_id: String,
}

impl NotionAdapter {
    /// Creates a new `NotionAdapter` with its own HTTP client.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.notion_timeout).build()?;
        Ok(Self {
            client,
            api_url: config.notion_api_url.clone(),
            api_key: config.notion_api_key.clone(),
            version: config.notion_version.clone(),
            database_id: config.notion_database_id.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.api_url, path))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
    }

    /// Sends the request and returns the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> PortResult<String> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PortError::Unexpected(format!("Notion request timed out: {e}"))
            } else {
                PortError::Unexpected(format!("Notion request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read Notion response: {e}")))?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!(%status, body = %body, "Notion returned an error");
            Err(status_to_error(status, &body))
        }
    }
}

//=========================================================================================
// "Impure" API Payload Structs
//=========================================================================================

#[derive(Deserialize)]
struct DatabaseResponse {
    properties: HashMap<String, PropertyResponse>,
}

#[derive(Deserialize)]
struct PropertyResponse {
    #[serde(rename = "type")]
    kind: String,
    select: Option<SelectResponse>,
}

#[derive(Deserialize)]
struct SelectResponse {
    #[serde(default)]
    options: Vec<OptionResponse>,
}

#[derive(Deserialize)]
struct OptionResponse {
    id: String,
    name: String,
    #[serde(default)]
    color: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

impl DatabaseResponse {
    fn to_domain(self) -> DatabaseSchema {
        let properties = self
            .properties
            .into_iter()
            .map(|(name, property)| (name, property.to_domain()))
            .collect();
        DatabaseSchema { properties }
    }
}

impl PropertyResponse {
    fn to_domain(self) -> PropertyKind {
        match (self.kind.as_str(), self.select) {
            ("select", Some(select)) => PropertyKind::Select(
                select
                    .options
                    .into_iter()
                    .map(|o| SelectOption::new(o.id, o.name, o.color))
                    .collect(),
            ),
            _ => PropertyKind::Other(self.kind),
        }
    }
}

fn status_to_error(status: StatusCode, body: &str) -> PortError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Unexpected(format!("HTTP {status}: {message}")),
    }
}

/// Builds the `properties` object of a new page.
fn record_properties(record: &ExpenseRecord) -> Value {
    let select = |name: &str| json!({ "select": { "name": name } });
    let mut properties = serde_json::Map::new();
    properties.insert(fields::DATE.into(), json!({ "date": { "start": record.date.iso_date } }));
    properties.insert(fields::MONTH.into(), select(&record.date.month_name));
    properties.insert(fields::YEAR.into(), select(&record.date.year));
    properties.insert(
        fields::TITLE.into(),
        json!({ "title": [{ "text": { "content": record.title } }] }),
    );
    properties.insert(fields::CATEGORY.into(), select(&record.category));
    properties.insert(fields::SUBCATEGORY.into(), select(&record.subcategory));
    properties.insert(fields::AMOUNT.into(), json!({ "number": record.amount }));
    properties.insert(fields::CURRENCY.into(), select(record.currency.code()));
    properties.insert(fields::ACCOUNT.into(), select(&record.account));
    properties.insert(fields::OPERATION_TYPE.into(), select(fields::OPERATION_TYPE_EXPENSE));
    properties.insert(fields::STATUS.into(), select(fields::STATUS_PAID));
    Value::Object(properties)
}

//=========================================================================================
// Port Trait Implementations
//=========================================================================================

#[async_trait]
impl SchemaSource for NotionAdapter {
    async fn fetch_schema(&self) -> PortResult<DatabaseSchema> {
        let path = format!("databases/{}", self.database_id);
        let body = self.send(self.request(reqwest::Method::GET, &path)).await?;

        let database: DatabaseResponse = serde_json::from_str(&body)
            .map_err(|e| PortError::Unexpected(format!("Failed to parse Notion schema: {e}")))?;
        Ok(database.to_domain())
    }
}

#[async_trait]
impl RecordSink for NotionAdapter {
    async fn create_record(&self, record: &ExpenseRecord) -> PortResult<()> {
        let payload = json!({
            "parent": { "database_id": self.database_id },
            "properties": record_properties(record),
        });
        self.send(self.request(reqwest::Method::POST, "pages").json(&payload))
            .await?;
        Ok(())
    }
}
