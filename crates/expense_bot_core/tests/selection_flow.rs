//! End-to-end tests for the selection flow, driven through in-memory ports.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use expense_bot_core::{
    Clock, Currency, DatabaseSchema, ExpenseRecord, FlowError, FlowReply, OptionCatalog,
    PortError, PortResult, PropertyKind, RecordSink, SelectOption, Selection, SelectionFlow, Step,
    UserId, MAX_CALLBACK_BYTES,
};
use expense_bot_core::fields;

//=========================================================================================
// Mock ports
//=========================================================================================

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<ExpenseRecord>>,
}

impl RecordingSink {
    fn records(&self) -> Vec<ExpenseRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn create_record(&self, record: &ExpenseRecord) -> PortResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl RecordSink for FailingSink {
    async fn create_record(&self, _record: &ExpenseRecord) -> PortResult<()> {
        Err(PortError::Unexpected("store is down".to_string()))
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

fn catalog() -> OptionCatalog {
    let mut schema = DatabaseSchema::default();
    schema.properties.insert(
        fields::CATEGORY.to_string(),
        PropertyKind::Select(vec![
            SelectOption::new("c-food", "Еда", "green"),
            SelectOption::new("c-move", "Транспорт", "blue"),
            SelectOption::new("c-misc", "Прочее", "purple"),
        ]),
    );
    schema.properties.insert(
        fields::SUBCATEGORY.to_string(),
        PropertyKind::Select(vec![
            SelectOption::new("s-groc", "Продукты", "green"),
            SelectOption::new("s-taxi", "Такси", "blue"),
            SelectOption::new("s-cafe", "Кафе", "green"),
            SelectOption::new("s-bus", "Автобус", "blue"),
        ]),
    );
    schema.properties.insert(
        fields::ACCOUNT.to_string(),
        PropertyKind::Select(vec![
            SelectOption::new("a-card", "Карта", "default"),
            SelectOption::new("a-cash", "Наличные", "gray"),
        ]),
    );
    OptionCatalog::from_schema(&schema)
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()))
}

fn flow_with(sink: Arc<dyn RecordSink>) -> SelectionFlow {
    SelectionFlow::new(Arc::new(catalog()), sink, clock())
}

const USER: UserId = UserId(42);

fn subcategory_ids(reply: &FlowReply) -> Vec<String> {
    match reply {
        FlowReply::ChooseSubcategory { choices, .. } => choices
            .iter()
            .map(|c| match &c.selection {
                Selection::Subcategory(id) => id.clone(),
                other => panic!("unexpected selection {other:?}"),
            })
            .collect(),
        other => panic!("expected subcategory prompt, got {other:?}"),
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn full_flow_creates_one_record_and_drops_the_session() {
    let sink = Arc::new(RecordingSink::default());
    let flow = flow_with(sink.clone());

    let reply = flow.start(USER, "3000.45 Такси до отеля USD").await.unwrap();
    match &reply {
        FlowReply::ChooseCategory { entry, choices } => {
            assert_eq!(entry.title, "Такси до отеля");
            assert_eq!(choices.len(), 3);
            assert_eq!(choices[1].selection, Selection::Category(1));
        }
        other => panic!("expected category prompt, got {other:?}"),
    }

    let reply = flow.choose(USER, Selection::Category(1)).await.unwrap();
    assert_eq!(subcategory_ids(&reply), vec!["s-taxi", "s-bus"]);

    let reply = flow
        .choose(USER, Selection::Subcategory("s-taxi".to_string()))
        .await
        .unwrap();
    assert!(matches!(reply, FlowReply::ChooseAccount { ref choices, .. } if choices.len() == 2));

    let reply = flow.choose(USER, Selection::Account(0)).await.unwrap();
    let FlowReply::Completed(record) = reply else {
        panic!("expected completion");
    };

    assert_eq!(record.amount, 3000.45);
    assert_eq!(record.title, "Такси до отеля");
    assert_eq!(record.currency, Currency::Usd);
    assert_eq!(record.category, "Транспорт");
    assert_eq!(record.subcategory, "Такси");
    assert_eq!(record.account, "Карта");
    assert_eq!(record.date.iso_date, "2026-10-19");
    assert_eq!(record.date.month_name, "Октябрь");
    assert_eq!(record.date.year, "2026");

    assert_eq!(sink.records(), vec![record]);
    assert!(flow.session(USER).await.is_none());
}

#[tokio::test]
async fn short_date_in_entry_drives_record_date() {
    let sink = Arc::new(RecordingSink::default());
    let flow = flow_with(sink.clone());

    flow.start(USER, "500 продукты 020225").await.unwrap();
    flow.choose(USER, Selection::Category(0)).await.unwrap();
    flow.choose(USER, Selection::Subcategory("s-cafe".to_string()))
        .await
        .unwrap();
    flow.choose(USER, Selection::Account(1)).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date.iso_date, "2025-02-02");
    assert_eq!(records[0].date.month_name, "Февраль");
    assert_eq!(records[0].currency, Currency::Rub);
}

#[tokio::test]
async fn presented_subcategories_match_the_category_color_exactly() {
    let flow = flow_with(Arc::new(RecordingSink::default()));
    let catalog = catalog();

    for (index, category) in catalog.categories.iter().enumerate() {
        flow.start(USER, "1 тест").await.unwrap();
        let expected: Vec<String> = catalog
            .subcategories
            .iter()
            .filter(|s| s.color == category.color)
            .map(|s| s.id.clone())
            .collect();

        match flow.choose(USER, Selection::Category(index)).await {
            Ok(reply) => assert_eq!(subcategory_ids(&reply), expected),
            Err(FlowError::NoMatchingSubcategories { category: name }) => {
                assert!(expected.is_empty());
                assert_eq!(name, category.name);
            }
            Err(e) => panic!("unexpected error {e}"),
        }
    }
}

#[tokio::test]
async fn empty_color_match_is_a_dead_end() {
    let flow = flow_with(Arc::new(RecordingSink::default()));
    flow.start(USER, "10 что-то").await.unwrap();

    let err = flow.choose(USER, Selection::Category(2)).await.unwrap_err();
    assert!(matches!(err, FlowError::NoMatchingSubcategories { .. }));
    assert!(err.is_recoverable());

    let session = flow.session(USER).await.unwrap();
    assert_eq!(session.step, Step::AwaitingCategory);
    assert_eq!(session.category.as_deref(), Some("Прочее"));

    let err = flow
        .choose(USER, Selection::Subcategory("s-groc".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::SelectionNotFound { .. }));
}

#[tokio::test]
async fn subcategories_with_oversized_ids_are_never_offered() {
    let long_id = "f".repeat(MAX_CALLBACK_BYTES);
    let mut schema = DatabaseSchema::default();
    schema.properties.insert(
        fields::CATEGORY.to_string(),
        PropertyKind::Select(vec![
            SelectOption::new("c-food", "Еда", "green"),
            SelectOption::new("c-misc", "Прочее", "purple"),
        ]),
    );
    schema.properties.insert(
        fields::SUBCATEGORY.to_string(),
        PropertyKind::Select(vec![
            SelectOption::new("s-groc", "Продукты", "green"),
            SelectOption::new(long_id.clone(), "Кафе", "green"),
            SelectOption::new(long_id.clone(), "Подарки", "purple"),
        ]),
    );
    let flow = SelectionFlow::new(
        Arc::new(OptionCatalog::from_schema(&schema)),
        Arc::new(RecordingSink::default()),
        clock(),
    );

    flow.start(USER, "10 что-то").await.unwrap();
    let err = flow.choose(USER, Selection::Category(1)).await.unwrap_err();
    assert!(matches!(err, FlowError::NoMatchingSubcategories { .. }));
    assert_eq!(flow.session(USER).await.unwrap().step, Step::AwaitingCategory);

    let reply = flow.choose(USER, Selection::Category(0)).await.unwrap();
    assert_eq!(subcategory_ids(&reply), vec!["s-groc"]);
}

#[tokio::test]
async fn invalid_positions_leave_state_unchanged() {
    let flow = flow_with(Arc::new(RecordingSink::default()));
    flow.start(USER, "10 обед").await.unwrap();

    let err = flow.choose(USER, Selection::Category(99)).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::SelectionNotFound { step: Step::AwaitingCategory, .. }
    ));
    assert_eq!(flow.session(USER).await.unwrap().step, Step::AwaitingCategory);

    flow.choose(USER, Selection::Category(0)).await.unwrap();
    flow.choose(USER, Selection::Subcategory("s-groc".to_string()))
        .await
        .unwrap();

    let err = flow.choose(USER, Selection::Account(5)).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::SelectionNotFound { step: Step::AwaitingAccount, .. }
    ));
    let session = flow.session(USER).await.unwrap();
    assert_eq!(session.step, Step::AwaitingAccount);
    assert!(session.account.is_none());
}

#[tokio::test]
async fn stale_subcategory_after_restart_is_not_found() {
    let flow = flow_with(Arc::new(RecordingSink::default()));

    flow.start(USER, "10 обед").await.unwrap();
    flow.choose(USER, Selection::Category(0)).await.unwrap();

    // User starts over and picks a different category.
    flow.start(USER, "20 такси").await.unwrap();
    flow.choose(USER, Selection::Category(1)).await.unwrap();

    // A button from the first keyboard (green) arrives late.
    let err = flow
        .choose(USER, Selection::Subcategory("s-groc".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FlowError::SelectionNotFound { step: Step::AwaitingSubcategory, ref key } if key == "s-groc"
    ));

    let session = flow.session(USER).await.unwrap();
    assert_eq!(session.entry.title, "такси");
    assert_eq!(session.step, Step::AwaitingSubcategory);
}

#[tokio::test]
async fn out_of_order_selection_is_not_found() {
    let flow = flow_with(Arc::new(RecordingSink::default()));
    flow.start(USER, "10 обед").await.unwrap();

    let err = flow.choose(USER, Selection::Account(0)).await.unwrap_err();
    assert!(matches!(err, FlowError::SelectionNotFound { .. }));
    assert!(flow.session(USER).await.unwrap().account.is_none());
}

#[tokio::test]
async fn selection_without_session_is_session_not_found() {
    let flow = flow_with(Arc::new(RecordingSink::default()));

    for selection in [
        Selection::Category(0),
        Selection::Subcategory("s-groc".to_string()),
        Selection::Account(0),
    ] {
        let err = flow.choose(USER, selection).await.unwrap_err();
        assert!(matches!(err, FlowError::SessionNotFound));
        assert!(err.is_recoverable());
    }
}

#[tokio::test]
async fn unparseable_text_creates_no_session() {
    let flow = flow_with(Arc::new(RecordingSink::default()));

    let err = flow.start(USER, "abc такси").await.unwrap_err();
    assert!(matches!(err, FlowError::InvalidEntry(_)));
    assert!(flow.session(USER).await.is_none());
}

#[tokio::test]
async fn unparseable_text_keeps_the_previous_session() {
    let flow = flow_with(Arc::new(RecordingSink::default()));
    flow.start(USER, "10 обед").await.unwrap();

    flow.start(USER, "обед").await.unwrap_err();
    assert_eq!(flow.session(USER).await.unwrap().entry.title, "обед");
}

#[tokio::test]
async fn sink_failure_still_destroys_the_session() {
    let flow = flow_with(Arc::new(FailingSink));

    flow.start(USER, "10 обед").await.unwrap();
    flow.choose(USER, Selection::Category(0)).await.unwrap();
    flow.choose(USER, Selection::Subcategory("s-cafe".to_string()))
        .await
        .unwrap();

    let err = flow.choose(USER, Selection::Account(0)).await.unwrap_err();
    assert!(matches!(err, FlowError::Sink(_)));
    assert!(!err.is_recoverable());
    assert!(flow.session(USER).await.is_none());

    // A second press of the same button has nothing left to act on.
    let err = flow.choose(USER, Selection::Account(0)).await.unwrap_err();
    assert!(matches!(err, FlowError::SessionNotFound));
}

#[tokio::test]
async fn cancel_drops_only_that_users_session() {
    let flow = flow_with(Arc::new(RecordingSink::default()));
    let other = UserId(7);

    flow.start(USER, "10 обед").await.unwrap();
    flow.start(other, "20 такси").await.unwrap();

    assert!(flow.cancel(USER).await);
    assert!(!flow.cancel(USER).await);
    assert!(flow.session(USER).await.is_none());
    assert!(flow.session(other).await.is_some());
}

#[tokio::test]
async fn interleaved_users_do_not_interfere() {
    let sink = Arc::new(RecordingSink::default());
    let flow = Arc::new(flow_with(sink.clone()));

    let run = |user: u64, text: &'static str, category: usize, subcategory: &'static str| {
        let flow = flow.clone();
        async move {
            let user = UserId(user);
            flow.start(user, text).await.unwrap();
            tokio::task::yield_now().await;
            flow.choose(user, Selection::Category(category)).await.unwrap();
            tokio::task::yield_now().await;
            flow.choose(user, Selection::Subcategory(subcategory.to_string()))
                .await
                .unwrap();
            flow.choose(user, Selection::Account(0)).await.unwrap()
        }
    };

    let (a, b) = futures::future::join(
        run(1, "10 обед", 0, "s-groc"),
        run(2, "20 такси", 1, "s-bus"),
    )
    .await;

    assert!(matches!(a, FlowReply::Completed(ref r) if r.subcategory == "Продукты"));
    assert!(matches!(b, FlowReply::Completed(ref r) if r.subcategory == "Автобус"));
    assert_eq!(sink.records().len(), 2);
}
