//! Table controller scenarios against a failure-injecting store

use grid_core::{
    GridConfig, GridError, Navigator, Notifier, PageAction, PageRef, RefreshBus, RefreshEvent,
    RowAction, TableController, Toast, ToastVariant,
};
use grid_reconcile::{ReconcileError, ReconcilerState};
use grid_store::{FieldMap, FieldValue, RecordId, SortDirection, StoreError};
use grid_test_utils::{acme_and_box_co, names, numbered_accounts, FakeStore};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    fn last(&self) -> Option<Toast> {
        self.toasts.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

#[derive(Debug, Default)]
struct RecordingNavigator {
    visits: Mutex<Vec<PageRef>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: PageRef) {
        self.visits.lock().unwrap().push(target);
    }
}

struct Harness {
    store: Arc<FakeStore>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
    table: TableController,
}

fn harness_with(config: GridConfig, records: Vec<grid_store::Record>) -> Harness {
    let store = Arc::new(FakeStore::new(records));
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let table = TableController::new(config, store.clone(), notifier.clone(), navigator.clone())
        .unwrap();
    Harness {
        store,
        notifier,
        navigator,
        table,
    }
}

fn harness() -> Harness {
    harness_with(GridConfig::default(), acme_and_box_co())
}

#[tokio::test]
async fn search_narrows_rows() {
    let mut h = harness();
    h.table.load().await.unwrap();
    assert_eq!(names(h.table.visible_rows()), vec!["Acme", "Box Co"]);

    h.table.search("Ac").await.unwrap();
    assert_eq!(names(h.table.visible_rows()), vec!["Acme"]);
    assert_eq!(h.store.fetch_calls(), 2);
}

#[tokio::test]
async fn local_filter_does_not_fetch() {
    let mut h = harness();
    h.table.load().await.unwrap();

    h.table.set_filter("Box");
    assert_eq!(names(h.table.visible_rows()), vec!["Box Co"]);
    // default matching is case-sensitive
    h.table.set_filter("box");
    assert_eq!(h.table.visible_rows().len(), 0);
    assert_eq!(h.table.view().total_pages(), 0);
    assert_eq!(h.store.fetch_calls(), 1);
}

#[tokio::test]
async fn sort_descending_reloads() {
    let mut h = harness();
    h.table.load().await.unwrap();

    h.table.sort_by("Name", SortDirection::Descending).await.unwrap();
    assert_eq!(names(h.table.visible_rows()), vec!["Box Co", "Acme"]);
    assert_eq!(h.store.fetch_calls(), 2);
}

#[tokio::test]
async fn failed_load_keeps_prior_rows() {
    let mut h = harness();
    h.table.load().await.unwrap();
    h.store.fail_fetches("service unavailable");

    let err = h.table.load().await.unwrap_err();
    assert!(matches!(err, GridError::Store(StoreError::Transport(_))));
    assert!(err.is_retryable());
    assert_eq!(h.table.view().total_count(), 2);
    assert_eq!(h.table.last_error(), Some("service unavailable"));
    assert_eq!(h.notifier.last().unwrap().variant, ToastVariant::Error);

    h.store.heal();
    h.table.load().await.unwrap();
    assert_eq!(h.table.last_error(), None);
}

#[tokio::test]
async fn saved_edit_is_visible_after_reload() {
    let mut h = harness();
    h.table.load().await.unwrap();
    h.table.stage_cell_edit("1", "Name", "Acme2").unwrap();

    let report = h.table.save_drafts().await.unwrap();
    assert!(report.refresh_needed);
    assert_eq!(h.table.reconciler().state(), ReconcilerState::Idle);
    assert_eq!(h.table.reconciler().staged_count(), 0);
    assert_eq!(names(h.table.visible_rows()), vec!["Acme2", "Box Co"]);
    assert_eq!(h.notifier.last().unwrap().variant, ToastVariant::Success);
}

#[tokio::test]
async fn rejected_sibling_fails_batch_without_reload() {
    let mut h = harness();
    h.table.load().await.unwrap();
    h.store.reject_updates_for("2", "Name is locked");

    h.table.stage_cell_edit("1", "Name", "X").unwrap();
    h.table.stage_cell_edit("2", "Name", "Y").unwrap();
    let err = h.table.save_drafts().await.unwrap_err();

    match err {
        GridError::Reconcile(ReconcileError::Store(StoreError::BatchUpdate {
            record_id, ..
        })) => assert_eq!(record_id, RecordId::from("2")),
        other => panic!("expected BatchUpdate, got {other:?}"),
    }

    let toast = h.notifier.last().unwrap();
    assert_eq!(toast.title, "Error updating or reloading records");
    assert_eq!(toast.message, "Name is locked");

    // the view still shows the last fetched rows until an explicit reload
    assert_eq!(names(h.table.visible_rows()), vec!["Acme", "Box Co"]);
    assert_eq!(h.store.fetch_calls(), 1);
    assert_eq!(h.table.reconciler().state(), ReconcilerState::Idle);
    assert_eq!(h.table.reconciler().staged_count(), 0);

    h.table.load().await.unwrap();
    assert_eq!(names(h.table.visible_rows()), vec!["Box Co", "X"]);
}

#[tokio::test]
async fn id_column_is_not_editable() {
    let mut h = harness();
    h.table.load().await.unwrap();

    let err = h.table.stage_cell_edit("1", "Id", "x").unwrap_err();
    assert!(matches!(
        err,
        GridError::Reconcile(ReconcileError::ReadOnlyField(_))
    ));
    assert!(err.is_user_error());
    assert_eq!(h.table.reconciler().staged_count(), 0);
}

#[tokio::test]
async fn paging_clamps_after_search() {
    let config = GridConfig::default().with_page_size(10);
    let mut h = harness_with(config, numbered_accounts(25));
    h.table.load().await.unwrap();
    assert_eq!(h.table.view().total_pages(), 3);

    h.table.last_page();
    assert_eq!(h.table.visible_rows().len(), 5);
    assert!(!h.table.next_page());
    assert!(h.table.previous_page());
    assert_eq!(h.table.view().page_number(), 1);
    assert!(matches!(h.table.go_to_page(3), Err(GridError::View(_))));

    h.table.go_to_page(2).unwrap();
    h.table.search("Account 00").await.unwrap();
    assert_eq!(h.table.view().page_number(), 0);
    assert_eq!(h.table.visible_rows().len(), 10);
}

#[tokio::test]
async fn row_actions_navigate_and_delete() {
    let mut h = harness();
    h.table.load().await.unwrap();

    h.table.handle_row_action("1", RowAction::View).await.unwrap();
    h.table.handle_row_action("2", RowAction::Edit).await.unwrap();
    h.table.add_new_record();
    let visits = h.navigator.visits.lock().unwrap().clone();
    assert_eq!(
        visits,
        vec![
            PageRef::view(RecordId::from("1")),
            PageRef::edit(RecordId::from("2")),
            PageRef::new_record(),
        ]
    );
    assert_eq!(visits[2].action, PageAction::New);

    h.table.handle_row_action("1", RowAction::Delete).await.unwrap();
    assert_eq!(names(h.table.visible_rows()), vec!["Box Co"]);
    assert_eq!(h.table.active_record(), None);
}

#[tokio::test]
async fn create_requires_display_field() {
    let mut h = harness();
    h.table.load().await.unwrap();

    let mut fields = FieldMap::new();
    fields.insert("BillingCity".into(), FieldValue::from("Paris"));
    let err = h.table.create_record(fields.clone()).await.unwrap_err();
    assert!(matches!(err, GridError::Store(StoreError::Rejected(_))));
    assert_eq!(h.notifier.last().unwrap().title, "Error creating record");

    fields.insert("Name".into(), FieldValue::from("Candle Ltd"));
    let id = h.table.create_record(fields).await.unwrap();
    assert!(h.table.view().get(&id).is_some());
    assert_eq!(names(h.table.visible_rows()), vec!["Acme", "Box Co", "Candle Ltd"]);
}

#[tokio::test]
async fn delete_selected_counts_known_ids() {
    let mut h = harness();
    h.table.load().await.unwrap();

    let removed = h
        .table
        .delete_selected(&[RecordId::from("1"), RecordId::from("missing")])
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(h.table.view().total_count(), 1);
    assert_eq!(h.table.delete_selected(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn refresh_events_reload_only_the_active_record() {
    let mut h = harness();
    h.table.load().await.unwrap();
    let bus = RefreshBus::new(h.table.config().refresh_channel.clone(), 16);
    let mut subscription = bus.subscribe();

    h.table.handle_row_action("2", RowAction::Edit).await.unwrap();
    bus.publish(RefreshEvent::new("1"));
    bus.publish(RefreshEvent::new("2"));

    let reloads = h.table.drain_refresh_events(&mut subscription).await.unwrap();
    assert_eq!(reloads, 1);
    assert_eq!(h.table.active_record(), None);
    assert_eq!(h.store.fetch_calls(), 2);

    let handled = h
        .table
        .handle_refresh_event(&RefreshEvent::new("2"))
        .await
        .unwrap();
    assert!(!handled);
}

#[tokio::test(start_paused = true)]
async fn stalled_update_times_out() {
    let config = GridConfig::default().with_store_timeout_ms(50);
    let mut h = harness_with(config, acme_and_box_co());
    h.table.load().await.unwrap();
    h.store.hold_updates();

    h.table.stage_cell_edit("1", "Name", "Acme2").unwrap();
    let err = h.table.save_drafts().await.unwrap_err();

    assert!(err.is_retryable());
    assert!(err.message().contains("timed out after 50ms"), "{}", err.message());
    assert_eq!(h.table.reconciler().state(), ReconcilerState::Idle);
    assert!(h
        .notifier
        .toasts()
        .iter()
        .any(|t| t.variant == ToastVariant::Error));
}
