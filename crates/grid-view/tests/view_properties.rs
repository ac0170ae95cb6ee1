//! Property tests for the filtered view.
//!
//! These pin the observable contract of filter, sort, refresh and page
//! clamping over arbitrary record sets.

use chrono::NaiveDate;
use grid_store::{FieldValue, Record, SortDirection};
use grid_view::{FilteredView, ViewConfig};
use proptest::prelude::*;
use std::cmp::Ordering;

/// Values of one column mixing every kind, so sorting crosses kinds
fn cell_strategy() -> impl Strategy<Value = Option<FieldValue>> {
    prop::option::of(prop_oneof![
        Just(FieldValue::Null),
        (0u32..50).prop_map(|n| FieldValue::from(f64::from(n))),
        "[0-9][0-9a]{0,2}".prop_map(FieldValue::from),
        (1u32..28).prop_map(|d| FieldValue::from(NaiveDate::from_ymd_opt(2024, 2, d).unwrap())),
    ])
}

fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(("[A-Ca-c ]{0,6}", cell_strategy()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, employees))| {
                let record = Record::new(format!("{i:04}")).with_field("Name", name);
                match employees {
                    Some(value) => record.with_field("Employees", value),
                    None => record,
                }
            })
            .collect()
    })
}

fn direction_strategy() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
}

fn view_of(records: Vec<Record>, page_size: usize) -> FilteredView {
    let mut view = FilteredView::new(ViewConfig::new().with_page_size(page_size)).unwrap();
    view.refresh(records).unwrap();
    view
}

fn snapshot(view: &FilteredView) -> (usize, usize, Vec<String>) {
    (
        view.total_count(),
        view.total_pages(),
        view.visible_page().map(|r| r.id.to_string()).collect(),
    )
}

proptest! {
    #[test]
    fn prop_filter_only_keeps_matches(records in records_strategy(), filter in "[A-Ca-c ]{0,2}") {
        let mut view = view_of(records, 7);
        view.set_filter(filter.clone());

        for record in view.filtered() {
            let name = record.text_of("Name").unwrap_or_default();
            prop_assert!(name.contains(filter.as_str()));
        }
        let all_visible_match = view.visible_page().all(|r| {
            r.text_of("Name").unwrap_or_default().contains(filter.as_str())
        });
        prop_assert!(all_visible_match);
    }

    #[test]
    fn prop_sort_is_monotone(
        records in records_strategy(),
        field in prop_oneof![Just("Name"), Just("Employees"), Just("Id")],
        direction in direction_strategy(),
    ) {
        let mut view = view_of(records, 5);
        view.set_sort(field, direction).unwrap();

        let sorted: Vec<&Record> = view.filtered().collect();
        for pair in sorted.windows(2) {
            let ord = pair[0].compare_on(pair[1], field);
            match direction {
                SortDirection::Ascending => prop_assert_ne!(ord, Ordering::Greater),
                SortDirection::Descending => prop_assert_ne!(ord, Ordering::Less),
            }
        }
    }

    #[test]
    fn prop_refresh_is_idempotent(records in records_strategy(), filter in "[A-C]{0,1}", pages in 0usize..4) {
        let mut view = view_of(records.clone(), 4);
        view.set_filter(filter);
        for _ in 0..pages {
            view.next_page();
        }

        view.refresh(records.clone()).unwrap();
        let first = snapshot(&view);
        view.refresh(records).unwrap();
        let second = snapshot(&view);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_page_never_empty_unless_no_rows(
        before in records_strategy(),
        after in records_strategy(),
        page_size in 1usize..8,
    ) {
        let mut view = view_of(before, page_size);
        view.last_page();

        view.refresh(after).unwrap();

        let visible = view.visible_page().len();
        prop_assert_eq!(visible == 0, view.total_count() == 0);
        prop_assert_eq!(view.total_pages(), view.total_count().div_ceil(page_size));
        prop_assert!(view.page().offset() <= view.total_count().saturating_sub(1));
    }
}

#[test]
fn mixed_column_sorts_by_kind_then_value() {
    let records: Vec<Record> = (0..200)
        .map(|i| {
            let score = if i % 3 == 0 {
                FieldValue::from(format!("{}a", i % 17))
            } else {
                FieldValue::from(f64::from(i % 23))
            };
            Record::new(format!("{i:04}")).with_field("Score", score)
        })
        .collect();
    let mut view = view_of(records, 10);

    view.set_sort("Score", SortDirection::Ascending).unwrap();

    let sorted: Vec<&Record> = view.filtered().collect();
    let first_text = sorted
        .iter()
        .position(|r| matches!(r.get("Score"), Some(FieldValue::Text(_))))
        .unwrap();
    assert!(sorted[..first_text]
        .iter()
        .all(|r| matches!(r.get("Score"), Some(FieldValue::Number(_)))));
    assert!(sorted[first_text..]
        .iter()
        .all(|r| matches!(r.get("Score"), Some(FieldValue::Text(_)))));
    assert!(sorted
        .windows(2)
        .all(|pair| pair[0].compare_on(pair[1], "Score") != Ordering::Greater));
}
