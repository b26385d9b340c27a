use mapcell_core::Mapping;
use mapcell_deferred::{CellConfig, CellError, ChangeKind, DeferredMapCell};
use mapcell_merge::MergeKind;
use mapcell_test_utils::{init_test_tracing, keys_of, string_mapping, xy_mapping};
use mapcell_view::MapView;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn shared_cell(initial: Mapping<String, i32>) -> Rc<DeferredMapCell<String, i32>> {
    Rc::new(DeferredMapCell::new("numbers").with_value(initial))
}

#[test]
fn test_put_remove_clear_scenario() {
    init_test_tracing();
    let cell = shared_cell(xy_mapping());
    let mut view = MapView::new(Rc::clone(&cell));

    assert_eq!(view.insert("z".to_string(), 3).unwrap(), None);
    assert_eq!(
        cell.resolve().unwrap(),
        string_mapping(&[("x", 1), ("y", 2), ("z", 3)])
    );
    assert_eq!(keys_of(&cell.resolve().unwrap()), vec!["x", "y", "z"]);

    assert_eq!(view.remove("y").unwrap(), Some(2));
    assert_eq!(cell.resolve().unwrap(), string_mapping(&[("x", 1), ("z", 3)]));
    assert_eq!(keys_of(&cell.resolve().unwrap()), vec!["x", "z"]);

    view.clear().unwrap();
    assert!(cell.resolve().unwrap().is_empty());
}

#[test]
fn test_every_write_is_tracked_by_cell() {
    let cell = shared_cell(xy_mapping());
    let mut view = MapView::new(Rc::clone(&cell));

    view.insert("z".to_string(), 3).unwrap();
    view.remove("x").unwrap();
    view.put_all([("w".to_string(), 4)]).unwrap();
    view.clear().unwrap();

    let kinds: Vec<_> = cell.history().into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChangeKind::Replaced { entries: 3 },
            ChangeKind::Replaced { entries: 2 },
            ChangeKind::Merged { entries: 1 },
            ChangeKind::Cleared,
        ]
    );
}

#[test]
fn test_listeners_see_single_entry_writes() {
    let cell = shared_cell(Mapping::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    cell.subscribe(move |event| sink.borrow_mut().push(event.sequence));

    let mut view = MapView::new(Rc::clone(&cell));
    view.insert("a".to_string(), 1).unwrap();
    view.insert("a".to_string(), 2).unwrap();

    assert_eq!(*seen.borrow(), vec![1, 2]);
}

#[test]
fn test_put_all_on_empty() {
    let cell = shared_cell(Mapping::new());
    let mut view = MapView::new(Rc::clone(&cell));

    view.put_all([("a".to_string(), 1), ("b".to_string(), 2)]).unwrap();
    assert_eq!(view.get("a").unwrap(), Some(1));
    assert_eq!(view.get("b").unwrap(), Some(2));
}

#[test]
fn test_put_all_uses_cell_merge_semantics() {
    let cell: Rc<DeferredMapCell<String, i32>> = Rc::new(
        DeferredMapCell::from_config(CellConfig::new("hits").with_merge(MergeKind::Additive))
            .with_value(string_mapping(&[("get", 1)])),
    );
    let mut view = MapView::new(Rc::clone(&cell));

    view.put_all([("get".to_string(), 2), ("put".to_string(), 5)]).unwrap();
    assert_eq!(view.get("get").unwrap(), Some(3));

    // single-entry writes are plain overwrites regardless of merge semantics
    assert_eq!(view.insert("get".to_string(), 10).unwrap(), Some(3));
    assert_eq!(view.get("get").unwrap(), Some(10));
}

#[test]
fn test_double_put_returns_first_value() {
    let mut view = MapView::new(shared_cell(Mapping::new()));
    assert_eq!(view.insert("k".to_string(), 1).unwrap(), None);
    assert_eq!(view.insert("k".to_string(), 2).unwrap(), Some(1));
    assert_eq!(view.get("k").unwrap(), Some(2));
    assert_eq!(view.len().unwrap(), 1);
}

#[test]
fn test_clear_uses_cell_definition_of_empty() {
    let cell = shared_cell(xy_mapping());
    cell.set_convention(string_mapping(&[("default", 0)])).unwrap();
    let mut view = MapView::new(Rc::clone(&cell));

    view.clear().unwrap();
    assert!(view.entries().unwrap().is_empty());
    assert!(!view.contains_key("x").unwrap());
    assert!(!view.contains_key("default").unwrap());
    assert_eq!(
        cell.history().last().map(|e| e.kind.clone()),
        Some(ChangeKind::Cleared)
    );
}

#[test]
fn test_reads_follow_lazy_provider() {
    let upstream = shared_cell(xy_mapping());
    let derived = shared_cell(Mapping::new());
    let source = Rc::clone(&upstream);
    derived
        .set_provider(move || {
            Ok(source
                .resolve()?
                .into_iter()
                .map(|(k, v)| (k, v * 10))
                .collect())
        })
        .unwrap();

    let view = MapView::new(Rc::clone(&derived));
    assert_eq!(view.get("y").unwrap(), Some(20));

    MapView::new(Rc::clone(&upstream))
        .insert("y".to_string(), 5)
        .unwrap();
    assert_eq!(view.get("y").unwrap(), Some(50));
}

#[test]
fn test_write_through_view_materializes_provider() {
    let cell = shared_cell(Mapping::new());
    cell.set_provider(|| Ok(string_mapping(&[("p", 1)]))).unwrap();

    let mut view = MapView::new(Rc::clone(&cell));
    view.insert("q".to_string(), 2).unwrap();

    assert_eq!(keys_of(&cell.resolve().unwrap()), vec!["p", "q"]);
}

#[test]
fn test_missing_value_is_surfaced_unchanged() {
    let cell = shared_cell(xy_mapping());
    cell.unset().unwrap();
    let mut view = MapView::new(Rc::clone(&cell));

    assert!(matches!(view.get("x"), Err(CellError::Missing { .. })));
    assert!(matches!(
        view.insert("x".to_string(), 1),
        Err(CellError::Missing { .. })
    ));
    assert_eq!(cell.change_count(), 1);
}

#[test]
fn test_provider_failure_is_surfaced_unchanged() {
    let cell = shared_cell(Mapping::new());
    cell.set_provider(|| Err(CellError::provider("registry offline")))
        .unwrap();
    let mut view = MapView::new(Rc::clone(&cell));

    assert_eq!(
        view.remove("x").unwrap_err(),
        CellError::Provider("registry offline".to_string())
    );
}

#[test]
fn test_rejected_write_leaves_value() {
    let cell = Rc::new(
        DeferredMapCell::<String, i32>::new("ports")
            .with_value(xy_mapping())
            .with_validator(|k, _| {
                if k.is_empty() {
                    Err("empty key".to_string())
                } else {
                    Ok(())
                }
            }),
    );
    let mut view = MapView::new(Rc::clone(&cell));

    let err = view.insert(String::new(), 9).unwrap_err();
    assert!(matches!(err, CellError::Rejected { .. }));
    assert_eq!(cell.resolve().unwrap(), xy_mapping());
    assert_eq!(cell.change_count(), 0);
}

#[test]
fn test_rejected_merge_keeps_cell_readable() {
    let cell = Rc::new(
        DeferredMapCell::<String, i32>::from_config(
            CellConfig::new("caps").with_merge(MergeKind::Additive),
        )
        .with_validator(|_, v| {
            if *v > 100 {
                Err("over 100".to_string())
            } else {
                Ok(())
            }
        }),
    );
    let mut view = MapView::new(Rc::clone(&cell));

    view.put_all([("a".to_string(), 60)]).unwrap();
    assert!(matches!(
        view.put_all([("a".to_string(), 60)]),
        Err(CellError::Rejected { .. })
    ));

    assert_eq!(view.get("a").unwrap(), Some(60));
    assert_eq!(view.insert("b".to_string(), 1).unwrap(), None);
    assert!(cell.is_present().unwrap());
}

#[test]
fn test_finalized_cell_refuses_view_writes() {
    let cell = shared_cell(xy_mapping());
    cell.finalize_value().unwrap();
    let mut view = MapView::new(Rc::clone(&cell));

    assert_eq!(view.get("x").unwrap(), Some(1));
    assert!(matches!(
        view.insert("z".to_string(), 3),
        Err(CellError::Finalized { .. })
    ));
    assert!(matches!(view.clear(), Err(CellError::Finalized { .. })));
    assert!(matches!(
        view.put_all([("z".to_string(), 3)]),
        Err(CellError::Finalized { .. })
    ));
}

#[test]
fn test_two_views_share_one_cell() {
    let cell = shared_cell(Mapping::new());
    let mut first = MapView::new(Rc::clone(&cell));
    let second = first.clone();

    first.insert("a".to_string(), 1).unwrap();
    assert_eq!(second.get("a").unwrap(), Some(1));
}

#[test]
fn test_entries_snapshot_is_not_live() {
    let cell = shared_cell(xy_mapping());
    let mut view = MapView::new(Rc::clone(&cell));

    let before = view.entries().unwrap();
    view.remove("x").unwrap();

    assert!(before.contains_key("x"));
    assert!(!view.contains_key("x").unwrap());
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn mapping_strategy() -> impl Strategy<Value = Mapping<String, i32>> {
    prop::collection::vec((key_strategy(), any::<i32>()), 0..12)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_insert_new_key_appends(initial in mapping_strategy(), key in key_strategy(), value in any::<i32>()) {
        prop_assume!(!initial.contains_key(&key));
        let cell = shared_cell(initial.clone());
        let mut view = MapView::new(Rc::clone(&cell));

        prop_assert_eq!(view.insert(key.clone(), value).unwrap(), None);
        prop_assert_eq!(view.get(&key).unwrap(), Some(value));
        prop_assert_eq!(view.len().unwrap(), initial.len() + 1);

        let after = view.keys().unwrap();
        let expected: Vec<String> = initial.keys().cloned().chain(std::iter::once(key)).collect();
        prop_assert_eq!(after, expected);
    }

    #[test]
    fn prop_remove_returns_observed_value(initial in mapping_strategy(), key in key_strategy()) {
        let cell = shared_cell(initial.clone());
        let mut view = MapView::new(Rc::clone(&cell));

        let observed = view.get(&key).unwrap();
        let removed = view.remove(&key).unwrap();

        prop_assert_eq!(removed, observed);
        prop_assert!(!view.contains_key(&key).unwrap());

        let expected: Vec<String> = initial.keys().filter(|k| **k != key).cloned().collect();
        prop_assert_eq!(view.keys().unwrap(), expected);
    }

    #[test]
    fn prop_clear_empties_everything(initial in mapping_strategy()) {
        let cell = shared_cell(initial.clone());
        let mut view = MapView::new(Rc::clone(&cell));

        view.clear().unwrap();
        for key in initial.keys() {
            prop_assert!(!view.contains_key(key).unwrap());
        }
        prop_assert!(view.entries().unwrap().is_empty());
    }
}
