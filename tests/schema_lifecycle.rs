//! End-to-end behavior of the schema against file-backed databases

use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use wfmarket_store::storage::schema;
use wfmarket_store::{Error, Item, ItemModRank, ItemStatistic, ItemSubtype, MarketStore, OrderType};

fn temp_store() -> (tempfile::TempDir, std::path::PathBuf, MarketStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.db");
    let store = MarketStore::open(&path).unwrap();
    (dir, path, store)
}

fn populate(store: &mut MarketStore) {
    let item = Item::new("5a2feeb1c2c9e90cbdaa23d2", "Primed Continuity").with_type("mod");
    store.insert_item(&item).unwrap();
    store.insert_subtype(&ItemSubtype::new(&item.id, "basic")).unwrap();
    store.insert_mod_rank(&ItemModRank::new(&item.id, 0)).unwrap();
    store.insert_mod_rank(&ItemModRank::new(&item.id, 10)).unwrap();

    let stats: Vec<ItemStatistic> = (1..=3)
        .map(|day| {
            let at = Utc.with_ymd_and_hms(2023, 6, day, 0, 0, 0).unwrap();
            ItemStatistic::new(&item.id, at)
                .with_volume(day * 4)
                .with_prices(20.0, 60.0, 35.0, 34.2, 35.0)
                .with_order_type(OrderType::Closed)
                .with_mod_rank(10)
        })
        .collect();
    store.insert_statistics(&stats).unwrap();
}

#[test]
fn script_on_empty_database_yields_four_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");

    let conn = Connection::open(&path).unwrap();
    for stmt in schema::reset_statements() {
        conn.execute(stmt, []).unwrap();
    }
    drop(conn);

    let store = MarketStore::open_existing(&path).unwrap();
    assert_eq!(
        store.table_names().unwrap(),
        vec!["item_mod_ranks", "item_statistics", "item_subtypes", "items"]
    );
    let report = store.verify().unwrap();
    assert!(report.is_ok(), "{:?}", report.issues);
}

#[test]
fn child_rows_require_existing_item() {
    let (_dir, _path, store) = temp_store();

    assert!(matches!(
        store.insert_subtype(&ItemSubtype::new("absent", "intact")),
        Err(Error::ForeignKeyViolation(_))
    ));
    assert!(matches!(
        store.insert_mod_rank(&ItemModRank::new("absent", 3)),
        Err(Error::ForeignKeyViolation(_))
    ));
    assert!(store.stats().unwrap().is_empty());
}

#[test]
fn duplicate_subtype_is_rejected() {
    let (_dir, _path, store) = temp_store();
    store.insert_item(&Item::new("relic", "Lith A1 Relic")).unwrap();
    store.insert_subtype(&ItemSubtype::new("relic", "exceptional")).unwrap();

    let err = store.insert_subtype(&ItemSubtype::new("relic", "exceptional")).unwrap_err();
    assert!(matches!(err, Error::DuplicateKey(_)));
    assert!(err.is_constraint());
}

#[test]
fn order_type_outside_allowed_set_is_rejected() {
    let (_dir, _path, store) = temp_store();
    let insert = "INSERT INTO item_statistics
        (datetime, item_id, volume, min_price, max_price, avg_price, wa_price, median, order_type)
        VALUES ('2023-06-01 00:00:00+00:00', 'x', 1, 1, 1, 1, 1, 1, ?1)";

    for allowed in ["Buy", "Sell", "Closed"] {
        store.connection().execute(insert, [Some(allowed)]).unwrap();
    }
    store.connection().execute(insert, [None::<&str>]).unwrap();

    for rejected in ["buy", "Open", ""] {
        assert!(store.connection().execute(insert, [Some(rejected)]).is_err(), "{}", rejected);
    }
    assert_eq!(store.stats().unwrap().statistics, 4);
}

#[test]
fn orphaned_statistics_are_accepted() {
    let (_dir, _path, store) = temp_store();
    let at = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    store
        .insert_statistic(&ItemStatistic::new("never-registered", at).with_volume(1))
        .unwrap();

    let orphans = store.orphaned_statistics().unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].item_id, "never-registered");
}

#[test]
fn reset_destroys_populated_data() {
    let (_dir, path, mut store) = temp_store();
    populate(&mut store);
    let before = store.stats().unwrap();
    assert_eq!((before.items, before.subtypes, before.mod_ranks, before.statistics), (1, 1, 2, 3));
    drop(store);

    // data survives a plain reopen
    let mut store = MarketStore::open(&path).unwrap();
    assert_eq!(store.stats().unwrap(), before);

    store.reset().unwrap();
    assert!(store.stats().unwrap().is_empty());
    assert!(store.verify().unwrap().is_ok());

    // and the reset is repeatable
    store.reset().unwrap();
    assert_eq!(store.table_names().unwrap().len(), 4);
}

#[test]
fn reset_initializes_an_empty_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.db");
    std::fs::File::create(&path).unwrap();

    let mut store = MarketStore::open_existing(&path).unwrap();
    assert!(store.table_names().unwrap().is_empty());

    let discarded = store.reset().unwrap();
    assert!(discarded.is_empty());
    assert!(store.verify().unwrap().is_ok());
}

#[test]
fn reset_repairs_a_partially_created_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE items (id TEXT);
         INSERT INTO items (id) VALUES ('stale');",
    )
    .unwrap();
    drop(conn);

    let mut store = MarketStore::open_existing(&path).unwrap();
    assert!(!store.verify().unwrap().is_ok());

    let discarded = store.reset().unwrap();
    assert_eq!(discarded.items, 1);
    assert_eq!(discarded.total(), 1);

    let report = store.verify().unwrap();
    assert!(report.is_ok(), "{:?}", report.issues);
    assert!(store.stats().unwrap().is_empty());
}

#[test]
fn open_existing_does_not_create_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    assert!(MarketStore::open_existing(&path).is_err());
    assert!(!path.exists());
}
