//! User Table Tests
//!
//! End-to-end selects against an in-memory user table:
//! - scalar fields decode the most recent version
//! - time series are ordered most recent first
//! - map-type families decode into per-qualifier values
//! - a row with no cells decodes to defaults, not an error
//! - paged fields fetch lazily and are released explicitly

use chrono::{Duration, TimeZone, Utc};
use ohm::decode::{MapTimeSeries, MapValues, PagedColumn, PagedMap, RawCell, TimeSeries};
use ohm::entity::{ColumnDef, Entity, EntityDescriptor, ALL_VERSIONS};
use ohm::store::memory::MemoryStore;
use ohm::store::{KeySchema, KeyValue, TableLayout, TimeRange};
use ohm::Dao;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Default)]
struct User {
    login: String,
    full_name: String,
    zip_code: i32,
    zip_codes: TimeSeries<i32>,
    last_zip: RawCell<i32>,
    query_count: MapValues<i32>,
    query_history: MapTimeSeries<i32>,
    nickname: Option<String>,
}

impl Entity for User {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::<Self>::new("user_table")
            .entity_id("login", "login", |u| &mut u.login)
            .column("full_name", ColumnDef::new("info", "full_name"), |u| {
                &mut u.full_name
            })
            .column("zip_code", ColumnDef::new("info", "zip_code"), |u| {
                &mut u.zip_code
            })
            .column(
                "zip_codes",
                ColumnDef::new("info", "zip_code").max_versions(ALL_VERSIONS),
                |u| &mut u.zip_codes,
            )
            .column("last_zip", ColumnDef::new("info", "zip_code"), |u| {
                &mut u.last_zip
            })
            .column("query_count", ColumnDef::family("query_count"), |u| {
                &mut u.query_count
            })
            .column(
                "query_history",
                ColumnDef::family("query_count").all_versions(),
                |u| &mut u.query_history,
            )
            .column("nickname", ColumnDef::new("info", "nickname"), |u| {
                &mut u.nickname
            })
    }
}

#[derive(Debug, Default)]
struct UserPages {
    login: String,
    zip_pages: PagedColumn<i32>,
    query_pages: PagedMap<i32>,
}

impl Entity for UserPages {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::<Self>::new("user_table")
            .entity_id("login", "login", |u| &mut u.login)
            .column(
                "zip_pages",
                ColumnDef::new("info", "zip_code").all_versions().page_size(1),
                |u| &mut u.zip_pages,
            )
            .column(
                "query_pages",
                ColumnDef::family("query_count").all_versions().page_size(2),
                |u| &mut u.query_pages,
            )
    }
}

fn layout() -> TableLayout {
    TableLayout::new("user_table", KeySchema::strings(["login"]))
        .with_group_family("info", ["login", "full_name", "zip_code", "nickname"])
        .with_map_family("query_count")
}

fn store() -> MemoryStore {
    MemoryStore::builder()
        .with_table(layout())
        .with_row(["taton"])
        .with_family("info")
        .with_qualifier("login")
        .with_value("taton")
        .with_qualifier("full_name")
        .with_value("Aaron Kimball")
        .with_qualifier("zip_code")
        .with_value_at(1, 94110)
        .with_value_at(2, 94131)
        .with_family("query_count")
        .with_qualifier("hello")
        .with_value_at(1, 20)
        .with_value_at(2, 30)
        .with_qualifier("world")
        .with_value_at(1, 40)
        .with_row(["ghost"])
        .build()
        .unwrap()
}

fn key(login: &str) -> Vec<KeyValue> {
    vec![KeyValue::from(login)]
}

// =============================================================================
// Single-row Select Tests
// =============================================================================

/// Scalar fields decode the most recent version.
#[test]
fn test_scalar_is_most_recent_version() {
    let dao = Dao::new(store());
    let user: User = dao.select(&key("taton")).unwrap();

    assert_eq!(user.login, "taton");
    assert_eq!(user.full_name, "Aaron Kimball");
    assert_eq!(user.zip_code, 94131);
    assert_eq!(user.last_zip.timestamp(), Some(2));
    assert_eq!(user.last_zip.value(), Some(&94131));
}

/// Raw cells expose their write time as an instant.
#[test]
fn test_raw_cell_write_time() {
    let written = Utc.with_ymd_and_hms(2013, 6, 26, 18, 53, 30).unwrap();
    let store = MemoryStore::builder()
        .with_table(layout())
        .with_row(["taton"])
        .with_family("info")
        .with_qualifier("zip_code")
        .with_value_at(written.timestamp_millis(), 94110)
        .build()
        .unwrap();
    let dao = Dao::new(store);

    let user: User = dao.select(&key("taton")).unwrap();
    assert_eq!(user.last_zip.written_at(), Some(written));

    let range = TimeRange::between(written + Duration::seconds(1), Utc::now());
    let later: User = dao.select_in_range(&key("taton"), range).unwrap();
    assert!(later.last_zip.is_empty());
    assert_eq!(later.last_zip.written_at(), None);
}

/// Time series hold every version, most recent first.
#[test]
fn test_time_series_most_recent_first() {
    let dao = Dao::new(store());
    let user: User = dao.select(&key("taton")).unwrap();

    let cells: Vec<(i64, i32)> = user.zip_codes.iter().map(|(ts, v)| (ts, *v)).collect();
    assert_eq!(cells, vec![(2, 94131), (1, 94110)]);

    let timestamps = user.zip_codes.timestamps();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));
}

/// Map-type families decode one value per qualifier.
#[test]
fn test_map_family_values() {
    let dao = Dao::new(store());
    let user: User = dao.select(&key("taton")).unwrap();

    assert_eq!(user.query_count.len(), 2);
    assert_eq!(user.query_count.get("hello"), Some(&30));
    assert_eq!(user.query_count.get("world"), Some(&40));

    let hello = &user.query_history["hello"];
    assert_eq!(hello.timestamps(), vec![2, 1]);
    assert_eq!(hello.get(1), Some(&20));
    assert_eq!(user.query_history["world"].len(), 1);
}

/// A row with no cells decodes to defaults.
#[test]
fn test_empty_row_yields_defaults() {
    let dao = Dao::new(store());

    for login in ["ghost", "never_written"] {
        let user: User = dao.select(&key(login)).unwrap();
        assert_eq!(user.login, login);
        assert_eq!(user.full_name, "");
        assert_eq!(user.zip_code, 0);
        assert!(user.zip_codes.is_empty());
        assert!(user.last_zip.is_empty());
        assert!(user.query_count.is_empty());
        assert!(user.query_history.is_empty());
        assert_eq!(user.nickname, None);
    }
}

/// The time range bounds which versions are visible.
#[test]
fn test_time_range_limits_versions() {
    let dao = Dao::new(store());
    let user: User = dao
        .select_in_range(&key("taton"), TimeRange::new(0, 2))
        .unwrap();

    assert_eq!(user.zip_code, 94110);
    assert_eq!(user.zip_codes.timestamps(), vec![1]);
    assert_eq!(user.query_count.get("hello"), Some(&20));
}

/// Repeated lookups return the same spec.
#[test]
fn test_spec_lookup_is_idempotent() {
    let dao = Dao::new(store());
    let first = dao.spec::<User>().unwrap();
    let second = dao.spec::<User>().unwrap();

    assert_eq!(*first, *second);
    assert_eq!(dao.metrics().snapshot().specs_built, 1);

    let rebuilt = ohm::EntitySpec::<User>::for_entity(&layout()).unwrap();
    assert_eq!(*first, rebuilt);
}

// =============================================================================
// Paged Field Tests
// =============================================================================

/// Paged fields fetch one page at a time and hold a cursor until released.
#[test]
fn test_paged_fields_fetch_lazily() {
    let store = store();
    let dao = Dao::new(store.clone());

    let mut pages: UserPages = dao.select(&key("taton")).unwrap();
    assert_eq!(store.open_cursors(), 2);
    assert_eq!(store.pages_fetched(), 0);

    let first = pages.zip_pages.next().unwrap().unwrap();
    assert_eq!((first.timestamp, first.value), (2, 94131));
    assert_eq!(store.pages_fetched(), 1);

    let cells: Vec<(String, i64, i32)> = pages
        .query_pages
        .by_ref()
        .map(|cell| cell.map(|c| (c.qualifier, c.timestamp, c.value)))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        cells,
        vec![
            ("hello".to_string(), 2, 30),
            ("hello".to_string(), 1, 20),
            ("world".to_string(), 1, 40),
        ]
    );

    assert_eq!(dao.release_entity(&mut pages).unwrap(), 2);
    assert_eq!(store.open_cursors(), 0);
    assert!(!pages.zip_pages.is_open());

    let snapshot = dao.metrics().snapshot();
    assert_eq!(snapshot.paged_fields_released, 2);
    assert_eq!(snapshot.release_failures, 0);
}

/// A paged column can be read as bare values.
#[test]
fn test_paged_column_values() {
    let store = store();
    let dao = Dao::new(store.clone());

    let mut pages: UserPages = dao.select(&key("taton")).unwrap();
    let zips: Vec<i32> = pages
        .zip_pages
        .values()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(zips, vec![94131, 94110]);
    assert_eq!(store.pages_fetched(), 2);

    assert_eq!(dao.release_entity(&mut pages).unwrap(), 2);
    assert_eq!(store.open_cursors(), 0);
}

/// Releasing twice is a no-op the second time.
#[test]
fn test_release_is_idempotent() {
    let store = store();
    let dao = Dao::new(store.clone());

    let mut pages: UserPages = dao.select(&key("taton")).unwrap();
    assert_eq!(dao.release_entity(&mut pages).unwrap(), 2);
    assert_eq!(dao.release_entity(&mut pages).unwrap(), 0);
    assert_eq!(store.open_cursors(), 0);
}

#[derive(Debug, Default)]
struct MixedVersions {
    zip_codes: TimeSeries<i32>,
    zip_pages: PagedColumn<i32>,
    query_history: MapTimeSeries<i32>,
    query_pages: PagedMap<i32>,
}

impl Entity for MixedVersions {
    fn describe() -> EntityDescriptor<Self> {
        EntityDescriptor::<Self>::new("user_table")
            .column(
                "zip_codes",
                ColumnDef::new("info", "zip_code").all_versions(),
                |m| &mut m.zip_codes,
            )
            .column(
                "zip_pages",
                ColumnDef::new("info", "zip_code").page_size(1),
                |m| &mut m.zip_pages,
            )
            .column(
                "query_history",
                ColumnDef::family("query_count").all_versions(),
                |m| &mut m.query_history,
            )
            .column(
                "query_pages",
                ColumnDef::family("query_count").page_size(1),
                |m| &mut m.query_pages,
            )
    }
}

/// A paged field keeps its own version bound when another field reads
/// more versions of the same column or family.
#[test]
fn test_paged_fields_keep_own_version_bound() {
    let dao = Dao::new(store());
    let mut mixed: MixedVersions = dao.select(&key("taton")).unwrap();

    assert_eq!(mixed.zip_codes.timestamps(), vec![2, 1]);
    let zips: Vec<i64> = mixed
        .zip_pages
        .by_ref()
        .map(|cell| cell.map(|c| c.timestamp))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(zips, vec![2]);

    assert_eq!(mixed.query_history["hello"].timestamps(), vec![2, 1]);
    let queries: Vec<(String, i64)> = mixed
        .query_pages
        .by_ref()
        .map(|cell| cell.map(|c| (c.qualifier, c.timestamp)))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        queries,
        vec![("hello".to_string(), 2), ("world".to_string(), 1)]
    );

    assert_eq!(dao.release_entity(&mut mixed).unwrap(), 2);
}
