//! Integration tests for `SqliteStore` against in-memory databases.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use inat_core::{
  entity::Entity,
  row::{MappedRow, map_row},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Map `rows` for `entity` and split them into batches of `size`.
fn batches(
  entity: Entity,
  rows: &[&[&str]],
  size: usize,
) -> std::vec::IntoIter<inat_core::Result<Vec<MappedRow>>> {
  let mapped: Vec<MappedRow> = rows
    .iter()
    .map(|r| map_row(entity.columns(), r.iter().copied()).unwrap())
    .collect();
  mapped
    .chunks(size)
    .map(|c| Ok(c.to_vec()))
    .collect::<Vec<_>>()
    .into_iter()
}

async fn load(s: &SqliteStore, entity: Entity, rows: &[&[&str]]) -> u64 {
  s.replace_table(entity, batches(entity, rows, 2), |_| {})
    .await
    .unwrap()
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_creates_tables_and_indexes() {
  let s = store().await;

  let names: Vec<String> = s
    .conn
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type IN ('table', 'index')
         AND name NOT LIKE 'sqlite_%' ORDER BY name",
      )?;
      let names = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
      Ok(names)
    })
    .await
    .unwrap();

  for expected in [
    "user",
    "taxon",
    "observation",
    "photo",
    "ix_observation_observed_on",
    "ix_observation_quality_grade",
    "ix_observation_taxon_id",
    "ix_observation_user_id",
    "ix_observation_uuid",
    "ix_photo_observation_uuid",
    "ix_photo_user_id",
    "ix_photo_uuid",
    "ix_taxon_name",
    "ix_user_login",
  ] {
    assert!(names.iter().any(|n| n == expected), "missing {expected}");
  }

  for entity in Entity::ALL {
    assert_eq!(s.count(entity).await.unwrap(), 0);
  }
}

#[tokio::test]
async fn reopening_a_file_keeps_existing_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("inat.db");

  let s = SqliteStore::open(&path).await.unwrap();
  load(&s, Entity::User, &[&["1", "jdoe", "Jane Doe"]]).await;
  drop(s);

  let uri = crate::uri_for_path(&path);
  let s = SqliteStore::open_uri(&uri).await.unwrap();
  assert_eq!(s.count(Entity::User).await.unwrap(), 1);
}

#[tokio::test]
async fn unsupported_uri_is_rejected() {
  let err = SqliteStore::open_uri("mysql://localhost/inat")
    .await
    .err()
    .unwrap();
  assert!(matches!(err, Error::UnsupportedUri(_)));
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn observers_load_with_null_logins() {
  let s = store().await;

  let n = load(&s, Entity::User, &[
    &["1", "jdoe", "Jane Doe"],
    &["2", "", "Bob"],
  ])
  .await;
  assert_eq!(n, 2);

  let jane = s.get_user(1).await.unwrap().unwrap();
  assert_eq!(jane.login.as_deref(), Some("jdoe"));
  assert_eq!(jane.name.as_deref(), Some("Jane Doe"));

  let bob = s.get_user(2).await.unwrap().unwrap();
  assert_eq!(bob.login, None);
  assert_eq!(bob.name.as_deref(), Some("Bob"));

  assert!(s.get_user(3).await.unwrap().is_none());
}

#[tokio::test]
async fn replace_discards_previous_contents() {
  let s = store().await;

  load(&s, Entity::User, &[
    &["1", "a", "A"],
    &["2", "b", "B"],
    &["3", "c", "C"],
  ])
  .await;
  assert_eq!(s.count(Entity::User).await.unwrap(), 3);

  load(&s, Entity::User, &[&["7", "g", "G"], &["8", "h", "H"]]).await;
  assert_eq!(s.count(Entity::User).await.unwrap(), 2);
  assert!(s.get_user(1).await.unwrap().is_none());
  assert!(s.get_user(7).await.unwrap().is_some());

  load(&s, Entity::User, &[]).await;
  assert_eq!(s.count(Entity::User).await.unwrap(), 0);
}

#[tokio::test]
async fn taxa_store_booleans_and_floats() {
  let s = store().await;

  load(&s, Entity::Taxon, &[
    &["3", "48460\\1\\2", "species", "10", "Danaus plexippus", "true"],
    &["4", "", "genus", "", "Danaus", "False"],
  ])
  .await;

  let monarch = s.get_taxon(3).await.unwrap().unwrap();
  assert_eq!(monarch.rank_level, Some(10.0));
  assert_eq!(monarch.active, Some(true));
  assert_eq!(monarch.ancestors(), vec!["48460", "1", "2"]);

  let genus = s.get_taxon(4).await.unwrap().unwrap();
  assert_eq!(genus.ancestry, None);
  assert_eq!(genus.rank_level, None);
  assert_eq!(genus.active, Some(false));
}

#[tokio::test]
async fn observations_store_typed_values() {
  let s = store().await;

  load(&s, Entity::Observation, &[
    &["o-1", "1", "45.5", "-122.25", "12", "3", "research", "2021-05-04"],
    &["o-2", "", "", "", "", "", "", ""],
  ])
  .await;

  let o1 = s.get_observation("o-1").await.unwrap().unwrap();
  assert_eq!(o1.user_id, Some(1));
  assert_eq!(o1.latitude, Some(45.5));
  assert_eq!(o1.longitude, Some(-122.25));
  assert_eq!(o1.positional_accuracy, Some(12));
  assert_eq!(o1.taxon_id, Some(3));
  assert_eq!(o1.quality_grade.as_deref(), Some("research"));
  assert_eq!(
    o1.observed_on,
    NaiveDate::from_ymd_opt(2021, 5, 4).unwrap().and_hms_opt(0, 0, 0)
  );

  let o2 = s.get_observation("o-2").await.unwrap().unwrap();
  assert_eq!(o2.user_id, None);
  assert_eq!(o2.latitude, None);
  assert_eq!(o2.quality_grade, None);
  assert_eq!(o2.observed_on, None);
}

#[tokio::test]
async fn photos_come_back_in_display_order() {
  let s = store().await;

  load(&s, Entity::Photo, &[
    &["p-b", "102", "o-1", "1", "jpg", "CC-BY", "800", "600", "1"],
    &["p-x", "900", "o-2", "1", "png", "CC0", "10", "10", "0"],
    &["p-a", "101", "o-1", "1", "jpeg", "CC-BY-NC", "1024", "768", "0"],
  ])
  .await;

  let photos = s.photos_for_observation("o-1").await.unwrap();
  let uuids: Vec<_> = photos.iter().map(|p| p.uuid.as_str()).collect();
  assert_eq!(uuids, ["p-a", "p-b"]);
  assert_eq!(photos[0].width, Some(1024));
  assert_eq!(photos[0].license.as_deref(), Some("CC-BY-NC"));
  assert!(photos[1].url("square").unwrap().ends_with("/102/square.jpg"));
}

#[tokio::test]
async fn dangling_foreign_keys_are_tolerated() {
  let s = store().await;
  // No users or taxa loaded.
  let n = load(&s, Entity::Observation, &[&[
    "o-1", "999", "", "", "", "888", "casual", "",
  ]])
  .await;
  assert_eq!(n, 1);
}

#[tokio::test]
async fn on_batch_sees_every_batch_in_order() {
  let s = store().await;
  let seen = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&seen);

  let rows: Vec<Vec<String>> =
    (0..5).map(|i| vec![i.to_string(), format!("u{i}"), String::new()]).collect();
  let refs: Vec<Vec<&str>> =
    rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
  let slices: Vec<&[&str]> = refs.iter().map(Vec::as_slice).collect();

  let n = s
    .replace_table(Entity::User, batches(Entity::User, &slices, 2), move |len| {
      sink.lock().unwrap().push(len)
    })
    .await
    .unwrap();

  assert_eq!(n, 5);
  assert_eq!(*seen.lock().unwrap(), vec![2, 2, 1]);
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn constraint_violation_rolls_back() {
  let s = store().await;
  load(&s, Entity::User, &[&["1", "old", "Old"]]).await;

  let err = s
    .replace_table(
      Entity::User,
      batches(Entity::User, &[&["5", "a", "A"], &["5", "b", "B"]], 1),
      |_| {},
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Sqlite(_)), "{err}");

  // The delete was rolled back with the inserts.
  assert_eq!(s.count(Entity::User).await.unwrap(), 1);
  assert!(s.get_user(1).await.unwrap().is_some());
}

#[tokio::test]
async fn non_numeric_primary_key_is_a_storage_error() {
  let s = store().await;
  let err = s
    .replace_table(
      Entity::User,
      batches(Entity::User, &[&["abc", "a", "A"]], 1),
      |_| {},
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Sqlite(_)), "{err}");
}

#[tokio::test]
async fn mapping_error_mid_stream_rolls_back() {
  let s = store().await;
  load(&s, Entity::User, &[&["1", "old", "Old"]]).await;

  let good = map_row(Entity::User.columns(), ["2", "new", "New"]).unwrap();
  let stream = vec![
    Ok(vec![good]),
    Err(inat_core::Error::FieldCount { expected: 3, found: 1 }),
  ]
  .into_iter();

  let err = s
    .replace_table(Entity::User, stream, |_| {})
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(inat_core::Error::FieldCount { .. })
  ));

  assert_eq!(s.count(Entity::User).await.unwrap(), 1);
  assert!(s.get_user(2).await.unwrap().is_none());
}
