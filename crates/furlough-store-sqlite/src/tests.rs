//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use furlough_core::{
  leave::{LeaveKind, NewLeave, Reason},
  person::{DEFAULT_RANKS, NewPerson, PersonField, RankAdd, RankDelete},
  store::LeaveStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

async fn seeded_store() -> SqliteStore {
  let s = store().await;
  s.seed_ranks(DEFAULT_RANKS.map(str::to_owned).to_vec())
    .await
    .unwrap();
  s
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn recruit(chat_id: i64, surname: &str, group: &str) -> NewPerson {
  NewPerson {
    chat_id,
    rank: "soldier".into(),
    surname: surname.into(),
    given_name: "Taras".into(),
    handle: Some("taras_sh".into()),
    group_number: group.into(),
  }
}

fn regular_leave(chat_id: i64, date: NaiveDate) -> NewLeave {
  NewLeave {
    chat_id,
    kind: LeaveKind::Regular,
    date,
    reason: None,
    return_info: Some("until 21:30".into()),
  }
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_person_inserts_then_overwrites() {
  let s = store().await;

  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  let stored = s.person(1001).await.unwrap().unwrap();
  assert_eq!(stored.surname, "Shevchenko");
  assert_eq!(stored.group_number, "311");

  let mut again = recruit(1001, "Shevchenko", "214");
  again.rank = "sergeant".into();
  s.upsert_person(again).await.unwrap();

  let stored = s.person(1001).await.unwrap().unwrap();
  assert_eq!(stored.rank, "sergeant");
  assert_eq!(stored.group_number, "214");
  assert_eq!(s.count_people().await.unwrap(), 1);
}

#[tokio::test]
async fn person_missing_returns_none() {
  let s = store().await;
  assert!(s.person(42).await.unwrap().is_none());
}

#[tokio::test]
async fn people_ordered_by_numeric_group_then_name() {
  let s = store().await;
  s.upsert_person(recruit(1, "Bondar", "10")).await.unwrap();
  s.upsert_person(recruit(2, "Melnyk", "2")).await.unwrap();
  s.upsert_person(recruit(3, "Kovalenko", "2")).await.unwrap();

  let people = s.people().await.unwrap();
  let surnames: Vec<_> = people.iter().map(|p| p.surname.as_str()).collect();
  // "2" sorts before "10" numerically, within a group by surname.
  assert_eq!(surnames, ["Kovalenko", "Melnyk", "Bondar"]);
}

#[tokio::test]
async fn update_person_field_hits_only_the_named_column() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();

  let updated = s
    .update_person_field(1001, PersonField::GroupNumber, "214".into())
    .await
    .unwrap();
  assert!(updated);

  let stored = s.person(1001).await.unwrap().unwrap();
  assert_eq!(stored.group_number, "214");
  assert_eq!(stored.surname, "Shevchenko");

  let missing = s
    .update_person_field(9999, PersonField::Rank, "sergeant".into())
    .await
    .unwrap();
  assert!(!missing);
}

#[tokio::test]
async fn delete_person_cascades_to_leaves() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  s.book_leave(regular_leave(1001, date(2024, 3, 13))).await.unwrap();
  s.book_leave(regular_leave(1001, date(2024, 3, 14))).await.unwrap();

  assert!(s.delete_person(1001).await.unwrap());
  assert_eq!(s.count_people().await.unwrap(), 0);
  let left = s.future_leaves(1001, date(2024, 1, 1)).await.unwrap();
  assert!(left.is_empty());

  assert!(!s.delete_person(1001).await.unwrap());
}

// ─── Leave records ───────────────────────────────────────────────────────────

#[tokio::test]
async fn book_leave_upserts_in_place_and_keeps_the_id() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  let day = date(2024, 3, 13);

  let first = s.book_leave(regular_leave(1001, day)).await.unwrap();

  let rebooked = s
    .book_leave(NewLeave {
      chat_id: 1001,
      kind: LeaveKind::DayLong,
      date: day,
      reason: Some(Reason::Report),
      return_info: Some("until 06:00".into()),
    })
    .await
    .unwrap();

  assert_eq!(rebooked.id, first.id);
  assert_eq!(rebooked.kind, LeaveKind::DayLong);

  let records = s.future_leaves(1001, day).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].kind, LeaveKind::DayLong);
  assert_eq!(records[0].reason, Some(Reason::Report));
}

#[tokio::test]
async fn identical_rebooking_is_a_no_op_in_effect() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  let day = date(2024, 3, 13);

  let first = s.book_leave(regular_leave(1001, day)).await.unwrap();
  let second = s.book_leave(regular_leave(1001, day)).await.unwrap();

  assert_eq!(second.id, first.id);
  let records = s.future_leaves(1001, day).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].return_info.as_deref(), Some("until 21:30"));
}

#[tokio::test]
async fn future_leaves_excludes_earlier_dates_and_orders_by_date() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  s.book_leave(regular_leave(1001, date(2024, 3, 20))).await.unwrap();
  s.book_leave(regular_leave(1001, date(2024, 3, 8))).await.unwrap();
  s.book_leave(regular_leave(1001, date(2024, 3, 13))).await.unwrap();

  let records = s.future_leaves(1001, date(2024, 3, 12)).await.unwrap();
  let dates: Vec<_> = records.iter().map(|r| r.date).collect();
  assert_eq!(dates, [date(2024, 3, 13), date(2024, 3, 20)]);
}

#[tokio::test]
async fn delete_leave_by_id() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  let record = s.book_leave(regular_leave(1001, date(2024, 3, 13))).await.unwrap();

  assert!(s.delete_leave(record.id).await.unwrap());
  assert!(!s.delete_leave(record.id).await.unwrap());
}

#[tokio::test]
async fn leaves_for_date_joins_owners_in_group_order() {
  let s = store().await;
  s.upsert_person(recruit(1, "Bondar", "10")).await.unwrap();
  s.upsert_person(recruit(2, "Melnyk", "2")).await.unwrap();
  let day = date(2024, 3, 13);
  s.book_leave(regular_leave(1, day)).await.unwrap();
  s.book_leave(NewLeave {
    chat_id: 2,
    kind: LeaveKind::DayLong,
    date: day,
    reason: Some(Reason::Dispensation),
    return_info: Some("until 08:00".into()),
  })
  .await
  .unwrap();

  let rows = s.leaves_for_date(day).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].surname, "Melnyk");
  assert_eq!(rows[0].kind, LeaveKind::DayLong);
  assert_eq!(rows[0].reason, Some(Reason::Dispensation));
  assert_eq!(rows[1].surname, "Bondar");
  assert_eq!(rows[1].rank, "soldier");

  assert!(s.leaves_for_date(date(2024, 3, 14)).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_future_leaves_counts_and_preserves_the_past() {
  let s = store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  let today = date(2024, 3, 12);

  for day in [date(2024, 3, 1), date(2024, 3, 5)] {
    s.book_leave(regular_leave(1001, day)).await.unwrap();
  }
  for day in [today, date(2024, 3, 13), date(2024, 3, 20)] {
    s.book_leave(regular_leave(1001, day)).await.unwrap();
  }

  let deleted = s.delete_future_leaves(today).await.unwrap();
  assert_eq!(deleted, 3);

  let past = s.future_leaves(1001, date(2024, 1, 1)).await.unwrap();
  let dates: Vec<_> = past.iter().map(|r| r.date).collect();
  assert_eq!(dates, [date(2024, 3, 1), date(2024, 3, 5)]);
}

#[tokio::test]
async fn wipe_clears_everything_and_restarts_ids() {
  let s = seeded_store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  s.book_leave(regular_leave(1001, date(2024, 3, 13))).await.unwrap();
  let second = s.book_leave(regular_leave(1001, date(2024, 3, 14))).await.unwrap();
  assert_eq!(second.id, 2);

  s.wipe().await.unwrap();

  assert_eq!(s.count_people().await.unwrap(), 0);
  assert!(s.ranks().await.unwrap().is_empty());

  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();
  let fresh = s.book_leave(regular_leave(1001, date(2024, 3, 13))).await.unwrap();
  assert_eq!(fresh.id, 1);
}

// ─── Rank catalog ────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_ranks_is_idempotent_and_keeps_order() {
  let s = seeded_store().await;
  s.seed_ranks(DEFAULT_RANKS.map(str::to_owned).to_vec())
    .await
    .unwrap();

  let names = s.ranks().await.unwrap();
  assert_eq!(names, DEFAULT_RANKS.map(str::to_owned).to_vec());
}

#[tokio::test]
async fn add_rank_normalises_and_reports_duplicates() {
  let s = seeded_store().await;

  let added = s.add_rank("  Corporal ".into()).await.unwrap();
  assert_eq!(added, RankAdd::Added);
  assert!(s.ranks().await.unwrap().contains(&"corporal".to_owned()));

  let dup = s.add_rank("corporal".into()).await.unwrap();
  assert_eq!(dup, RankAdd::Duplicate);
}

#[tokio::test]
async fn delete_rank_guards_entries_in_use() {
  let s = seeded_store().await;
  s.upsert_person(recruit(1001, "Shevchenko", "311")).await.unwrap();

  let held = s.delete_rank("soldier".into()).await.unwrap();
  assert_eq!(held, RankDelete::InUse { people: 1 });
  assert!(s.ranks().await.unwrap().contains(&"soldier".to_owned()));
  assert!(s.person(1001).await.unwrap().is_some());

  let freed = s.delete_rank("sergeant".into()).await.unwrap();
  assert_eq!(freed, RankDelete::Deleted);

  let missing = s.delete_rank("colonel".into()).await.unwrap();
  assert_eq!(missing, RankDelete::NotFound);
}

// ─── Migration ───────────────────────────────────────────────────────────────

const V1_DATABASE: &str = "
CREATE TABLE people (
    chat_id       INTEGER PRIMARY KEY,
    rank          TEXT NOT NULL,
    surname       TEXT NOT NULL,
    given_name    TEXT NOT NULL,
    handle        TEXT,
    group_number  TEXT NOT NULL,
    registered_at TEXT NOT NULL
);
CREATE TABLE leaves (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL REFERENCES people(chat_id) ON DELETE CASCADE,
    kind    TEXT NOT NULL,
    date    TEXT NOT NULL,
    UNIQUE (chat_id, date)
);
CREATE TABLE ranks (name TEXT NOT NULL UNIQUE);

INSERT INTO people VALUES
  (7, 'soldier', 'Bondar', 'Ivan', NULL, '2', '2024-01-10T08:00:00+00:00');
INSERT INTO leaves (chat_id, kind, date) VALUES (7, 'regular', '2024-03-20');

PRAGMA user_version = 1;
";

#[tokio::test]
async fn migration_adds_reason_columns_and_keeps_rows() {
  let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
  conn
    .call(|conn| {
      conn.execute_batch(V1_DATABASE)?;
      Ok(())
    })
    .await
    .unwrap();

  let s = SqliteStore::init(conn).await.unwrap();

  // The legacy row survives, with the new columns reading as absent.
  let records = s.future_leaves(7, date(2024, 1, 1)).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].date, date(2024, 3, 20));
  assert_eq!(records[0].reason, None);
  assert_eq!(records[0].return_info, None);

  // And the upgraded table accepts the new fields.
  s.book_leave(NewLeave {
    chat_id: 7,
    kind: LeaveKind::DayLong,
    date: date(2024, 3, 21),
    reason: Some(Reason::Report),
    return_info: Some("until 06:00".into()),
  })
  .await
  .unwrap();

  let records = s.future_leaves(7, date(2024, 3, 21)).await.unwrap();
  assert_eq!(records[0].reason, Some(Reason::Report));
}
