//! The `LeaveStore` trait — the persistence contract for people, leave
//! records and the rank catalog.
//!
//! The trait is implemented by storage backends (e.g.
//! `furlough-store-sqlite`). The conversation engine and the HTTP facade
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  leave::{LeaveRecord, LeaveRow, NewLeave},
  person::{NewPerson, Person, PersonField, RankAdd, RankDelete},
};

/// Abstraction over the record store backend.
///
/// Expected conflicts (duplicate rank name, rank still in use) are reported
/// as `Ok` outcome values so callers can translate them into user-facing
/// messages without inspecting backend error types. `Err` is reserved for
/// infrastructure failures, which fail the current interaction only.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait LeaveStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Insert a person, or overwrite every field of an existing one with the
  /// same chat id. `registered_at` is set by the store on each call.
  fn upsert_person(
    &self,
    person: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by chat id. Returns `None` if not registered.
  fn person(
    &self,
    chat_id: i64,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// All people, ordered by group number, then surname, then given name.
  fn people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// The number of registered people.
  fn count_people(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Overwrite a single allow-listed field, verbatim. Returns `false` when
  /// the chat id is not registered.
  fn update_person_field(
    &self,
    chat_id: i64,
    field: PersonField,
    value: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a person and, by cascade, all their leave records. Returns
  /// `false` when the chat id is not registered.
  fn delete_person(
    &self,
    chat_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Leave records ─────────────────────────────────────────────────────

  /// Insert a leave record, or overwrite kind, reason and return-info in
  /// place when the person already booked that date. The row id is stable
  /// across overwrites, so repeating an identical booking is a no-op in
  /// effect.
  fn book_leave(
    &self,
    leave: NewLeave,
  ) -> impl Future<Output = Result<LeaveRecord, Self::Error>> + Send + '_;

  /// One person's records dated on or after `as_of`, ordered by date.
  fn future_leaves(
    &self,
    chat_id: i64,
    as_of: NaiveDate,
  ) -> impl Future<Output = Result<Vec<LeaveRecord>, Self::Error>> + Send + '_;

  /// Delete one record by id. Returns `false` when no such record exists.
  fn delete_leave(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every record for one date, joined with its owner, ordered by group
  /// number, then surname, then given name.
  fn leaves_for_date(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<LeaveRow>, Self::Error>> + Send + '_;

  /// Delete every record dated on or after `as_of` and return the count.
  /// Records dated before `as_of` are never touched.
  fn delete_future_leaves(
    &self,
    as_of: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Drop every person, leave record and rank, and reset identity
  /// allocation to its initial value.
  fn wipe(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Rank catalog ──────────────────────────────────────────────────────

  /// Catalog names in insertion order.
  fn ranks(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Add a catalog entry, stored lowercase. A duplicate name reports
  /// [`RankAdd::Duplicate`] and changes nothing.
  fn add_rank(
    &self,
    name: String,
  ) -> impl Future<Output = Result<RankAdd, Self::Error>> + Send + '_;

  /// Remove a catalog entry. Reports [`RankDelete::InUse`] without changing
  /// anything while any person still holds the rank.
  fn delete_rank(
    &self,
    name: String,
  ) -> impl Future<Output = Result<RankDelete, Self::Error>> + Send + '_;

  /// Insert any of `names` not already present. Idempotent: re-seeding
  /// never duplicates or reorders the catalog.
  fn seed_ranks(
    &self,
    names: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
