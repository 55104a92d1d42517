//! Submission-deadline policy — which dates are bookable as of a given
//! instant.
//!
//! Every decision is evaluated against the organisation's wall clock, a
//! fixed UTC offset carried in the policy. The host timezone never
//! participates; `now` arrives as UTC and is converted here.

use chrono::{
  DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime,
  Utc, Weekday,
};

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// The eligibility verdict for one candidate date at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  /// The date is before today; never bookable.
  Past,
  /// The date is today; open strictly before the same-day cutoff, and never
  /// reopens once closed.
  SameDay { open: bool },
  /// The date is a Friday, Saturday or Sunday. The whole span shares one
  /// deadline, the Thursday of that calendar week at the weekend cutoff;
  /// all three dates flip closed at that instant together.
  WeekendWindow { open: bool, deadline: NaiveDateTime },
  /// A future ordinary weekday; always open.
  WeekdayOpen,
}

impl Verdict {
  /// Whether a booking for the judged date may proceed right now.
  pub fn is_open(&self) -> bool {
    match self {
      Self::Past => false,
      Self::SameDay { open } => *open,
      Self::WeekendWindow { open, .. } => *open,
      Self::WeekdayOpen => true,
    }
  }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Deadline configuration. Constructed from configuration values at startup
/// and shared read-only; verdicts are pure functions of (`now`, date).
#[derive(Debug, Clone, Copy)]
pub struct DeadlinePolicy {
  /// The organisation's fixed UTC offset.
  pub offset:          FixedOffset,
  /// Same-day bookings close at this local time.
  pub same_day_cutoff: NaiveTime,
  /// Weekend bookings close at this local time on the anchor Thursday.
  pub weekend_cutoff:  NaiveTime,
}

impl DeadlinePolicy {
  /// Build a policy from whole-hour configuration values. `None` when the
  /// offset or either cutoff hour is out of range.
  pub fn from_hours(
    offset_hours: i32,
    same_day_cutoff: u32,
    weekend_cutoff: u32,
  ) -> Option<Self> {
    Some(Self {
      offset:          FixedOffset::east_opt(offset_hours.checked_mul(3600)?)?,
      same_day_cutoff: NaiveTime::from_hms_opt(same_day_cutoff, 0, 0)?,
      weekend_cutoff:  NaiveTime::from_hms_opt(weekend_cutoff, 0, 0)?,
    })
  }

  /// `now` on the organisation's wall clock.
  pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&self.offset).naive_local()
  }

  /// Today's date on the organisation's wall clock.
  pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
    self.local_now(now).date()
  }

  /// Judge one candidate date as of `now`.
  ///
  /// A weekend date that happens to be today is judged by the weekend
  /// window, not the same-day cutoff: by the time a Friday is "today" its
  /// Thursday deadline has already passed, and the window verdict is the
  /// one that explains why.
  pub fn verdict(&self, now: DateTime<Utc>, date: NaiveDate) -> Verdict {
    let local = self.local_now(now);
    let today = local.date();

    if date < today {
      return Verdict::Past;
    }
    if is_weekend(date.weekday()) {
      let deadline = self.weekend_deadline(date);
      return Verdict::WeekendWindow { open: local < deadline, deadline };
    }
    if date == today {
      return Verdict::SameDay { open: local.time() < self.same_day_cutoff };
    }
    Verdict::WeekdayOpen
  }

  /// The shared deadline for a weekend date: Thursday of the same calendar
  /// week, at the weekend cutoff time.
  pub fn weekend_deadline(&self, date: NaiveDate) -> NaiveDateTime {
    // Fri/Sat/Sun sit 1/2/3 days past Thursday; never called for other days.
    let back = date.weekday().num_days_from_monday()
      - Weekday::Thu.num_days_from_monday();
    (date - Days::new(u64::from(back))).and_time(self.weekend_cutoff)
  }
}

fn is_weekend(weekday: Weekday) -> bool {
  matches!(weekday, Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn policy() -> DeadlinePolicy {
    DeadlinePolicy::from_hours(3, 16, 17).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  /// A UTC instant that reads as the given organisational wall-clock time.
  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    policy()
      .offset
      .with_ymd_and_hms(y, m, d, h, min, 0)
      .unwrap()
      .with_timezone(&Utc)
  }

  // 2024-03-11 is a Monday; 14 Thu, 15 Fri, 16 Sat, 17 Sun.

  #[test]
  fn past_dates_rejected_at_any_hour() {
    let p = policy();
    let yesterday = date(2024, 3, 11);
    assert_eq!(p.verdict(at(2024, 3, 12, 0, 1), yesterday), Verdict::Past);
    assert_eq!(p.verdict(at(2024, 3, 12, 23, 59), yesterday), Verdict::Past);
    // A past weekend date is still just past.
    assert_eq!(p.verdict(at(2024, 3, 18, 9, 0), date(2024, 3, 16)), Verdict::Past);
  }

  #[test]
  fn same_day_flips_at_cutoff_and_stays_closed() {
    let p = policy();
    let tuesday = date(2024, 3, 12);
    assert_eq!(
      p.verdict(at(2024, 3, 12, 15, 59), tuesday),
      Verdict::SameDay { open: true }
    );
    assert_eq!(
      p.verdict(at(2024, 3, 12, 16, 0), tuesday),
      Verdict::SameDay { open: false }
    );
    assert_eq!(
      p.verdict(at(2024, 3, 12, 16, 5), tuesday),
      Verdict::SameDay { open: false }
    );
    assert_eq!(
      p.verdict(at(2024, 3, 12, 23, 30), tuesday),
      Verdict::SameDay { open: false }
    );
  }

  #[test]
  fn future_weekday_always_open() {
    let p = policy();
    let wednesday = date(2024, 3, 13);
    assert_eq!(p.verdict(at(2024, 3, 12, 9, 0), wednesday), Verdict::WeekdayOpen);
    assert_eq!(p.verdict(at(2024, 3, 12, 23, 0), wednesday), Verdict::WeekdayOpen);
  }

  #[test]
  fn weekend_dates_share_thursday_anchor() {
    let p = policy();
    let anchor = date(2024, 3, 14).and_hms_opt(17, 0, 0).unwrap();
    for day in [15, 16, 17] {
      match p.verdict(at(2024, 3, 11, 12, 0), date(2024, 3, day)) {
        Verdict::WeekendWindow { open, deadline } => {
          assert!(open);
          assert_eq!(deadline, anchor);
        }
        other => panic!("expected weekend window, got {other:?}"),
      }
    }
  }

  #[test]
  fn weekend_flips_in_lockstep_at_deadline() {
    let p = policy();
    let before = at(2024, 3, 14, 16, 59);
    let after = at(2024, 3, 14, 17, 0);
    for day in [15, 16, 17] {
      assert!(p.verdict(before, date(2024, 3, day)).is_open());
      assert!(!p.verdict(after, date(2024, 3, day)).is_open());
    }
  }

  #[test]
  fn friday_today_is_judged_by_the_window() {
    let p = policy();
    // By Friday morning the Thursday deadline has passed.
    let verdict = p.verdict(at(2024, 3, 15, 10, 0), date(2024, 3, 15));
    assert!(matches!(verdict, Verdict::WeekendWindow { open: false, .. }));
  }

  #[test]
  fn evaluation_uses_the_organisational_offset() {
    let p = policy();
    let tuesday = date(2024, 6, 4);
    // 12:30 UTC is 15:30 local: still open.
    let open = Utc.with_ymd_and_hms(2024, 6, 4, 12, 30, 0).unwrap();
    // 13:30 UTC is 16:30 local: closed.
    let closed = Utc.with_ymd_and_hms(2024, 6, 4, 13, 30, 0).unwrap();
    assert!(p.verdict(open, tuesday).is_open());
    assert!(!p.verdict(closed, tuesday).is_open());
  }

  #[test]
  fn rejects_out_of_range_configuration() {
    assert!(DeadlinePolicy::from_hours(3, 24, 17).is_none());
    assert!(DeadlinePolicy::from_hours(400, 16, 17).is_none());
  }
}
