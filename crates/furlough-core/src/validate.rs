//! Input validation for the registration and admin-edit flows.
//!
//! Validators are pure. The rank catalog is passed in by the caller rather
//! than read from ambient state, so these stay testable without a store.

/// A surname: letters, optionally with interior hyphens or apostrophes.
pub fn valid_surname(input: &str) -> bool {
  let name = input.trim();
  !name.is_empty()
    && name.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
    && name.chars().any(char::is_alphabetic)
}

/// A given name or initial: letters, optionally dotted or hyphenated
/// (accepts both "Taras" and "T.").
pub fn valid_given_name(input: &str) -> bool {
  let name = input.trim();
  !name.is_empty()
    && name.chars().all(|c| c.is_alphabetic() || c == '.' || c == '-')
    && name.chars().any(char::is_alphabetic)
}

/// A group number: one to four ASCII digits.
pub fn valid_group_number(input: &str) -> bool {
  let digits = input.trim();
  (1..=4).contains(&digits.chars().count())
    && digits.chars().all(|c| c.is_ascii_digit())
}

/// Case-insensitive match of `input` against the rank catalog. Returns the
/// canonical (stored) spelling so callers persist the catalog form, not the
/// user's.
pub fn match_rank<'a>(catalog: &'a [String], input: &str) -> Option<&'a str> {
  let needle = input.trim().to_lowercase();
  catalog
    .iter()
    .find(|name| name.to_lowercase() == needle)
    .map(String::as_str)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn surnames() {
    assert!(valid_surname("Shevchenko"));
    assert!(valid_surname("  Nechuy-Levytsky "));
    assert!(valid_surname("O'Brien"));
    assert!(!valid_surname(""));
    assert!(!valid_surname("   "));
    assert!(!valid_surname("Sh3vchenko"));
    assert!(!valid_surname("two words"));
    assert!(!valid_surname("--"));
  }

  #[test]
  fn given_names() {
    assert!(valid_given_name("Taras"));
    assert!(valid_given_name("T."));
    assert!(valid_given_name("Anna-Maria"));
    assert!(!valid_given_name(""));
    assert!(!valid_given_name("T2"));
    assert!(!valid_given_name("..."));
  }

  #[test]
  fn group_numbers() {
    assert!(valid_group_number("311"));
    assert!(valid_group_number(" 7 "));
    assert!(valid_group_number("1234"));
    assert!(!valid_group_number(""));
    assert!(!valid_group_number("12345"));
    assert!(!valid_group_number("31a"));
    assert!(!valid_group_number("3 1"));
  }

  #[test]
  fn rank_matching_is_case_insensitive_and_canonical() {
    let catalog =
      vec!["soldier".to_owned(), "senior soldier".to_owned()];
    assert_eq!(match_rank(&catalog, "Soldier"), Some("soldier"));
    assert_eq!(match_rank(&catalog, " SENIOR SOLDIER "), Some("senior soldier"));
    assert_eq!(match_rank(&catalog, "corporal"), None);
    assert_eq!(match_rank(&[], "soldier"), None);
  }
}
