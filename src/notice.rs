//! Start-up notice with a timed "don't show again" snooze.

use tracing::warn;

use crate::constants::constants;
use crate::model::now_millis;
use crate::storage::{LocalStore, NOTICE_KEY};

/// Whether the notice should appear, given the last dismissal time (ms since epoch).
pub fn should_show(now_ms: i64, dismissed_at: Option<i64>, snooze_secs: i64) -> bool {
  match dismissed_at {
    None => true,
    Some(at) => now_ms.saturating_sub(at) > snooze_secs.saturating_mul(1000),
  }
}

pub fn should_show_now(store: &LocalStore) -> bool {
  should_show(now_millis(), store.get::<i64>(NOTICE_KEY), constants().notice_snooze_secs)
}

/// Record a dismissal so the notice stays hidden for the snooze period.
pub fn snooze(store: &LocalStore) {
  if let Err(e) = store.set(NOTICE_KEY, &now_millis()) {
    warn!(err = %format!("{:#}", e), "notice: failed to persist dismissal");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TWO_HOURS: i64 = 2 * 60 * 60;

  #[test]
  fn shows_when_never_dismissed() {
    assert!(should_show(1_000, None, TWO_HOURS));
  }

  #[test]
  fn hidden_within_snooze() {
    let at = 1_700_000_000_000;
    assert!(!should_show(at + 60_000, Some(at), TWO_HOURS));
    assert!(!should_show(at + TWO_HOURS * 1000, Some(at), TWO_HOURS));
    assert!(should_show(at + TWO_HOURS * 1000 + 1, Some(at), TWO_HOURS));
  }

  #[test]
  fn snooze_persists() {
    let store = LocalStore::in_memory();
    assert!(should_show_now(&store));
    snooze(&store);
    assert!(!should_show_now(&store));
  }
}
