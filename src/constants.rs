//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available;
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub app_name: String,
  pub file_prefix: String,
  /// Substring an input link must contain before any network call is made.
  pub source_domain: String,

  // Scraping source
  pub scraper_endpoint: String,
  pub request_timeout_secs: u64,

  // AI source
  pub ai_endpoint: String,
  pub ai_default_model: String,
  pub trending_count: usize,

  // Placeholder image templates, `{seed}` is substituted
  pub avatar_template: String,
  pub cover_template: String,
  pub trending_cover_template: String,

  pub history_limit: usize,

  // Progress simulator
  pub progress_tick_ms: u64,
  pub progress_cap: f64,
  pub progress_max_step: f64,
  pub reveal_delay_ms: u64,

  pub notice_snooze_secs: i64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert_eq!(c.history_limit, 10);
    assert_eq!(c.trending_count, 6);
    assert!(c.progress_cap < 100.0);
    assert!(c.cover_template.contains("{seed}"));
  }
}
