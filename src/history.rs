use tracing::{info, warn};

use crate::constants::constants;
use crate::model::VideoInfo;
use crate::storage::{HISTORY_KEY, LocalStore};

/// Most-recent-first list of resolved records, unique by `url`, bounded in length.
#[derive(Debug, Clone, Default)]
pub struct History {
  entries: Vec<VideoInfo>,
  limit: usize,
}

impl History {
  pub fn with_limit(limit: usize) -> Self {
    Self { entries: Vec::new(), limit }
  }

  /// Read the persisted list. Absent or unparsable storage gives an empty history.
  pub fn load(store: &LocalStore) -> Self {
    let mut history = Self::with_limit(constants().history_limit);
    history.entries = store.get(HISTORY_KEY).unwrap_or_default();
    history.entries.truncate(history.limit);
    info!(count = history.entries.len(), "history: loaded");
    history
  }

  pub fn entries(&self) -> &[VideoInfo] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Move `info` to the front, dropping any older entry with the same url and
  /// anything past the limit, then persist.
  pub fn record(&mut self, store: &LocalStore, info: VideoInfo) -> &[VideoInfo] {
    self.entries.retain(|e| e.url != info.url);
    self.entries.insert(0, info);
    self.entries.truncate(self.limit);
    if let Err(e) = store.set(HISTORY_KEY, &self.entries) {
      warn!(err = %format!("{:#}", e), "history: failed to persist");
    }
    &self.entries
  }

  pub fn clear(&mut self, store: &LocalStore) {
    self.entries.clear();
    if let Err(e) = store.remove(HISTORY_KEY) {
      warn!(err = %format!("{:#}", e), "history: failed to remove persisted list");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(n: usize) -> VideoInfo {
    let mut info = VideoInfo::placeholder(&format!("https://www.tiktok.com/@u/video/{}", n));
    info.id = n.to_string();
    info
  }

  #[test]
  fn record_prepends() {
    let store = LocalStore::in_memory();
    let mut history = History::with_limit(10);
    history.record(&store, item(1));
    let entries = history.record(&store, item(2));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "2");
    assert_eq!(entries[1].id, "1");
  }

  #[test]
  fn record_same_url_twice_keeps_one_entry_with_latest_value() {
    let store = LocalStore::in_memory();
    let mut history = History::with_limit(10);
    history.record(&store, item(1));
    history.record(&store, item(2));
    let mut again = item(1);
    again.title = "Updated".to_string();
    history.record(&store, again.clone());
    let matches: Vec<_> = history.entries().iter().filter(|e| e.url == again.url).collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(history.entries()[0], again);
    assert_eq!(history.len(), 2);
  }

  #[test]
  fn eleventh_entry_drops_oldest() {
    let store = LocalStore::in_memory();
    let mut history = History::with_limit(10);
    for n in 1..=11 {
      history.record(&store, item(n));
      assert!(history.len() <= 10);
    }
    assert_eq!(history.len(), 10);
    assert_eq!(history.entries()[0].id, "11");
    assert_eq!(history.entries()[9].id, "2");
    assert!(history.entries().iter().all(|e| e.id != "1"));
  }

  #[test]
  fn persisted_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path());
    let mut history = History::load(&store);
    assert!(history.is_empty());
    history.record(&store, item(1));
    history.record(&store, item(2));

    let reloaded = History::load(&store);
    assert_eq!(reloaded.entries(), history.entries());
  }

  #[test]
  fn clear_removes_persisted_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path());
    let mut history = History::load(&store);
    history.record(&store, item(1));
    history.clear(&store);
    assert!(history.is_empty());
    assert!(!dir.path().join("history.json").exists());
    assert!(History::load(&store).is_empty());
  }

  #[test]
  fn corrupt_storage_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("history.json"), "[{\"id\":").unwrap();
    let store = LocalStore::open(dir.path());
    assert!(History::load(&store).is_empty());
  }

  #[test]
  fn loads_records_written_with_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let raw = r#"[{"id":"1","url":"https://www.tiktok.com/@a/video/1","title":"t","author":"@a",
      "avatar":"a.svg","cover":"c.jpg","musicTitle":"m","duration":"00:10","timestamp":1700000000000,
      "videoUrl":"v.mp4"}]"#;
    std::fs::write(dir.path().join("history.json"), raw).unwrap();
    let history = History::load(&LocalStore::open(dir.path()));
    assert_eq!(history.len(), 1);
    assert_eq!(history.entries()[0].video_url.as_deref(), Some("v.mp4"));
    assert!(history.entries()[0].audio_url.is_none());
  }
}
