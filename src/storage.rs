//! Keyed JSON documents under the per-user data directory.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "history";
pub const NOTICE_KEY: &str = "notice_dismissed_at";

pub struct LocalStore {
  dir: Option<PathBuf>,
  /// Used instead of files when there is no directory.
  memory: Mutex<HashMap<String, String>>,
}

impl LocalStore {
  pub fn open(dir: &Path) -> Self {
    Self { dir: Some(dir.to_path_buf()), memory: Mutex::new(HashMap::new()) }
  }

  /// A store that never touches the filesystem.
  pub fn in_memory() -> Self {
    Self { dir: None, memory: Mutex::new(HashMap::new()) }
  }

  fn path_for(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
  }

  fn read_raw(&self, key: &str) -> Option<String> {
    match &self.dir {
      Some(dir) => std::fs::read_to_string(Self::path_for(dir, key)).ok(),
      None => self.memory.lock().ok()?.get(key).cloned(),
    }
  }

  /// Read and decode `key`. Missing or undecodable entries are `None`.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.read_raw(key)?;
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(e) => {
        warn!(key, err = %e, "storage: ignoring unparsable entry");
        None
      }
    }
  }

  pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    let content = serde_json::to_string(value).with_context(|| format!("Failed to encode '{}'", key))?;
    match &self.dir {
      Some(dir) => {
        std::fs::create_dir_all(dir).context("Failed to create data directory")?;
        let path = Self::path_for(dir, key);
        // Write to a temp file, then rename (atomic)
        let tmp_path = path.with_extension("json.part");
        std::fs::write(&tmp_path, content).with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path).with_context(|| format!("Failed to finalize {}", path.display()))?;
        debug!(key, path = %path.display(), "storage: saved");
      }
      None => {
        if let Ok(mut memory) = self.memory.lock() {
          memory.insert(key.to_string(), content);
        }
      }
    }
    Ok(())
  }

  pub fn remove(&self, key: &str) -> Result<()> {
    match &self.dir {
      Some(dir) => {
        let path = Self::path_for(dir, key);
        match std::fs::remove_file(&path) {
          Ok(()) => Ok(()),
          Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
          Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
      }
      None => {
        if let Ok(mut memory) = self.memory.lock() {
          memory.remove(key);
        }
        Ok(())
      }
    }
  }
}
