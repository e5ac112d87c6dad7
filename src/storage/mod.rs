//! Persistence layer.
//!
//! The engine treats durability as an opaque key/value store of JSON text:
//! `get(key) -> Option<String>`, `set(key, text)`. The file-backed
//! implementation maps each key to one file and replaces it via a temp-file
//! rename, so a crash mid-write leaves the previous value intact. The
//! in-memory implementation backs tests and can be switched to fail writes.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Store key for the single-envelope ledger record (settings + active bets
/// + betting history committed as one write).
pub const LEDGER_KEY: &str = "bankrollLedger";

/// Store key for the pick history record (separate namespace, separate
/// owner).
pub const PICK_HISTORY_KEY: &str = "aiHist";

/// Opaque key/value persistence contract. One `set` is one durable write;
/// there are no transactions across keys.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each key as `<dir>/<key>.json`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(key, "No stored value, starting fresh");
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(text))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!(key, bytes = value.len(), "Value persisted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory store for tests and ephemeral sessions. `fail_writes` makes
/// every `set` error, for exercising the persistence-failure path.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force all subsequent writes to fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("write failure injected for key {key}");
        }
        self.map.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn temp_dir() -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("pickbook_test_store_{}", uuid::Uuid::new_v4()));
        p
    }

    #[test]
    fn test_file_store_set_and_get() {
        let dir = temp_dir();
        let store = JsonFileStore::new(&dir).unwrap();

        assert!(store.get(LEDGER_KEY).unwrap().is_none());
        store.set(LEDGER_KEY, r#"{"ok":true}"#).unwrap();
        assert_eq!(store.get(LEDGER_KEY).unwrap().unwrap(), r#"{"ok":true}"#);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_overwrite_replaces_value() {
        let dir = temp_dir();
        let store = JsonFileStore::new(&dir).unwrap();

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), "second");
        // No stray temp file left behind
        assert!(!Path::new(&dir.join("k.json.tmp")).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_keys_are_independent_files() {
        let dir = temp_dir();
        let store = JsonFileStore::new(&dir).unwrap();

        store.set(LEDGER_KEY, "a").unwrap();
        store.set(PICK_HISTORY_KEY, "b").unwrap();
        assert!(dir.join("bankrollLedger.json").exists());
        assert!(dir.join("aiHist.json").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("x").unwrap().is_none());
        store.set("x", "42").unwrap();
        assert_eq!(store.get("x").unwrap().unwrap(), "42");
    }

    #[test]
    fn test_memory_store_injected_failure() {
        let store = MemoryStore::new();
        store.set("x", "1").unwrap();
        store.set_fail_writes(true);
        assert!(store.set("x", "2").is_err());
        // Old value survives the failed write
        assert_eq!(store.get("x").unwrap().unwrap(), "1");

        store.set_fail_writes(false);
        assert!(store.set("x", "3").is_ok());
    }
}
