use crate::utils::Result;
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    sync::Mutex,
};

/// One captured genotyper run. The command text is the primary key: the
/// store holds at most one record per distinct command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub key: String,
    pub stdout: String,
    pub stderr: String,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(
        key: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<String, ExecutionRecord>,
    // Keys reserved by an in-flight execution that has not upserted yet.
    pending: HashSet<String>,
    watchers: HashMap<String, Vec<Sender<ExecutionRecord>>>,
}

/// Keyed store of execution results with a publish/notify surface.
///
/// All mutation goes through a single mutex, which makes the
/// reserve-then-spawn sequence in the executor atomic: once a key is
/// reserved or stored, no second process is ever launched for it.
#[derive(Default)]
pub struct ExecutionStore {
    inner: Mutex<StoreInner>,
}

impl ExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a persisted record map. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read store {}: {}", path.display(), e))?;
        let records: HashMap<String, ExecutionRecord> = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse store {}: {}", path.display(), e))?;
        Ok(Self {
            inner: Mutex::new(StoreInner {
                records,
                ..Default::default()
            }),
        })
    }

    /// Persists the record map. Reservations and subscriptions are
    /// process-local and not written out.
    pub fn save(&self, path: &Path) -> Result<()> {
        let inner = self.inner.lock().unwrap();
        let text = serde_json::to_string_pretty(&inner.records)
            .map_err(|e| format!("Failed to serialize store: {}", e))?;
        fs::write(path, text)
            .map_err(|e| format!("Failed to write store {}: {}", path.display(), e))
    }

    /// Insert-or-replace by `record.key`, last write wins. Clears any
    /// pending reservation for the key and notifies subscribers.
    pub fn upsert(&self, record: ExecutionRecord) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending.remove(&record.key);
        if let Some(watchers) = inner.watchers.get_mut(&record.key) {
            watchers.retain(|sender| sender.send(record.clone()).is_ok());
        }
        inner.records.insert(record.key.clone(), record);
    }

    pub fn find(&self, key: &str) -> Option<ExecutionRecord> {
        self.inner.lock().unwrap().records.get(key).cloned()
    }

    /// Idempotent: removing an absent key is a no-op. Subscribers of the
    /// removed key are dropped along with it.
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.remove(key);
        inner.watchers.remove(key);
    }

    pub fn exists(&self, key: &str) -> bool {
        self.inner.lock().unwrap().records.contains_key(key)
    }

    /// Atomically claims a key for execution. Returns false if a record
    /// already exists or another execution is in flight, so at most one
    /// caller ever wins a given key.
    pub fn try_reserve(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.records.contains_key(key) || inner.pending.contains(key) {
            return false;
        }
        inner.pending.insert(key.to_string());
        true
    }

    /// Subscribes to a key. If a record already exists it is delivered
    /// immediately; every later upsert of the key is delivered as it
    /// happens.
    pub fn subscribe(&self, key: &str) -> Receiver<ExecutionRecord> {
        let (sender, receiver) = unbounded();
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.records.get(key) {
            // Send on an unbounded channel we still hold cannot fail.
            let _ = sender.send(record.clone());
        }
        inner.watchers.entry(key.to_string()).or_default().push(sender);
        receiver
    }

    pub fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut keys: Vec<String> = inner.records.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().records.is_empty()
    }
}
