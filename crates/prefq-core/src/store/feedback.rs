use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{EpisodeKey, Preference, ShuffleSeed};

use super::{KeyValueStore, Lambda, StoreError, keys, kv};

/// Answers and session bookkeeping of one lambda.
///
/// Answers are cached in memory and the whole map is written back on every
/// [`set`](Self::set), so the store always holds the latest state when a call
/// returns.
#[derive(Debug)]
pub struct FeedbackStore<S> {
    store: S,
    lambda: Lambda,
    entries: BTreeMap<String, Preference>,
}

impl<S> FeedbackStore<S>
where
    S: KeyValueStore,
{
    /// Loads the answers stored for `lambda`.
    ///
    /// Legacy unscoped data is not looked at; see
    /// [`migrate_legacy`](Self::migrate_legacy).
    pub fn open(store: S, lambda: Lambda) -> Self {
        let entries = load_entries(&store, &keys::feedback(&lambda));
        debug!(%lambda, entries = entries.len(), "feedback loaded");
        Self {
            store,
            lambda,
            entries,
        }
    }

    #[must_use]
    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    #[must_use]
    pub fn get(&self, filename: &str) -> Option<Preference> {
        self.entries.get(filename).copied()
    }

    /// Records `preference` for `filename` and persists all answers.
    ///
    /// Last write wins; repeating a call leaves the store unchanged. The
    /// in-memory answers only change once the store accepted the write.
    pub fn set(&mut self, filename: &str, preference: Preference) -> Result<(), StoreError> {
        let mut entries = self.entries.clone();
        entries.insert(filename.to_owned(), preference);
        kv::write_json(&mut self.store, &keys::feedback(&self.lambda), &entries)?;
        self.entries = entries;
        Ok(())
    }

    /// All answers, ordered by filename.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, Preference> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies data written under the unscoped legacy keys into this lambda.
    ///
    /// Answers are copied only when this lambda has none; benchmark keys only
    /// when this lambda has no stored list. The legacy keys are left in
    /// place. Returns whether anything was copied.
    pub fn migrate_legacy(&mut self) -> Result<bool, StoreError> {
        let mut migrated = false;

        if self.entries.is_empty() {
            let legacy = load_entries(&self.store, keys::LEGACY_FEEDBACK);
            if !legacy.is_empty() {
                let key = keys::feedback(&self.lambda);
                kv::write_json(&mut self.store, &key, &legacy)?;
                info!(%key, entries = legacy.len(), "migrated legacy feedback");
                self.entries = legacy;
                migrated = true;
            }
        }

        let key = keys::benchmark_keys(&self.lambda);
        if kv::read_json::<_, Vec<String>>(&self.store, &key).is_none() {
            let legacy: Vec<String> =
                kv::read_json(&self.store, keys::LEGACY_BENCHMARK_KEYS).unwrap_or_default();
            if !legacy.is_empty() {
                kv::write_json(&mut self.store, &key, &legacy)?;
                info!(%key, keys = legacy.len(), "migrated legacy benchmark keys");
                migrated = true;
            }
        }

        Ok(migrated)
    }

    /// Number of answers under the unscoped legacy key that
    /// [`migrate_legacy`](Self::migrate_legacy) would copy.
    #[must_use]
    pub fn pending_legacy_len(&self) -> usize {
        if self.entries.is_empty() {
            load_entries(&self.store, keys::LEGACY_FEEDBACK).len()
        } else {
            0
        }
    }

    /// Benchmark episodes reserved for this lambda.
    ///
    /// Entries that are not valid episode keys are logged and skipped.
    #[must_use]
    pub fn benchmark_keys(&self) -> Vec<EpisodeKey> {
        let raw: Vec<String> =
            kv::read_json(&self.store, &keys::benchmark_keys(&self.lambda)).unwrap_or_default();
        raw.into_iter()
            .filter_map(|key| match key.parse() {
                Ok(key) => Some(key),
                Err(error) => {
                    warn!(%error, "ignoring stored benchmark key");
                    None
                }
            })
            .collect()
    }

    pub fn save_benchmark_keys(&mut self, benchmark_keys: &[EpisodeKey]) -> Result<(), StoreError> {
        kv::write_json(
            &mut self.store,
            &keys::benchmark_keys(&self.lambda),
            benchmark_keys,
        )
    }

    /// Rater identifier. Shared by all lambdas.
    #[must_use]
    pub fn annotator_id(&self) -> Option<String> {
        kv::read_json::<_, String>(&self.store, keys::ANNOTATOR_ID).filter(|id| !id.is_empty())
    }

    /// Stores the rater identifier, or forgets it when `id` is blank.
    pub fn set_annotator_id(&mut self, id: Option<&str>) -> Result<(), StoreError> {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => kv::write_json(&mut self.store, keys::ANNOTATOR_ID, id),
            None => self.store.remove(keys::ANNOTATOR_ID),
        }
    }

    #[must_use]
    pub fn session_seed(&self) -> Option<ShuffleSeed> {
        kv::read_json(&self.store, &keys::session_seed(&self.lambda))
    }

    pub fn save_session_seed(&mut self, seed: ShuffleSeed) -> Result<(), StoreError> {
        kv::write_json(&mut self.store, &keys::session_seed(&self.lambda), &seed)
    }

    /// Forgets this lambda's answers, benchmark keys, and seed.
    ///
    /// Also removes the legacy answer backup. Other lambdas and the
    /// annotator id are kept.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(&keys::feedback(&self.lambda))?;
        self.store.remove(&keys::benchmark_keys(&self.lambda))?;
        self.store.remove(&keys::session_seed(&self.lambda))?;
        self.store.remove(keys::FEEDBACK_BACKUP)?;
        self.entries.clear();
        info!(lambda = %self.lambda, "cleared stored feedback");
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Decodes an answer map, accepting integer codes and numeric strings.
fn load_entries<S>(store: &S, key: &str) -> BTreeMap<String, Preference>
where
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = kv::read_json::<_, BTreeMap<String, Value>>(store, key) else {
        return BTreeMap::new();
    };
    raw.into_iter()
        .filter_map(|(filename, value)| {
            let code = match &value {
                Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            if code.is_none() {
                warn!(key, %filename, %value, "ignoring unreadable stored preference");
            }
            code.map(|code| (filename, Preference::from_code(code)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{fs, io, path::PathBuf};

    use super::*;
    use crate::{FileStore, MemoryStore};

    fn lambda() -> Lambda {
        Lambda::new("0.1")
    }

    /// Serves reads from its contents and rejects every write.
    #[derive(Debug)]
    struct ReadOnlyStore(MemoryStore);

    impl ReadOnlyStore {
        fn error() -> StoreError {
            StoreError::Io {
                path: PathBuf::from("read-only"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read only"),
            }
        }
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(Self::error())
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(Self::error())
        }
    }

    #[test]
    fn test_pending_legacy_len() {
        let mut memory = MemoryStore::new();
        memory
            .set(keys::LEGACY_FEEDBACK, r#"{"a.png":2,"b.png":-1}"#.to_owned())
            .unwrap();
        let mut feedback = FeedbackStore::open(memory, lambda());
        assert_eq!(feedback.pending_legacy_len(), 2);
        assert!(feedback.migrate_legacy().unwrap());
        assert_eq!(feedback.pending_legacy_len(), 0);
    }

    #[test]
    fn test_failed_write_keeps_previous_answers() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = FileStore::open(blocker.join("store.json"));
        let mut feedback = FeedbackStore::open(store, lambda());

        assert!(feedback.set("a.png", Preference::policy(1)).is_err());
        assert_eq!(feedback.get("a.png"), None);
        assert!(feedback.is_empty());
    }

    #[test]
    fn test_failed_migration_keeps_memory_empty() {
        let mut memory = MemoryStore::new();
        memory
            .set(keys::LEGACY_FEEDBACK, r#"{"a.png":2}"#.to_owned())
            .unwrap();
        let mut feedback = FeedbackStore::open(ReadOnlyStore(memory), lambda());

        assert!(feedback.migrate_legacy().is_err());
        assert!(feedback.is_empty());
        assert_eq!(feedback.get("a.png"), None);
    }

    #[test]
    fn test_set_is_persisted_and_idempotent() {
        let mut feedback = FeedbackStore::open(MemoryStore::new(), lambda());
        feedback.set("a.png", Preference::policy(1)).unwrap();
        let once = feedback.store().get("imageFeedback_0.1");
        feedback.set("a.png", Preference::policy(1)).unwrap();
        assert_eq!(feedback.store().get("imageFeedback_0.1"), once);
        assert_eq!(once.as_deref(), Some(r#"{"a.png":1}"#));

        let reopened = FeedbackStore::open(feedback.into_inner(), lambda());
        assert_eq!(reopened.get("a.png"), Some(Preference::policy(1)));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut feedback = FeedbackStore::open(MemoryStore::new(), lambda());
        feedback.set("a.png", Preference::policy(1)).unwrap();
        feedback.set("a.png", Preference::SKIPPED).unwrap();
        assert_eq!(feedback.get("a.png"), Some(Preference::SKIPPED));
    }

    #[test]
    fn test_lambdas_are_isolated() {
        let mut feedback = FeedbackStore::open(MemoryStore::new(), Lambda::new("0.5"));
        feedback.set("a.png", Preference::policy(2)).unwrap();
        let other = FeedbackStore::open(feedback.into_inner(), lambda());
        assert!(other.is_empty());
    }

    #[test]
    fn test_migrate_legacy() {
        let mut store = MemoryStore::new();
        store
            .set(keys::LEGACY_FEEDBACK, r#"{"x.png":2,"y.png":"-1"}"#.to_owned())
            .unwrap();
        store
            .set(keys::LEGACY_BENCHMARK_KEYS, r#"["ppo-7"]"#.to_owned())
            .unwrap();

        let mut feedback = FeedbackStore::open(store, lambda());
        assert!(feedback.is_empty());
        assert!(feedback.migrate_legacy().unwrap());
        assert_eq!(feedback.get("x.png"), Some(Preference::policy(2)));
        assert_eq!(feedback.get("y.png"), Some(Preference::SKIPPED));
        assert_eq!(feedback.benchmark_keys(), vec![EpisodeKey::new("ppo", 7)]);
        assert!(feedback.store().get("imageFeedback_0.1").is_some());

        // already scoped: nothing more to copy
        assert!(!feedback.migrate_legacy().unwrap());
    }

    #[test]
    fn test_migrate_keeps_existing_scoped_answers() {
        let mut store = MemoryStore::new();
        store
            .set(keys::LEGACY_FEEDBACK, r#"{"old.png":1}"#.to_owned())
            .unwrap();
        store
            .set("imageFeedback_0.1", r#"{"new.png":2}"#.to_owned())
            .unwrap();
        store
            .set("benchmarkEpisodeKeys_0.1", "[]".to_owned())
            .unwrap();
        store
            .set(keys::LEGACY_BENCHMARK_KEYS, r#"["ppo-7"]"#.to_owned())
            .unwrap();

        let mut feedback = FeedbackStore::open(store, lambda());
        assert!(!feedback.migrate_legacy().unwrap());
        assert_eq!(feedback.get("old.png"), None);
        assert!(feedback.benchmark_keys().is_empty());
    }

    #[test]
    fn test_unreadable_values_are_dropped() {
        let mut store = MemoryStore::new();
        store
            .set(
                "imageFeedback_0.1",
                r#"{"a.png":1,"b.png":"x","c.png":null}"#.to_owned(),
            )
            .unwrap();
        store
            .set("benchmarkEpisodeKeys_0.1", r#"["ok-1","broken"]"#.to_owned())
            .unwrap();
        let feedback = FeedbackStore::open(store, lambda());
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback.benchmark_keys(), vec![EpisodeKey::new("ok", 1)]);
    }

    #[test]
    fn test_clear_removes_scoped_data_and_backup() {
        let mut store = MemoryStore::new();
        store.set(keys::FEEDBACK_BACKUP, "{}".to_owned()).unwrap();
        let mut feedback = FeedbackStore::open(store, lambda());
        feedback.set("a.png", Preference::policy(1)).unwrap();
        feedback
            .save_benchmark_keys(&[EpisodeKey::new("a", 1)])
            .unwrap();
        feedback
            .save_session_seed(ShuffleSeed::from_bytes([1; 16]))
            .unwrap();
        feedback.set_annotator_id(Some("rater-1")).unwrap();

        feedback.clear().unwrap();
        assert!(feedback.is_empty());
        assert!(feedback.benchmark_keys().is_empty());
        assert!(feedback.session_seed().is_none());
        assert_eq!(feedback.annotator_id().as_deref(), Some("rater-1"));
        let store = feedback.into_inner();
        assert!(store.get(keys::FEEDBACK_BACKUP).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_session_seed_round_trip() {
        let mut feedback = FeedbackStore::open(MemoryStore::new(), lambda());
        assert!(feedback.session_seed().is_none());
        let seed = ShuffleSeed::from_bytes([0xab; 16]);
        feedback.save_session_seed(seed).unwrap();
        assert_eq!(feedback.session_seed(), Some(seed));
    }

    #[test]
    fn test_blank_annotator_is_forgotten() {
        let mut feedback = FeedbackStore::open(MemoryStore::new(), lambda());
        feedback.set_annotator_id(Some("  rater ")).unwrap();
        assert_eq!(feedback.annotator_id().as_deref(), Some("rater"));
        feedback.set_annotator_id(Some("")).unwrap();
        assert!(feedback.annotator_id().is_none());
    }
}
