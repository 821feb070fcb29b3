use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};
use crate::stats::{StatInputSet, StatMode};
use crate::wire::{lenient_text_map, null_as_default};

/// Storage key for the stat sheet blob.
pub const SNAPSHOT_KEY: &str = "blz_player_stats";

/// Key/value backing for snapshots: `localStorage` in the browser, a map in tests.
pub trait SnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted stat sheet: raw input text per field key, the active mode and notes.
///
/// Raw text is stored rather than parsed numbers so a half-typed value
/// survives a reload exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSnapshot")]
pub struct StatSnapshot {
    pub mode: StatMode,
    pub stats: BTreeMap<String, String>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// On-disk shape. Blobs written before the mode toggle existed have no `mode`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSnapshot {
    #[serde(default)]
    mode: Option<StatMode>,
    #[serde(default, alias = "inputs", deserialize_with = "lenient_text_map")]
    stats: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    notes: String,
    #[serde(default)]
    last_updated: Option<String>,
}

impl From<StoredSnapshot> for StatSnapshot {
    fn from(stored: StoredSnapshot) -> Self {
        let mode = stored
            .mode
            .unwrap_or_else(|| infer_mode(&stored.stats));
        Self {
            mode,
            stats: stored.stats,
            notes: stored.notes,
            last_updated: stored.last_updated,
        }
    }
}

/// Goalkeeper when any goalkeeper field holds a positive value, else outfield.
fn infer_mode(stats: &BTreeMap<String, String>) -> StatMode {
    let keeper = StatInputSet::from_raw(StatMode::Goalkeeper, stats);
    if keeper.values().iter().any(|v| *v > 0.0) {
        StatMode::Goalkeeper
    } else {
        StatMode::Outfield
    }
}

impl StatSnapshot {
    pub fn input_set(&self) -> StatInputSet {
        StatInputSet::from_raw(self.mode, &self.stats)
    }

    pub fn raw_value(&self, key: &str) -> &str {
        self.stats.get(key).map(String::as_str).unwrap_or("")
    }

    /// Equal ignoring `last_updated`. Empty inputs and absent keys count as equal.
    pub fn same_content(&self, other: &Self) -> bool {
        let filled = |s: &Self| -> BTreeMap<String, String> {
            s.stats
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };
        self.mode == other.mode && self.notes == other.notes && filled(self) == filled(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// The stored blob already holds the same content; nothing was written.
    Unchanged,
}

/// Read the snapshot under `key`. `Ok(None)` when nothing has been stored yet.
pub fn load<S: SnapshotStore + ?Sized>(store: &S, key: &str) -> Result<Option<StatSnapshot>> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(SnapshotError::Malformed)
}

/// Overwrite the blob under `key` with `snapshot`, stamped by `now`.
///
/// When the stored blob decodes to the same content the store is left alone,
/// so repeated saves of an unchanged sheet keep the original timestamp.
pub fn save<S, F>(store: &mut S, key: &str, snapshot: &StatSnapshot, now: F) -> Result<SaveOutcome>
where
    S: SnapshotStore + ?Sized,
    F: FnOnce() -> String,
{
    if let Ok(Some(existing)) = load(&*store, key)
        && existing.same_content(snapshot)
    {
        return Ok(SaveOutcome::Unchanged);
    }

    let stamped = StatSnapshot {
        last_updated: Some(now()),
        ..snapshot.clone()
    };
    let json = serde_json::to_string(&stamped).map_err(SnapshotError::Encode)?;
    store.write(key, &json)?;
    Ok(SaveOutcome::Written)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{MemoryStore, SNAPSHOT_KEY, SaveOutcome, SnapshotStore, StatSnapshot, load, save};
    use crate::error::SnapshotError;
    use crate::stats::StatMode;

    fn sheet(pairs: &[(&str, &str)], notes: &str) -> StatSnapshot {
        StatSnapshot {
            mode: StatMode::Outfield,
            stats: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            notes: notes.to_string(),
            last_updated: None,
        }
    }

    #[test]
    fn missing_key_loads_as_none() {
        let store = MemoryStore::default();
        assert!(load(&store, SNAPSHOT_KEY).unwrap().is_none());
    }

    #[test]
    fn save_load_save_save_is_byte_identical() {
        let mut store = MemoryStore::default();
        let first = sheet(&[("sht", "8"), ("dbl", "7")], "good vision");

        let outcome = save(&mut store, SNAPSHOT_KEY, &first, || "t0".into()).unwrap();
        assert_eq!(outcome, SaveOutcome::Written);
        let bytes = store.raw(SNAPSHOT_KEY).unwrap().to_string();

        let loaded = load(&store, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(loaded.last_updated.as_deref(), Some("t0"));

        for stamp in ["t1", "t2"] {
            let outcome = save(&mut store, SNAPSHOT_KEY, &loaded, || stamp.into()).unwrap();
            assert_eq!(outcome, SaveOutcome::Unchanged);
            assert_eq!(store.raw(SNAPSHOT_KEY).unwrap(), bytes);
        }
    }

    #[test]
    fn changed_content_overwrites() {
        let mut store = MemoryStore::default();
        save(&mut store, SNAPSHOT_KEY, &sheet(&[("sht", "8")], ""), || "t0".into()).unwrap();
        let outcome =
            save(&mut store, SNAPSHOT_KEY, &sheet(&[("sht", "9")], ""), || "t1".into()).unwrap();
        assert_eq!(outcome, SaveOutcome::Written);

        let loaded = load(&store, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(loaded.raw_value("sht"), "9");
        assert_eq!(loaded.last_updated.as_deref(), Some("t1"));
    }

    #[test]
    fn mode_switch_counts_as_a_change() {
        let mut store = MemoryStore::default();
        let mut snapshot = sheet(&[], "");
        save(&mut store, SNAPSHOT_KEY, &snapshot, || "t0".into()).unwrap();
        snapshot.mode = StatMode::Goalkeeper;
        assert_eq!(
            save(&mut store, SNAPSHOT_KEY, &snapshot, || "t1".into()).unwrap(),
            SaveOutcome::Written
        );
    }

    #[test]
    fn legacy_blob_with_numbers_and_no_mode_loads() {
        let mut store = MemoryStore::default();
        store
            .write(
                SNAPSHOT_KEY,
                r#"{"stats":{"sht":8,"dbl":"7.5","stl":null,"dvg":""},"notes":null,"lastUpdated":"3/1/2026, 10:00:00 AM"}"#,
            )
            .unwrap();
        let loaded = load(&store, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(loaded.mode, StatMode::Outfield);
        assert_eq!(loaded.raw_value("sht"), "8");
        assert_eq!(loaded.raw_value("dbl"), "7.5");
        assert!(!loaded.stats.contains_key("stl"));
        assert_eq!(loaded.notes, "");
        assert_eq!(loaded.input_set().values(), &[8.0, 7.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn legacy_keeper_blob_loads_in_goalkeeper_mode() {
        let mut store = MemoryStore::default();
        store
            .write(SNAPSHOT_KEY, r#"{"stats":{"sht":"","dvg":9,"biq":"8","rfx":7,"dtg":"6"}}"#)
            .unwrap();
        let loaded = load(&store, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(loaded.mode, StatMode::Goalkeeper);
        assert_eq!(loaded.input_set().average(), 7.5);
    }

    #[test]
    fn explicit_mode_wins_over_field_contents() {
        let mut store = MemoryStore::default();
        store
            .write(SNAPSHOT_KEY, r#"{"mode":"outfield","stats":{"dvg":"9"}}"#)
            .unwrap();
        let loaded = load(&store, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(loaded.mode, StatMode::Outfield);
    }

    #[test]
    fn malformed_json_is_reported() {
        let mut store = MemoryStore::default();
        store.write(SNAPSHOT_KEY, "{not json").unwrap();
        assert!(matches!(
            load(&store, SNAPSHOT_KEY),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn malformed_blob_is_overwritten_on_save() {
        let mut store = MemoryStore::default();
        store.write(SNAPSHOT_KEY, "garbage").unwrap();
        let outcome = save(&mut store, SNAPSHOT_KEY, &sheet(&[], "x"), || "t".into()).unwrap();
        assert_eq!(outcome, SaveOutcome::Written);
        assert!(load(&store, SNAPSHOT_KEY).unwrap().is_some());
    }

    #[test]
    fn empty_inputs_match_absent_keys() {
        let a = sheet(&[("sht", "")], "");
        let b = StatSnapshot {
            stats: BTreeMap::new(),
            ..a.clone()
        };
        assert!(a.same_content(&b));
    }
}
