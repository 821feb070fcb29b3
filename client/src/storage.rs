use gloo_storage::{LocalStorage, Storage};

use relay_shared::SnapshotError;
use relay_shared::snapshot::{self, SNAPSHOT_KEY, SaveOutcome, SnapshotStore, StatSnapshot};

/// `window.localStorage`, read and written as raw strings so the stored
/// bytes are exactly what the snapshot serializer produced.
pub(crate) struct BrowserStore;

impl SnapshotStore for BrowserStore {
    fn read(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| SnapshotError::Store(format!("{e:?}")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| SnapshotError::Store(format!("{e:?}")))
    }
}

/// Stored stat sheet, or defaults when none is stored or it cannot be read.
pub(crate) fn load_sheet() -> StatSnapshot {
    match snapshot::load(&BrowserStore, SNAPSHOT_KEY) {
        Ok(Some(sheet)) => sheet,
        Ok(None) => StatSnapshot::default(),
        Err(e) => {
            web_sys::console::warn_1(&format!("Stat sheet load failed, using defaults: {e}").into());
            StatSnapshot::default()
        }
    }
}

pub(crate) fn save_sheet(sheet: &StatSnapshot) -> Option<SaveOutcome> {
    let now = || chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    match snapshot::save(&mut BrowserStore, SNAPSHOT_KEY, sheet, now) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            web_sys::console::warn_1(&format!("Stat sheet save failed: {e}").into());
            None
        }
    }
}
