//! Render history — capped, FIFO-evicting store of past exports.
//!
//! Ids double as creation timestamps (milliseconds supplied by the
//! caller) and are clamped monotonic, so two renders landing in the
//! same millisecond still order correctly. With the `archive` feature
//! the store round-trips through the platform data directory: a JSON
//! index plus one `.wav` payload file per record.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of retained records; older records are evicted
/// first (pure FIFO, not LRU).
pub const HISTORY_CAP: usize = 100;

/// One stored render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Monotonically increasing creation id.
    pub id: u64,
    /// Wall-clock creation time in milliseconds.
    pub created_at_ms: u64,
    /// Suggested download filename.
    pub display_name: String,
    /// Encoded WAV bytes. Not part of the JSON index; the archive
    /// keeps payloads in sibling files.
    #[serde(skip)]
    pub payload: Vec<u8>,
}

/// The capped record store.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: VecDeque<HistoryRecord>,
    last_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        HistoryStore::default()
    }

    /// Append a render, evicting the oldest records beyond the cap.
    /// Returns the assigned id.
    pub fn append(&mut self, payload: Vec<u8>, display_name: &str, now_ms: u64) -> u64 {
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        self.records.push_back(HistoryRecord {
            id,
            created_at_ms: now_ms,
            display_name: display_name.to_string(),
            payload,
        });
        while self.records.len() > HISTORY_CAP {
            self.records.pop_front();
        }
        id
    }

    /// All records, newest first.
    pub fn list_all(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().rev()
    }

    /// Look up a record for replay/redownload.
    pub fn get(&self, id: u64) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(feature = "archive")]
mod archive {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use log::warn;

    use super::{HISTORY_CAP, HistoryRecord, HistoryStore};

    impl HistoryStore {
        /// The per-user history directory, if the platform exposes one.
        pub fn default_dir() -> Option<PathBuf> {
            directories::ProjectDirs::from("net", "quakeaudio", "quake-audio-core")
                .map(|dirs| dirs.data_dir().join("history"))
        }

        /// Write the index and payload files, pruning payloads of
        /// records that have since been evicted.
        pub fn save_to(&self, dir: &Path) -> io::Result<()> {
            fs::create_dir_all(dir)?;

            let index: Vec<&HistoryRecord> = self.records.iter().collect();
            let json = serde_json::to_vec_pretty(&index).map_err(io::Error::other)?;
            fs::write(dir.join("index.json"), json)?;

            for record in &self.records {
                fs::write(dir.join(format!("{}.wav", record.id)), &record.payload)?;
            }

            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "wav") {
                    let known = path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .and_then(|stem| stem.parse::<u64>().ok())
                        .is_some_and(|id| self.get(id).is_some());
                    if !known {
                        fs::remove_file(&path)?;
                    }
                }
            }
            Ok(())
        }

        /// Load a store previously written by [`Self::save_to`].
        ///
        /// A missing directory or index yields an empty store. Records
        /// whose payload file disappeared are dropped with a warning,
        /// and the cap is re-applied.
        pub fn load_from(dir: &Path) -> io::Result<Self> {
            let index_path = dir.join("index.json");
            if !index_path.exists() {
                return Ok(HistoryStore::new());
            }

            let json = fs::read(&index_path)?;
            let mut index: Vec<HistoryRecord> =
                serde_json::from_slice(&json).map_err(io::Error::other)?;
            index.sort_by_key(|r| r.id);

            let mut store = HistoryStore::new();
            for mut record in index {
                match fs::read(dir.join(format!("{}.wav", record.id))) {
                    Ok(payload) => {
                        record.payload = payload;
                        store.last_id = store.last_id.max(record.id);
                        store.records.push_back(record);
                    }
                    Err(e) => warn!("dropping history record {}: {e}", record.id),
                }
            }
            while store.records.len() > HISTORY_CAP {
                store.records.pop_front();
            }
            Ok(store)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_list_newest_first() {
        let mut store = HistoryStore::new();
        store.append(vec![1], "quake1_8D_LOW.wav", 1000);
        store.append(vec![2], "quake1_16D_HIGH.wav", 2000);
        store.append(vec![3], "quake1_OFF_OFF.wav", 3000);

        let names: Vec<&str> = store.list_all().map(|r| r.display_name.as_str()).collect();
        assert_eq!(
            names,
            ["quake1_OFF_OFF.wav", "quake1_16D_HIGH.wav", "quake1_8D_LOW.wav"]
        );
    }

    #[test]
    fn ids_stay_monotonic_within_one_millisecond() {
        let mut store = HistoryStore::new();
        let a = store.append(Vec::new(), "a.wav", 5000);
        let b = store.append(Vec::new(), "b.wav", 5000);
        let c = store.append(Vec::new(), "c.wav", 4000); // clock went backwards

        assert_eq!(a, 5000);
        assert_eq!(b, 5001);
        assert_eq!(c, 5002);
        assert_eq!(store.get(c).unwrap().created_at_ms, 4000);
    }

    #[test]
    fn eviction_is_fifo_at_cap() {
        let mut store = HistoryStore::new();
        for i in 0..101_u64 {
            store.append(vec![i as u8], &format!("r{i}.wav"), 1 + i);
        }

        assert_eq!(store.len(), 100);
        // The record with the smallest creation id is gone
        assert!(store.get(1).is_none());
        // The rest survive in original relative order
        let ids: Vec<u64> = store.list_all().map(|r| r.id).collect();
        let expected: Vec<u64> = (2..=101).rev().collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn get_returns_payload() {
        let mut store = HistoryStore::new();
        let id = store.append(vec![9, 9, 9], "x.wav", 42);
        assert_eq!(store.get(id).unwrap().payload, vec![9, 9, 9]);
        assert!(store.get(id + 1).is_none());
    }

    #[cfg(feature = "archive")]
    mod archive {
        use super::*;
        use std::path::PathBuf;

        fn scratch_dir(name: &str) -> PathBuf {
            let dir = std::env::temp_dir().join(format!(
                "quake-audio-history-{}-{name}",
                std::process::id()
            ));
            let _ = std::fs::remove_dir_all(&dir);
            dir
        }

        #[test]
        fn save_and_reload_roundtrip() {
            let dir = scratch_dir("roundtrip");
            let mut store = HistoryStore::new();
            store.append(vec![1, 2, 3], "quake1_8D_LOW.wav", 100);
            store.append(vec![4, 5], "quake1_OFF_EXTRA.wav", 200);
            store.save_to(&dir).unwrap();

            let loaded = HistoryStore::load_from(&dir).unwrap();
            assert_eq!(loaded.len(), 2);
            let newest = loaded.list_all().next().unwrap();
            assert_eq!(newest.display_name, "quake1_OFF_EXTRA.wav");
            assert_eq!(newest.payload, vec![4, 5]);

            // Appending continues past the highest persisted id
            let mut loaded = loaded;
            assert_eq!(loaded.append(Vec::new(), "next.wav", 0), 201);

            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[test]
        fn missing_dir_loads_empty() {
            let dir = scratch_dir("missing");
            let store = HistoryStore::load_from(&dir).unwrap();
            assert!(store.is_empty());
        }

        #[test]
        fn save_prunes_evicted_payloads() {
            let dir = scratch_dir("prune");
            let mut store = HistoryStore::new();
            store.append(vec![1], "a.wav", 10);
            store.save_to(&dir).unwrap();
            assert!(dir.join("10.wav").exists());

            // Evict record 10 by overflowing the cap
            for i in 0..HISTORY_CAP as u64 {
                store.append(Vec::new(), "b.wav", 100 + i);
            }
            store.save_to(&dir).unwrap();
            assert!(!dir.join("10.wav").exists());

            std::fs::remove_dir_all(&dir).unwrap();
        }
    }
}
