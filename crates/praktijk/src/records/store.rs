use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::domain::Document;

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Failure reading or writing the record document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record document {path} does not exist")]
    Missing { path: PathBuf },
    #[error("record document {path} could not be read: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("record document {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("record document could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("record document {path} could not be written: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// File-backed store for the single [`Document`].
///
/// Every mutation goes through [`DocumentStore::update`], which holds a lock
/// across the whole load-mutate-save cycle, and writes land through a sibling
/// temporary file renamed over the target.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    cycle: Mutex<()>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cycle: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, keeping "no file yet" and "unusable file" apart.
    pub fn read(&self) -> Result<Document, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::Missing {
                    path: self.path.clone(),
                }
            } else {
                StoreError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the document, degrading every failure to an empty document.
    pub fn load(&self) -> Document {
        match self.read() {
            Ok(document) => document,
            Err(err @ StoreError::Missing { .. }) => {
                debug!(error = %err, "starting from an empty record document");
                Document::default()
            }
            Err(err) => {
                warn!(error = %err, "record document unusable, falling back to empty");
                Document::default()
            }
        }
    }

    /// Overwrite the persisted document with `document`.
    pub fn save(&self, document: &Document) -> Result<(), StoreError> {
        let _cycle = self.lock_cycle();
        self.persist(document)
    }

    /// Run one serialized load-mutate-save cycle and return the closure's result.
    pub fn update<F, T>(&self, mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> T,
    {
        let _cycle = self.lock_cycle();
        let mut document = self.load();
        let outcome = mutate(&mut document);
        self.persist(&document)?;
        Ok(outcome)
    }

    fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(document).map_err(StoreError::Serialize)?;
        bytes.push(b'\n');
        self.write_atomic(&bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("data.json");
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let tmp = parent.join(format!(
            ".{file_name}.tmp.{}.{sequence}",
            std::process::id()
        ));

        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::domain::{LeavePeriod, Popup};
    use crate::records::test_support::scratch_dir;
    use chrono::Utc;

    fn sample_document() -> Document {
        Document {
            leave_periods: vec![LeavePeriod {
                id: 1_719_830_400_000,
                name: "Zomer".to_string(),
                start_date: "2024-07-01".to_string(),
                end_date: "2024-07-14".to_string(),
                created_at: Utc::now(),
            }],
            popups: vec![Popup {
                id: 42,
                title: "Sale".to_string(),
                content: "20% off".to_string(),
                active: true,
                created_at: Utc::now(),
            }],
        }
    }

    #[test]
    fn save_then_load_returns_the_same_document() {
        let dir = scratch_dir("roundtrip");
        let store = DocumentStore::new(dir.join("data.json"));
        let document = sample_document();

        store.save(&document).expect("save succeeds");

        assert_eq!(store.load(), document);
    }

    #[test]
    fn saved_file_is_pretty_printed() {
        let dir = scratch_dir("pretty");
        let store = DocumentStore::new(dir.join("data.json"));
        store.save(&Document::default()).expect("save succeeds");

        let raw = fs::read_to_string(store.path()).expect("file exists");
        assert_eq!(raw, "{\n  \"leavePeriods\": [],\n  \"popups\": []\n}\n");
    }

    #[test]
    fn missing_file_loads_as_empty_document() {
        let dir = scratch_dir("missing");
        let store = DocumentStore::new(dir.join("absent.json"));

        assert!(matches!(store.read(), Err(StoreError::Missing { .. })));
        assert_eq!(store.load(), Document::default());
    }

    #[test]
    fn corrupt_file_loads_as_empty_document() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("data.json");
        fs::write(&path, "{ not json").expect("write fixture");
        let store = DocumentStore::new(&path);

        assert!(matches!(store.read(), Err(StoreError::Corrupt { .. })));
        assert_eq!(store.load(), Document::default());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = scratch_dir("nested");
        let store = DocumentStore::new(dir.join("a").join("b").join("data.json"));

        store.save(&sample_document()).expect("save succeeds");

        assert!(store.path().exists());
    }

    #[test]
    fn save_into_a_file_path_parent_fails() {
        let dir = scratch_dir("blocked");
        let blocker = dir.join("blocker");
        fs::write(&blocker, "file, not a directory").expect("write fixture");
        let store = DocumentStore::new(blocker.join("data.json"));

        let err = store.save(&Document::default()).expect_err("parent is a file");
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn update_persists_the_mutation() {
        let dir = scratch_dir("update");
        let store = DocumentStore::new(dir.join("data.json"));

        let count = store
            .update(|document| {
                document.popups.extend(sample_document().popups);
                document.popups.len()
            })
            .expect("update succeeds");

        assert_eq!(count, 1);
        assert_eq!(store.read().expect("readable").popups.len(), 1);
    }

    #[test]
    fn concurrent_saves_leave_a_valid_document_and_no_temp_files() {
        let dir = scratch_dir("parallel-save");
        let store = std::sync::Arc::new(DocumentStore::new(dir.join("data.json")));

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store.save(&sample_document()).expect("save succeeds");
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer finished");
        }

        assert_eq!(store.read().expect("readable").popups.len(), 1);
        let leftovers: Vec<_> = fs::read_dir(&dir)
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
    }
}
