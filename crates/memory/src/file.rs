use crate::{InMemoryStore, KeyStats, MemoryError, MemoryKey, MemoryStore, MemorySummary, Outcome};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// JSON-lines log on disk, one outcome per line, mirrored in memory.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    file: Mutex<File>,
    inner: InMemoryStore,
}

impl JsonlStore {
    /// Opens or creates the log at `path` and replays it. Lines that do not
    /// parse are skipped with a warning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut outcomes = Vec::new();
        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Outcome>(&line) {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => warn!(
                        path = %path.display(),
                        line = line_no + 1,
                        error = %err,
                        "skipping unreadable memory record"
                    ),
                }
            }
        }
        debug!(path = %path.display(), records = outcomes.len(), "memory log loaded");

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            inner: InMemoryStore::from_outcomes(outcomes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl MemoryStore for JsonlStore {
    fn record(&self, outcome: Outcome) -> Result<(), MemoryError> {
        let mut line = serde_json::to_string(&outcome)?;
        line.push('\n');
        {
            let mut file = self
                .file
                .lock()
                .map_err(|_| MemoryError::StoreUnavailable("lock poisoned".to_string()))?;
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }
        self.inner.record(outcome)
    }

    fn query(&self, key: &MemoryKey) -> Result<KeyStats, MemoryError> {
        self.inner.query(key)
    }

    fn summary(&self) -> Result<MemorySummary, MemoryError> {
        self.inner.summary()
    }
}
