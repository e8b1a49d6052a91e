//! Snapshot persistence.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, instrument};

use contracts::{LaunchError, SensorSnapshot};

/// One JSON document per episode, named by the local date-time.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Human-readable episode filename for the current instant.
    pub fn episode_filename() -> String {
        Local::now().format("launch %Y-%m-%d %H.%M.%S.json").to_string()
    }

    /// Persist a snapshot under a freshly generated episode filename.
    ///
    /// # Errors
    /// [`LaunchError::SnapshotWrite`]; in-memory state is never touched.
    pub fn save(&self, snapshot: &SensorSnapshot) -> Result<PathBuf, LaunchError> {
        self.save_as(snapshot, &Self::episode_filename())
    }

    /// Persist a snapshot under an explicit filename (periodic flushes
    /// rewrite the same file).
    #[instrument(name = "snapshot_store_save", skip(self, snapshot))]
    pub fn save_as(
        &self,
        snapshot: &SensorSnapshot,
        filename: &str,
    ) -> Result<PathBuf, LaunchError> {
        let path = self.dir.join(filename);

        fs::create_dir_all(&self.dir)
            .map_err(|e| LaunchError::snapshot_write(path.display().to_string(), e.to_string()))?;

        let json = serde_json::to_vec(snapshot)
            .map_err(|e| LaunchError::snapshot_write(path.display().to_string(), e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| LaunchError::snapshot_write(path.display().to_string(), e.to_string()))?;

        metrics::counter!("recorder_flushes_total").increment(1);
        info!(path = %path.display(), samples = snapshot.total_samples(), "snapshot written");
        Ok(path)
    }

    /// Load a snapshot document.
    ///
    /// # Errors
    /// [`LaunchError::SnapshotRead`] for a missing or corrupt file; no
    /// partial state is returned.
    #[instrument(name = "snapshot_store_load", skip(self), fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SensorSnapshot, LaunchError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| LaunchError::snapshot_read(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&json)
            .map_err(|e| LaunchError::snapshot_read(path.display().to_string(), e.to_string()))
    }

    /// Remove a persisted episode file. A missing file is not an error,
    /// so cleanup after an episode that never flushed is a no-op.
    ///
    /// # Errors
    /// [`LaunchError::SnapshotWrite`] for any other filesystem failure.
    pub fn remove(&self, filename: &str) -> Result<(), LaunchError> {
        let path = self.dir.join(filename);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "snapshot removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LaunchError::snapshot_write(
                path.display().to_string(),
                e.to_string(),
            )),
        }
    }

    /// Persisted episode files, newest last (lexicographic on the
    /// date-time derived names).
    pub fn list(&self) -> Result<Vec<PathBuf>, LaunchError> {
        let mut files = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => {
                return Err(LaunchError::snapshot_read(
                    self.dir.display().to_string(),
                    e.to_string(),
                ))
            }
        };
        for entry in entries {
            let entry = entry
                .map_err(|e| LaunchError::snapshot_read(self.dir.display().to_string(), e.to_string()))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
