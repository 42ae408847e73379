//! Mapping-store file handling: path defaulting, loading, atomic saves.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use sqlveil::{load_mappings, save_mappings, MappingState};

/// The mapping state plus the file it came from and goes back to.
pub struct MappingStore {
    path: PathBuf,
    state: MappingState,
}

impl MappingStore {
    /// Open the store at `path`, or at the default location under the home
    /// directory. A missing file starts an empty session (and says so); an
    /// unreadable or corrupt file is an error — silently dropping a store
    /// would hide data loss.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(default_path);
        let state = match fs::read(&path) {
            Ok(bytes) => load_mappings(&bytes)
                .with_context(|| format!("loading mapping store {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("mapping store {} not found, starting empty", path.display());
                MappingState::new()
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading mapping store {}", path.display()))
            }
        };
        Ok(Self { path, state })
    }

    pub fn state(&self) -> &MappingState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MappingState {
        &mut self.state
    }

    /// Move the state out for a pipeline run; pair with [`put`].
    ///
    /// [`put`]: MappingStore::put
    pub fn take(&mut self) -> MappingState {
        std::mem::take(&mut self.state)
    }

    pub fn put(&mut self, state: MappingState) {
        self.state = state;
    }

    /// Write the store back. The bytes go to a sibling temp file which is
    /// renamed over the target, so a load-mutate-save cycle never leaves a
    /// torn file for a concurrent session to read.
    pub fn save(&self) -> Result<()> {
        let bytes = save_mappings(&self.state)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        tracing::debug!(bytes = bytes.len(), path = %self.path.display(), "saved mapping store");
        Ok(())
    }
}

fn default_path() -> PathBuf {
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".sqlveil").join("mappings.json")
}
