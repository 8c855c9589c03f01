//! Persisted launcher preferences
//!
//! The launcher keeps one string-set preference, [`HIDE_APPS`], holding the
//! keys of apps hidden from the drawer. The file is a flat TOML table of
//! string arrays so that other sets can live alongside it.
//!
//! Edits are read-modify-write under a per-store async lock, so concurrent
//! writers never lose an update. The file write runs on the blocking pool
//! under an exclusive `fs2` lock and is replaced atomically. The write and
//! the publish to observers happen in the same blocking task, so dropping an
//! edit future mid-flight never leaves the file and observers disagreeing.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use sml_core::prelude::*;
use tokio::sync::{watch, Mutex};

/// Preference key of the hidden-app set
pub const HIDE_APPS: &str = "HIDE_APPS";

type PreferenceFile = BTreeMap<String, BTreeSet<String>>;

/// Owner of the hidden-app set
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    hidden_tx: Arc<watch::Sender<BTreeSet<String>>>,
}

impl PreferenceStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let read_path = path.clone();
        let file = tokio::task::spawn_blocking(move || read_file(&read_path))
            .await
            .map_err(|e| Error::preferences(format!("Preference load failed: {}", e)))??;

        let hidden = file.get(HIDE_APPS).cloned().unwrap_or_default();
        debug!("Loaded {} hidden app(s) from {:?}", hidden.len(), path);

        let (hidden_tx, _) = watch::channel(hidden);
        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
            hidden_tx: Arc::new(hidden_tx),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current hidden-app keys
    pub fn hidden_apps(&self) -> BTreeSet<String> {
        self.hidden_tx.borrow().clone()
    }

    /// Receiver that sees every committed change to the hidden-app set
    pub fn observe_hidden_apps(&self) -> watch::Receiver<BTreeSet<String>> {
        self.hidden_tx.subscribe()
    }

    /// Returns `false` if the key was already hidden
    pub async fn add_hidden_app(&self, key: &str) -> Result<bool> {
        self.edit(|set| set.insert(key.to_string())).await
    }

    /// Returns `false` if the key was not hidden
    pub async fn remove_hidden_app(&self, key: &str) -> Result<bool> {
        self.edit(|set| set.remove(key)).await
    }

    /// Replace the whole set
    pub async fn set_hidden_apps(&self, keys: BTreeSet<String>) -> Result<bool> {
        self.edit(|set| {
            if *set == keys {
                return false;
            }
            *set = keys;
            true
        })
        .await
    }

    async fn edit<F>(&self, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut BTreeSet<String>) -> bool,
    {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;

        let mut next = self.hidden_tx.borrow().clone();
        if !apply(&mut next) {
            trace!("Hidden apps unchanged, skipping write");
            return Ok(false);
        }

        let path = self.path.clone();
        let hidden_tx = Arc::clone(&self.hidden_tx);
        // the write lock moves with the task and is held until observers see the new set
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            write_set(&path, HIDE_APPS, next.clone())?;
            debug!("Hidden apps now {}", next.len());
            hidden_tx.send_replace(next);
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::preferences(format!("Preference write failed: {}", e)))??;

        Ok(true)
    }
}

fn read_file(path: &Path) -> Result<PreferenceFile> {
    if !path.exists() {
        return Ok(PreferenceFile::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::preferences(format!("Failed to read {:?}: {}", path, e)))?;
    match toml::from_str(&content) {
        Ok(file) => Ok(file),
        Err(e) => {
            warn!("Failed to parse {:?}, starting empty: {}", path, e);
            Ok(PreferenceFile::new())
        }
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "preferences".to_string());
    path.with_file_name(format!(".{}.lock", name))
}

/// Store one set, keeping every other key in the file
fn write_set(path: &Path, key: &str, values: BTreeSet<String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::preferences(format!("Failed to create {:?}: {}", parent, e)))?;
    }

    let lock = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path(path))
        .map_err(|e| Error::preferences(format!("Failed to open preference lock: {}", e)))?;
    lock.lock_exclusive()
        .map_err(|e| Error::preferences(format!("Failed to lock preferences: {}", e)))?;

    let mut file = read_file(path)?;
    file.insert(key.to_string(), values);

    let content = toml::to_string_pretty(&file)
        .map_err(|e| Error::preferences(format!("Failed to serialize preferences: {}", e)))?;

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)
        .map_err(|e| Error::preferences(format!("Failed to write temp file: {}", e)))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| Error::preferences(format!("Failed to rename temp file: {}", e)))?;

    // lock released when `lock` is dropped
    trace!("Saved preferences to {:?}", path);
    Ok(())
}
