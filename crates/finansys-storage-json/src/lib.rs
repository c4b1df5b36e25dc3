use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use finansys_core::{CoreError, SnapshotStorage, DEFAULT_STORAGE_KEY};
use finansys_domain::LedgerSnapshot;

const SNAPSHOT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence for the ledger snapshot.
///
/// The whole snapshot lives in `<dir>/<key>.json`. Writes go to a sibling
/// temp file first and are renamed into place, so a crash mid-write leaves
/// the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStorage {
    dir: PathBuf,
    key: String,
}

impl JsonSnapshotStorage {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self, CoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            key: key.into(),
        })
    }

    pub fn with_default_key(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::new(dir, DEFAULT_STORAGE_KEY)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", canonical_key(&self.key), SNAPSHOT_EXTENSION))
    }
}

impl SnapshotStorage for JsonSnapshotStorage {
    fn storage_key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<LedgerSnapshot>, CoreError> {
        let path = self.snapshot_path();
        match load_snapshot_from_path(&path) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(CoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no stored snapshot");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), CoreError> {
        save_snapshot_to_path(snapshot, &self.snapshot_path())
    }
}

/// Writes a snapshot to an arbitrary path, replacing any previous file.
pub fn save_snapshot_to_path(snapshot: &LedgerSnapshot, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_snapshot(snapshot)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_snapshot_from_path(path: &Path) -> Result<LedgerSnapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        DEFAULT_STORAGE_KEY.into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

fn serialize_snapshot(snapshot: &LedgerSnapshot) -> Result<String, CoreError> {
    serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))
}
