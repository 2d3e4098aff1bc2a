use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::StorageError,
    utils::paths::{app_data_dir, backups_dir_in, data_dir_in, ensure_dir},
};

use super::{keys, KeyValueStore, Result};

const VALUE_EXTENSION: &str = "json";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

/// File-backed store: one `<key>.json` file per key under `<base>/data`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// Contents of one backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub entries: BTreeMap<String, serde_json::Value>,
}

impl JsonFileStore {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&app_root)?;
        let data_dir = data_dir_in(&app_root);
        let backups_dir = backups_dir_in(&app_root);
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            data_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn value_path(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", sanitize_key(key), VALUE_EXTENSION))
    }

    fn backup_dir(&self, user_id: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(user_id))
    }

    pub fn backup_path(&self, user_id: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(user_id).join(backup_name)
    }

    /// Snapshots the four per-user entries and prunes beyond the retention limit.
    pub fn backup_user(&self, user_id: &str, note: Option<&str>) -> Result<String> {
        self.backup_user_at(user_id, note, Utc::now())
    }

    pub fn backup_user_at(
        &self,
        user_id: &str,
        note: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let mut entries: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        for key in keys::for_user(user_id) {
            if let Some(raw) = self.get(&key)? {
                let value = serde_json::from_str(&raw).map_err(|err| StorageError::Corrupt {
                    key: key.clone(),
                    reason: err.to_string(),
                })?;
                entries.insert(key, value);
            }
        }

        let dir = self.backup_dir(user_id);
        ensure_dir(&dir)?;
        let label = sanitize_backup_note(note);
        let mut file_stem = format!(
            "{}_{}",
            canonical_name(user_id),
            at.format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = label.as_deref() {
            file_stem.push('_');
            file_stem.push_str(label);
        }
        let file_name = format!("{}.{}", file_stem, BACKUP_EXTENSION);
        let snapshot = BackupSnapshot {
            schema_version: BACKUP_SCHEMA_VERSION,
            created_at: at,
            user_id: user_id.to_string(),
            note: label,
            entries,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        let path = dir.join(&file_name);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        tracing::info!(user = user_id, backup = %file_name, "created backup");
        self.prune_backups(user_id)?;
        Ok(file_name)
    }

    /// Backup file names for `user_id`, newest first.
    pub fn list_backups(&self, user_id: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(user_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", canonical_name(user_id));
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b, &prefix)
                .cmp(&parse_backup_timestamp(a, &prefix))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    pub fn load_backup(&self, user_id: &str, backup_name: &str) -> Result<BackupSnapshot> {
        if backup_name.contains(['/', '\\']) || backup_name.contains("..") {
            return Err(StorageError::BackupNotFound(backup_name.to_string()));
        }
        let path = self.backup_path(user_id, backup_name);
        if !path.exists() {
            return Err(StorageError::BackupNotFound(backup_name.to_string()));
        }
        let data = fs::read_to_string(&path)?;
        let snapshot: BackupSnapshot =
            serde_json::from_str(&data).map_err(|err| StorageError::Corrupt {
                key: backup_name.to_string(),
                reason: err.to_string(),
            })?;
        if snapshot.schema_version > BACKUP_SCHEMA_VERSION {
            return Err(StorageError::Corrupt {
                key: backup_name.to_string(),
                reason: "backup is from a newer schema version".into(),
            });
        }
        Ok(snapshot)
    }

    /// Writes the backed-up entries back; keys absent from the backup are cleared.
    pub fn restore_backup(&self, user_id: &str, backup_name: &str) -> Result<()> {
        let snapshot = self.load_backup(user_id, backup_name)?;
        for key in keys::for_user(user_id) {
            match snapshot.entries.get(&key) {
                Some(value) => self.set(&key, &serde_json::to_string(value)?)?,
                None => self.remove(&key)?,
            }
        }
        tracing::info!(user = user_id, backup = backup_name, "restored backup");
        Ok(())
    }

    fn prune_backups(&self, user_id: &str) -> Result<()> {
        let backups = self.list_backups(user_id)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(user_id, entry);
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                found.push(stem.to_string());
            }
        }
        found.sort();
        Ok(found)
    }
}

/// Maps a key to a safe file stem. Keys built by [`keys`] pass through unchanged
/// unless the user id carries characters outside `[A-Za-z0-9_-]`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "user".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the `YYYYMMDD_HHMM` stamp that follows `prefix` in a backup name.
fn parse_backup_timestamp(name: &str, prefix: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(prefix)?;
    let stamp = rest.get(..13)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
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

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store_with_temp_dir(retention: usize) -> (JsonFileStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonFileStore::new(Some(temp.path().to_path_buf()), Some(retention))
            .expect("json store");
        (store, temp)
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn values_persist_as_files() {
        let (store, _guard) = store_with_temp_dir(3);
        store.set(&keys::income("42"), "55000").unwrap();
        assert!(store.value_path("paisapal_income_42").exists());
        assert_eq!(store.get("paisapal_income_42").unwrap().as_deref(), Some("55000"));
        assert_eq!(store.keys().unwrap(), ["paisapal_income_42"]);
        assert!(!store
            .base_dir()
            .join("data/paisapal_income_42.json.tmp")
            .exists());
    }

    #[test]
    fn retention_keeps_newest_backups() {
        let (store, _guard) = store_with_temp_dir(2);
        store.set(&keys::income("u1"), "100").unwrap();
        for minute in 0..4 {
            store.backup_user_at("u1", Some("Pay day"), at(minute)).unwrap();
        }
        let backups = store.list_backups("u1").unwrap();
        assert_eq!(
            backups,
            ["u1_20250201_1003_pay-day.json", "u1_20250201_1002_pay-day.json"]
        );
    }

    #[test]
    fn restore_rewrites_and_clears_entries() {
        let (store, _guard) = store_with_temp_dir(5);
        store.set(&keys::income("u1"), "100").unwrap();
        let name = store.backup_user_at("u1", None, at(5)).unwrap();
        store.set(&keys::income("u1"), "999").unwrap();
        store.set(&keys::goals("u1"), "[]").unwrap();

        store.restore_backup("u1", &name).unwrap();
        assert_eq!(store.get(&keys::income("u1")).unwrap().as_deref(), Some("100"));
        assert_eq!(store.get(&keys::goals("u1")).unwrap(), None);
    }

    #[test]
    fn missing_or_escaping_backup_names_are_rejected() {
        let (store, _guard) = store_with_temp_dir(5);
        assert!(matches!(
            store.restore_backup("u1", "nope.json"),
            Err(StorageError::BackupNotFound(_))
        ));
        assert!(matches!(
            store.restore_backup("u1", "../u2/x.json"),
            Err(StorageError::BackupNotFound(_))
        ));
    }

    #[test]
    fn timestamp_parsing_ignores_note_suffix() {
        let parsed = parse_backup_timestamp("abc_20240101_0930_weekly.json", "abc_");
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()));
        assert_eq!(sanitize_backup_note(Some("  Before  tax.run ")), Some("before-tax-run".into()));
    }
}
