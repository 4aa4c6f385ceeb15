//! File-based JSON audit storage
//!
//! Directory layout:
//! ```text
//! <base>/
//! ├── entries/
//! │   ├── aud-<uuid>.json
//! │   └── ...
//! └── violations/
//!     ├── vio-<uuid>.json
//!     └── ...
//! ```
//!
//! One file per record. Corrupt or unreadable files are skipped with a
//! warning so a damaged record never poisons the whole trail.

use crate::audit::storage::AuditStorage;
use crate::audit::types::{AuditEntry, Violation};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Audit storage backed by one JSON file per record
pub struct JsonFileStorage {
    entries_dir: PathBuf,
    violations_dir: PathBuf,
}

impl JsonFileStorage {
    /// Create the storage, making the directory layout under `base_dir`
    pub async fn new(base_dir: PathBuf) -> Result<Self> {
        let entries_dir = base_dir.join("entries");
        let violations_dir = base_dir.join("violations");

        tokio::fs::create_dir_all(&entries_dir).await?;
        tokio::fs::create_dir_all(&violations_dir).await?;

        Ok(Self {
            entries_dir,
            violations_dir,
        })
    }

    /// Load all JSON files from a directory into a Vec
    fn load_json_files<T: serde::de::DeserializeOwned>(dir: &Path) -> Vec<T> {
        let mut items = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                return items;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        items
    }

    async fn write_json<T: serde::Serialize>(dir: &Path, id: &str, value: &T) -> Result<()> {
        let path = dir.join(format!("{}.json", id));
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditStorage for JsonFileStorage {
    async fn save_entry(&self, entry: AuditEntry) -> Result<()> {
        Self::write_json(&self.entries_dir, &entry.id, &entry).await
    }

    async fn save_violation(&self, violation: Violation) -> Result<()> {
        Self::write_json(&self.violations_dir, &violation.id, &violation).await
    }

    async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = Self::load_json_files(&self.entries_dir)
            .into_iter()
            .filter(|entry: &AuditEntry| entity_id.is_empty() || entry.entity_id == entity_id)
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    async fn violations(&self, entity_id: Option<&str>) -> Result<Vec<Violation>> {
        let mut violations: Vec<Violation> = Self::load_json_files(&self.violations_dir)
            .into_iter()
            .filter(|violation: &Violation| {
                entity_id.map_or(true, |id| violation.entity_id == id)
            })
            .collect();
        violations.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(violations)
    }
}
