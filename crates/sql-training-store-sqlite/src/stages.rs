use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sql_training_core::{Dataset, Stage};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Snapshot files and per-dataset manifests under one directory.
#[derive(Debug, Clone)]
pub struct StageStore {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageEntry {
    pub stage: u8,
    pub slug: String,
    pub file: String,
    pub sha256: String,
    pub table_counts: BTreeMap<String, i64>,
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageManifest {
    pub dataset: Dataset,
    pub entries: Vec<StageEntry>,
}

impl StageManifest {
    #[must_use]
    pub fn entry(&self, stage: u8) -> Option<&StageEntry> {
        self.entries.iter().find(|entry| entry.stage == stage)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&StageEntry> {
        self.entries.iter().max_by_key(|entry| entry.stage)
    }
}

impl StageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// # Errors
    /// Returns an error when the directory cannot be created.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create stage directory {}", self.root.display()))
    }

    #[must_use]
    pub fn snapshot_file_name(dataset: Dataset, stage: u8) -> String {
        format!("{dataset}-{stage:02}.sqlite3")
    }

    #[must_use]
    pub fn snapshot_path(&self, dataset: Dataset, stage: u8) -> PathBuf {
        self.root.join(Self::snapshot_file_name(dataset, stage))
    }

    #[must_use]
    pub fn manifest_path(&self, dataset: Dataset) -> PathBuf {
        self.root.join(format!("{dataset}-manifest.json"))
    }

    #[must_use]
    pub fn has_snapshot(&self, dataset: Dataset, stage: u8) -> bool {
        self.snapshot_path(dataset, stage).is_file()
    }

    /// Load the manifest, or an empty one when the dataset has never run.
    ///
    /// # Errors
    /// Returns an error when an existing manifest cannot be read or parsed.
    pub fn load_manifest(&self, dataset: Dataset) -> Result<StageManifest> {
        let path = self.manifest_path(dataset);
        if !path.exists() {
            return Ok(StageManifest {
                dataset,
                entries: Vec::new(),
            });
        }
        let raw = fs::read(&path)
            .with_context(|| format!("failed to read stage manifest {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse stage manifest {}", path.display()))
    }

    /// Record a completed stage. Entries for later stages are dropped, since
    /// their snapshots were built from an older copy of this one.
    ///
    /// # Errors
    /// Returns an error when the snapshot cannot be hashed or the manifest cannot be written.
    pub fn record(&self, stage: &Stage, table_counts: BTreeMap<String, i64>) -> Result<StageEntry> {
        let snapshot = self.snapshot_path(stage.dataset, stage.number);
        let entry = StageEntry {
            stage: stage.number,
            slug: stage.slug.to_string(),
            file: Self::snapshot_file_name(stage.dataset, stage.number),
            sha256: file_sha256(&snapshot)?,
            table_counts,
            completed_at: now_rfc3339()?,
        };

        let mut manifest = self.load_manifest(stage.dataset)?;
        manifest
            .entries
            .retain(|existing| existing.stage < stage.number);
        manifest.entries.push(entry.clone());

        let path = self.manifest_path(stage.dataset);
        let manifest_json =
            serde_json::to_vec_pretty(&manifest).context("failed to serialize stage manifest")?;
        fs::write(&path, manifest_json)
            .with_context(|| format!("failed to write stage manifest {}", path.display()))?;
        Ok(entry)
    }
}

/// Hex SHA-256 of a file's bytes.
///
/// # Errors
/// Returns an error when the file cannot be read.
pub fn file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {} for hashing", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = reader
            .read(&mut buffer)
            .with_context(|| format!("failed to read {} for hashing", path.display()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format RFC3339 timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(dataset: Dataset, number: u8) -> Result<Stage> {
        Ok(dataset.stage(number)?)
    }

    #[test]
    fn snapshot_names_are_zero_padded_per_dataset() {
        let store = StageStore::new("/tmp/stages");
        assert_eq!(
            store.snapshot_path(Dataset::Movies, 3),
            PathBuf::from("/tmp/stages/movies-03.sqlite3")
        );
        assert_eq!(
            store.manifest_path(Dataset::Shopify),
            PathBuf::from("/tmp/stages/shopify-manifest.json")
        );
    }

    #[test]
    fn recording_a_stage_drops_later_entries() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StageStore::new(dir.path());
        store.ensure_root()?;
        for number in [1, 2, 3] {
            fs::write(store.snapshot_path(Dataset::Movies, number), [number])?;
            store.record(&stage(Dataset::Movies, number)?, BTreeMap::new())?;
        }
        assert_eq!(store.load_manifest(Dataset::Movies)?.entries.len(), 3);

        fs::write(store.snapshot_path(Dataset::Movies, 2), b"rebuilt")?;
        let entry = store.record(&stage(Dataset::Movies, 2)?, BTreeMap::new())?;
        let manifest = store.load_manifest(Dataset::Movies)?;
        let stages = manifest
            .entries
            .iter()
            .map(|entry| entry.stage)
            .collect::<Vec<_>>();
        assert_eq!(stages, vec![1, 2]);
        assert_eq!(manifest.latest(), Some(&entry));
        assert_eq!(entry.slug, "insert-flat-data");
        assert_eq!(entry.file, "movies-02.sqlite3");
        Ok(())
    }

    #[test]
    fn digest_matches_known_sha256() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("abc.bin");
        fs::write(&path, b"abc")?;
        assert_eq!(
            file_sha256(&path)?,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        Ok(())
    }

    #[test]
    fn unknown_dataset_manifest_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StageStore::new(dir.path());
        let manifest = store.load_manifest(Dataset::Shopify)?;
        assert_eq!(manifest.dataset, Dataset::Shopify);
        assert!(manifest.entries.is_empty());
        assert!(!store.has_snapshot(Dataset::Shopify, 1));
        Ok(())
    }
}
