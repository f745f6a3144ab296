//! Storage kept entirely in memory.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};

use crate::AssetPath;
use crate::storage::{Entry, Storage};

/// In-memory storage keyed by [`AssetPath`].
///
/// ### Invariants
///
/// 1. **Root existence**: `Assets` and `Packages` are always present as directories.
/// 2. **Parent consistency**: every entry's parent exists and is a directory.
///
/// Removed entries are dropped; trashed entries are kept per bucket and can be
/// inspected with [`MapStorage::trashed`].
#[derive(Debug)]
pub struct MapStorage {
    entries: BTreeMap<AssetPath, Entry>,
    trash: BTreeMap<String, Vec<(AssetPath, Entry)>>,
}

impl MapStorage {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        for root in ["Assets", "Packages"] {
            if let Ok(path) = AssetPath::new(root) {
                entries.insert(path, Entry::dir());
            }
        }
        Self {
            entries,
            trash: BTreeMap::new(),
        }
    }

    /// Entries moved to the trash under `bucket`.
    pub fn trashed(&self, bucket: &str) -> Option<&[(AssetPath, Entry)]> {
        self.trash.get(bucket).map(|v| v.as_slice())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&AssetPath, &Entry)> {
        self.entries.iter()
    }

    fn take_tree(&mut self, path: &AssetPath) -> Result<Vec<(AssetPath, Entry)>> {
        if path.is_root() {
            return Err(anyhow!("invalid path: the root {path} cannot be removed"));
        }
        if !self.exists(path) {
            return Err(anyhow!("{path} does not exist"));
        }

        let removed: Vec<AssetPath> = self
            .entries
            .keys()
            .filter(|p| p.is_within(path))
            .cloned()
            .collect();

        Ok(removed
            .into_iter()
            .filter_map(|p| self.entries.remove_entry(&p))
            .collect())
    }
}

impl Default for MapStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MapStorage {
    fn exists(&self, path: &AssetPath) -> bool {
        self.entries.contains_key(path)
    }

    fn is_dir(&self, path: &AssetPath) -> Result<bool> {
        self.entries
            .get(path)
            .map(Entry::is_dir)
            .ok_or_else(|| anyhow!("{path} does not exist"))
    }

    fn mkdir(&mut self, path: &AssetPath) -> Result<()> {
        // Looking for the first existing parent
        let mut missing = Vec::new();
        let mut current = Some(path.clone());
        while let Some(p) = current {
            match self.entries.get(&p) {
                Some(entry) if entry.is_dir() => break,
                Some(_) => return Err(anyhow!("{p} exists but is not a directory")),
                None => {
                    current = p.parent();
                    missing.push(p);
                }
            }
        }

        // Create from the closest existing parent to the target path
        for p in missing.into_iter().rev() {
            self.entries.insert(p, Entry::dir());
        }
        Ok(())
    }

    fn read(&self, path: &AssetPath) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(path)
            .ok_or_else(|| anyhow!("file does not exist: {path}"))?;
        entry
            .content()
            .map(|c| c.to_vec())
            .ok_or_else(|| anyhow!("{path} is a directory"))
    }

    fn write(&mut self, path: &AssetPath, content: &[u8]) -> Result<()> {
        if self.entries.get(path).is_some_and(Entry::is_dir) {
            return Err(anyhow!("{path} is a directory"));
        }
        if let Some(parent) = path.parent() {
            self.mkdir(&parent)?;
        }
        self.entries.insert(path.clone(), Entry::file(content));
        Ok(())
    }

    fn rm(&mut self, path: &AssetPath) -> Result<()> {
        self.take_tree(path)?;
        Ok(())
    }

    fn move_to_trash(&mut self, path: &AssetPath, bucket: &str) -> Result<()> {
        let removed = self.take_tree(path)?;
        self.trash.entry(bucket.to_string()).or_default().extend(removed);
        Ok(())
    }
}
