//! The deduplicated item catalog and its JSON file

use crate::extract::ItemRecord;
use crate::storage::{write_atomic, StorageResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Captured item records, unique by title
///
/// Records keep the order they were captured in. The title set is derived
/// from the records and answers membership checks in constant time.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ItemRecord>,
    titles: HashSet<String>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from previously persisted records
    ///
    /// If the records contain a repeated title (the file was edited by hand),
    /// the first occurrence is kept and the rest are dropped.
    pub fn from_records(records: Vec<ItemRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            let title = record.title.clone();
            if !catalog.append(record) {
                tracing::warn!("Dropping repeated catalog entry for title '{}'", title);
            }
        }
        catalog
    }

    /// Returns true if an item with this title has been captured
    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Appends a record unless its title is already present
    ///
    /// # Returns
    ///
    /// * `true` - The record was added
    /// * `false` - A record with the same title exists; nothing changed
    pub fn append(&mut self, record: ItemRecord) -> bool {
        if self.titles.contains(&record.title) {
            return false;
        }
        self.titles.insert(record.title.clone());
        self.records.push(record);
        true
    }

    /// Returns the records in capture order
    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads and writes the catalog file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted catalog
    ///
    /// A missing, unreadable, or malformed file yields an empty catalog and a
    /// warning. Inside a valid array, entries that do not form a record are
    /// dropped one by one and the rest are kept. This never fails: the next
    /// persist replaces the bad file.
    pub fn load(&self) -> Catalog {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "Could not read catalog {} ({}), starting with an empty catalog",
                    self.path.display(),
                    e
                );
                return Catalog::new();
            }
        };

        match serde_json::from_str::<Vec<serde_json::Value>>(&content) {
            Ok(entries) => {
                let records = entries
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, entry)| {
                        match serde_json::from_value::<ItemRecord>(entry) {
                            Ok(record) => Some(record),
                            Err(e) => {
                                tracing::warn!(
                                    "Dropping catalog entry {} in {}: {}",
                                    index,
                                    self.path.display(),
                                    e
                                );
                                None
                            }
                        }
                    })
                    .collect();
                let catalog = Catalog::from_records(records);
                tracing::info!(
                    "Loaded {} items from {}",
                    catalog.len(),
                    self.path.display()
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(
                    "Catalog {} is not valid JSON ({}), starting with an empty catalog",
                    self.path.display(),
                    e
                );
                Catalog::new()
            }
        }
    }

    /// Atomically replaces the catalog file with the given catalog
    pub fn persist(&self, catalog: &Catalog) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(catalog.records())?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!(
            "Persisted {} items to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }
}
