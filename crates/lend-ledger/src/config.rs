use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use lend_types::LIBRARY_OWNER;

use crate::error::{LedgerError, LedgerResult};

/// Configuration for a [`LibraryContract`](crate::LibraryContract).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Owner recorded on books that are on the shelf.
    pub library_owner: String,
    /// Books written by `InitLedger`.
    pub seed_catalog: Vec<CatalogEntry>,
    /// Behavior of full-keyspace scans.
    pub scan: ScanConfig,
}

/// One book of the seed catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub book_id: String,
    pub name: String,
    pub author: String,
    pub price: u64,
}

impl CatalogEntry {
    pub fn new(
        book_id: impl Into<String>,
        name: impl Into<String>,
        author: impl Into<String>,
        price: u64,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            name: name.into(),
            author: author.into(),
            price,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip values that are neither a book nor a record instead of failing
    /// the scan.
    pub skip_undecodable: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            library_owner: LIBRARY_OWNER.to_string(),
            seed_catalog: Self::classic_catalog(),
            scan: ScanConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// The four classic novels every fresh ledger starts with.
    pub fn classic_catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("book1", "Journey to the West", "WuChengEn", 20),
            CatalogEntry::new("book2", "A Dream of Red Mansions", "CaoXueQin", 21),
            CatalogEntry::new("book3", "Three Kingdoms", "LuoGuanZhong", 22),
            CatalogEntry::new("book4", "Water Margin", "ShiNaiAn", 23),
        ]
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.library_owner.is_empty() {
            return Err(LedgerError::Config("library_owner must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for entry in &self.seed_catalog {
            if entry.book_id.is_empty() {
                return Err(LedgerError::Config("seed book with empty book_id".into()));
            }
            if !seen.insert(entry.book_id.as_str()) {
                return Err(LedgerError::Config(format!(
                    "duplicate seed book_id: {}",
                    entry.book_id
                )));
            }
        }
        Ok(())
    }
}
