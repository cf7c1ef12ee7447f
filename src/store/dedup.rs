use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::app::Result;
use crate::domain::{Field, LeadRecord, NOT_FOUND};

const BOM: char = '\u{feff}';

/// Natural keys (full addresses) of every lead already in the output file.
///
/// Loaded once before a session starts and only ever grows while it runs.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    keys: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the address column of an existing output file.
    ///
    /// A missing file, an empty file, or a file without the address column
    /// all yield an empty index. Unreadable rows are skipped and invalid
    /// UTF-8 in an address is replaced lossily.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let address_header = Field::Address.header();
        let column = reader
            .byte_headers()?
            .iter()
            .position(|h| {
                String::from_utf8_lossy(h).trim_start_matches(BOM).trim() == address_header
            });

        let Some(column) = column else {
            debug!("No '{}' column in {}", address_header, path.display());
            return Ok(Self::new());
        };

        let mut index = Self::new();
        for row in reader.byte_records() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable row in {}: {}", path.display(), e);
                    continue;
                }
            };
            if let Some(raw) = row.get(column) {
                let key = String::from_utf8_lossy(raw);
                if !key.is_empty() && key != NOT_FOUND {
                    index.keys.insert(key.into_owned());
                }
            }
        }

        debug!("Loaded {} known addresses from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Whether this record's natural key is already known.
    pub fn is_duplicate(&self, record: &LeadRecord) -> bool {
        record
            .natural_key()
            .is_some_and(|key| self.contains_key(key))
    }

    /// Insert the record's key if it has one and it is new.
    ///
    /// Returns `false` for records without a key and for known keys.
    pub fn accept(&mut self, record: &LeadRecord) -> bool {
        match record.natural_key() {
            Some(key) => self.keys.insert(key.to_string()),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DedupIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}
