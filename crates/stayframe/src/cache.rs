use std::collections::HashMap;
use std::sync::Arc;

use sf_io::LoadError;
use sf_table::Table;
use sha2::{Digest, Sha256};

/// Content-addressed table cache: the load-once behavior of the original
/// dashboard, as an explicit value instead of a hidden global. Keys are
/// the SHA-256 of the source bytes, so identical input always maps to
/// the same shared, immutable table. Callers wanting process-wide
/// caching put the cache itself behind their own one-time init.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<String, Arc<Table>>,
}

impl TableCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// SHA-256 hex digest of a source artifact.
    #[must_use]
    pub fn source_digest(source: &str) -> String {
        format!("{:x}", Sha256::digest(source.as_bytes()))
    }

    /// Return the cached table for this source, loading it on first use.
    pub fn get_or_load(&mut self, source: &str) -> Result<Arc<Table>, LoadError> {
        let digest = Self::source_digest(source);
        if let Some(table) = self.entries.get(&digest) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(sf_io::load_table_str(source)?);
        self.entries.insert(digest, Arc::clone(&table));
        Ok(table)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
