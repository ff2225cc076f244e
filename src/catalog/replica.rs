// src/catalog/replica.rs

//! Replica catalog: logical file name → physical locations.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

/// Site name for files generated or discovered on the submit host.
pub const LOCAL_SITE: &str = "local";

/// Site name for raw survey images fetched from the archive.
pub const ARCHIVE_SITE: &str = "ipac";

/// One physical location of a logical file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replica {
    pub site: String,
    pub pfn: String,
}

/// Insert-only mapping from LFN to replicas.
///
/// Entries keep their registration order so the emitted catalog is stable.
/// A location, once added, is never changed or removed.
#[derive(Debug, Clone, Default)]
pub struct ReplicaCatalog {
    entries: Vec<(String, Vec<Replica>)>,
    index: HashMap<String, usize>,
}

impl ReplicaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pfn` at `site` for `lfn`. Re-registering an identical
    /// location is a no-op; a different location is added alongside.
    pub fn add_replica(
        &mut self,
        site: impl Into<String>,
        lfn: impl Into<String>,
        pfn: impl Into<String>,
    ) {
        let replica = Replica {
            site: site.into(),
            pfn: pfn.into(),
        };
        let lfn = lfn.into();
        debug!(lfn = %lfn, site = %replica.site, pfn = %replica.pfn, "registering replica");

        match self.index.get(&lfn) {
            Some(&idx) => {
                let replicas = &mut self.entries[idx].1;
                if !replicas.contains(&replica) {
                    replicas.push(replica);
                }
            }
            None => {
                self.index.insert(lfn.clone(), self.entries.len());
                self.entries.push((lfn, vec![replica]));
            }
        }
    }

    /// Register a file on the submit host by absolute path.
    pub fn add_local(&mut self, lfn: impl Into<String>, path: &Path) {
        self.add_replica(LOCAL_SITE, lfn, file_url(path));
    }

    pub fn contains(&self, lfn: &str) -> bool {
        self.index.contains_key(lfn)
    }

    pub fn replicas(&self, lfn: &str) -> &[Replica] {
        self.index
            .get(lfn)
            .map(|&idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Replica])> {
        self.entries
            .iter()
            .map(|(lfn, replicas)| (lfn.as_str(), replicas.as_slice()))
    }
}

/// `file://` URL for an absolute local path.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
