//! Directory-backed profile catalog.

use std::path::PathBuf;

use async_trait::async_trait;
use crowdtest_core::profile::{CustomerProfile, ProfileSource, ProfileSourceError};
use tracing::info;

/// Loads every `customer_*.json` file in a directory, in lexicographic order.
///
/// The directory is re-read on every call; the catalog is treated as external
/// data that may change between runs.
pub struct DirProfileSource {
    dir: PathBuf,
}

impl DirProfileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load(&self) -> Result<Vec<CustomerProfile>, ProfileSourceError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|err| ProfileSourceError::Io(format!("{}: {err}", self.dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.starts_with("customer_") && name.ends_with(".json")
                    })
            })
            .collect();
        paths.sort();

        let mut profiles = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| ProfileSourceError::Io(format!("{}: {err}", path.display())))?;
            let profile: CustomerProfile = serde_json::from_str(&raw).map_err(|err| {
                ProfileSourceError::Invalid(format!("{}: {err}", path.display()))
            })?;
            profiles.push(profile);
        }
        info!(dir = %self.dir.display(), count = profiles.len(), "loaded profile catalog");
        Ok(profiles)
    }
}

#[async_trait]
impl ProfileSource for DirProfileSource {
    async fn list_profiles(&self) -> Result<Vec<CustomerProfile>, ProfileSourceError> {
        self.load()
    }
}
