use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value store holding serialized configuration codes, grouped by
/// namespace. Typically the tool-chain's local service storage.
pub trait Storage {
    fn read(&self, key: &str, group: &str) -> Result<String>;
}

/// File-backed storage: one file per key, `<root>/<group>/<key>`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage rooted at `TRACKNET_STORAGE_DIR`, if that variable is set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os("TRACKNET_STORAGE_DIR").map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str, group: &str) -> Result<String> {
        let path = self.root.join(group).join(key);
        let data = fs::read_to_string(path)?;
        Ok(data.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn reads_trimmed_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("default")).unwrap();
        fs::write(dir.path().join("default").join("placement"), "AQIDBA\n").unwrap();

        let storage = LocalStorage::new(dir.path());
        assert_eq!(storage.read("placement", "default").unwrap(), "AQIDBA");
    }

    #[test]
    fn missing_entry_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        match storage.read("environment", "default") {
            Err(crate::error::Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
