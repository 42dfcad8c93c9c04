use std::path::PathBuf;

/// Locations of the three account-store files.
///
/// Threaded into the engine explicitly so tests can point it at fixture
/// files; nothing below this struct assumes `/etc`.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub shadow: PathBuf,
    pub passwd: PathBuf,
    pub group: PathBuf,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            shadow: PathBuf::from("/etc/shadow"),
            passwd: PathBuf::from("/etc/passwd"),
            group: PathBuf::from("/etc/group"),
        }
    }
}
