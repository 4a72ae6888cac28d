/// Storage location resolution.
use std::path::{Path, PathBuf};

/// File name of the shared storage blob inside the data directory.
const STORAGE_FILE_NAME: &str = "ticklist.json";

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `TICKLIST_DATA_DIR` environment variable
/// 2. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TICKLIST_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}

/// Returns the default path of the shared storage blob.
pub fn default_storage_path() -> PathBuf {
    resolve_data_dir().join(STORAGE_FILE_NAME)
}
