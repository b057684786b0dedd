//! Opening folders and web pages with the system handler
//!
//! Navigation is fire-and-forget: a failed launch is logged at debug level and
//! never reported to the user.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Folder holding the HTML overlay layout files, next to the executable
pub fn html_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("html")
}

/// Show `path` in the system file browser
pub fn open_folder(path: &Path) {
    debug!("Opening folder {}", path.display());
    if let Err(e) = open::that_detached(path) {
        debug!("Failed to open folder {}: {}", path.display(), e);
    }
}

/// Open `url` in the default browser
pub fn open_url(url: &str) {
    debug!("Opening {}", url);
    if let Err(e) = open::that_detached(url) {
        debug!("Failed to open {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_dir_is_named_html() {
        assert!(html_dir().ends_with("html"));
    }
}
