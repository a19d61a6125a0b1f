//! Revealing the output folder after a successful run
//!
//! Optional, platform-specific side effect modelled as an injectable
//! capability. The engine invokes it only on a fully successful run; the
//! default implementation does nothing.

use std::path::Path;

/// Trait for opening a directory in the platform file browser
pub trait OutputFolderOpener: Send + Sync {
    /// Reveal `dir` to the user; failures are logged, never propagated
    fn open(&self, dir: &Path);
}

/// Default opener that does nothing
pub struct NoOpOpener;

impl OutputFolderOpener for NoOpOpener {
    fn open(&self, _dir: &Path) {}
}

/// Opens the folder with the platform file browser
///
/// Uses `explorer` on Windows, `open` on macOS, and `xdg-open` elsewhere.
pub struct PlatformOpener;

impl OutputFolderOpener for PlatformOpener {
    fn open(&self, dir: &Path) {
        let launcher = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        match std::process::Command::new(launcher).arg(dir).spawn() {
            Ok(_) => log::debug!("opened output folder {}", dir.display()),
            Err(e) => log::warn!("could not open output folder {}: {}", dir.display(), e),
        }
    }
}
