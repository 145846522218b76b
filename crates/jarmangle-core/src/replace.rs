//! Swapping the rewritten archive into place.
//!
//! The original is either moved aside to `<archive>.norename` or deleted, and
//! only then is the temp file renamed onto the archive path. The temp file is
//! never removed here: if any step fails it is the only complete copy of the
//! rewritten archive.

use crate::config::BACKUP_SUFFIX;
use crate::error::{Error, ReplaceAction, Result};
use crate::rewrite::sibling_path;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path the original archive is kept at when backups are enabled
pub fn backup_path(archive: impl AsRef<Path>) -> PathBuf {
    sibling_path(archive.as_ref(), BACKUP_SUFFIX)
}

/// Replaces an archive with its rewritten copy
#[derive(Debug, Clone, Copy)]
pub struct AtomicReplacer {
    keep_original: bool,
}

impl AtomicReplacer {
    /// Creates a replacer; `keep_original` moves the original aside instead of deleting it
    pub fn new(keep_original: bool) -> Self {
        Self { keep_original }
    }

    /// Moves `temp` onto `original`.
    ///
    /// Returns the backup location when the original was kept. An existing
    /// backup is overwritten.
    pub fn replace(&self, original: impl AsRef<Path>, temp: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let original = original.as_ref();
        let temp = temp.as_ref();

        let backup = if self.keep_original {
            let backup = backup_path(original);
            debug!("Keeping original JAR as: {}", backup.display());
            if backup.is_dir() {
                return Err(Error::replace(
                    ReplaceAction::Backup,
                    &backup,
                    temp,
                    None,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "backup path is a directory",
                    ),
                ));
            }
            fs::rename(original, &backup)
                .map_err(|e| Error::replace(ReplaceAction::Backup, original, temp, None, e))?;
            Some(backup)
        } else {
            debug!("Deleting original JAR file: {}", original.display());
            fs::remove_file(original)
                .map_err(|e| Error::replace(ReplaceAction::Delete, original, temp, None, e))?;
            None
        };

        debug!("Renaming {} to {}", temp.display(), original.display());
        fs::rename(temp, original).map_err(|e| {
            Error::replace(ReplaceAction::Install, original, temp, backup.clone(), e)
        })?;

        Ok(backup)
    }
}
