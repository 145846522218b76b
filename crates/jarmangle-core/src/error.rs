//! Error types for the jarmangle-core library.
//!
//! This module provides error handling using the `thiserror` crate. Every
//! variant names the path it failed on, and [`Error::kind`] folds the variants
//! into the four categories a driver needs to pick an outcome.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for jarmangle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all jarmangle operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Input has no zip local file header anywhere in it
    #[error("invalid archive '{path}': {reason}")]
    InvalidArchive {
        /// Path to the rejected input
        path: PathBuf,
        /// What was missing
        reason: String,
    },

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The zip reader rejected the source archive or one of its entries
    #[error("failed to read archive '{path}': {source}")]
    ArchiveRead {
        /// Path to the source archive
        path: PathBuf,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// The zip writer failed while producing the rewritten archive
    #[error("failed to write archive '{path}': {source}")]
    ArchiveWrite {
        /// Path to the archive being written
        path: PathBuf,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// A filesystem step of the final swap failed
    #[error("{}", describe_replace(.action, .path, .temp, .backup.as_deref(), .source))]
    Replace {
        /// The step that failed
        action: ReplaceAction,
        /// Path the step operated on
        path: PathBuf,
        /// Rewritten archive, still on disk
        temp: PathBuf,
        /// Backup of the original, if it had already been moved aside
        backup: Option<PathBuf>,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A skip pattern failed to compile and was dropped
    #[error("invalid skip pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as supplied
        pattern: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },
}

/// Filesystem step performed while swapping the rewritten archive into place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceAction {
    /// Moving the original aside to its backup name
    Backup,
    /// Deleting the original
    Delete,
    /// Moving the rewritten archive onto the original path
    Install,
}

impl fmt::Display for ReplaceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplaceAction::Backup => "back up",
            ReplaceAction::Delete => "delete",
            ReplaceAction::Install => "install rewritten archive at",
        })
    }
}

fn describe_replace(
    action: &ReplaceAction,
    path: &Path,
    temp: &Path,
    backup: Option<&Path>,
    source: &std::io::Error,
) -> String {
    let mut message = format!(
        "failed to {} '{}': {}; rewritten archive kept at '{}'",
        action,
        path.display(),
        source,
        temp.display()
    );
    if let Some(backup) = backup {
        message.push_str(&format!(", original preserved at '{}'", backup.display()));
    }
    message
}

/// Coarse error categories a driver distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not an archive; nothing was written
    InvalidArchive,
    /// Reading the source or writing the temp archive failed
    Io,
    /// The final swap failed
    Replace,
    /// A recoverable configuration problem
    PolicyWarning,
}

impl Error {
    /// Creates a new invalid archive error
    pub fn invalid_archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new archive read error
    pub fn archive_read(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::ArchiveRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new archive write error
    pub fn archive_write(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::ArchiveWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new replace error
    pub fn replace(
        action: ReplaceAction,
        path: impl Into<PathBuf>,
        temp: impl Into<PathBuf>,
        backup: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Replace {
            action,
            path: path.into(),
            temp: temp.into(),
            backup,
            source,
        }
    }

    /// Creates a new invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Returns the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArchive { .. } => ErrorKind::InvalidArchive,
            Self::FileRead { .. }
            | Self::FileWrite { .. }
            | Self::ArchiveRead { .. }
            | Self::ArchiveWrite { .. } => ErrorKind::Io,
            Self::Replace { .. } => ErrorKind::Replace,
            Self::InvalidPattern { .. } => ErrorKind::PolicyWarning,
        }
    }

    /// Returns true if this is a recoverable error that should be skipped
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::PolicyWarning
    }
}
