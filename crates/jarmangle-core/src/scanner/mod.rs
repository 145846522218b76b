//! Launcher prefix detection.
//!
//! Executable Spring Boot jars may start with a shell launch script. The zip
//! data begins at the first local file header; everything before it is the
//! launcher prefix, which must be written back verbatim.
//!
//! ## Algorithm Overview
//!
//! 1. Read the source in bounded windows
//! 2. Feed each window to a [`SignatureMatcher`], which carries the last three
//!    bytes across reads
//! 3. Keep every byte before the match as the prefix
//!
//! The scan never reads past the window holding the signature, so archives of
//! any size are handled with constant memory beyond the prefix itself.

mod signature;

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, trace};

pub use signature::{SignatureMatcher, LOCAL_HEADER_SIGNATURE};

/// Default read window
pub const DEFAULT_WINDOW_SIZE: usize = 16 * 1024;

/// Bytes preceding the zip payload of a hybrid archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherPrefix {
    bytes: Vec<u8>,
}

impl LauncherPrefix {
    /// Creates a prefix from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the prefix as a slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of prefix bytes, which is also the offset of the zip payload
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a plain archive with no launcher
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Splits a launcher prefix from the zip payload that follows it
#[derive(Debug, Clone)]
pub struct PrefixSplitter {
    window_size: usize,
}

impl Default for PrefixSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixSplitter {
    /// Creates a splitter with the default window
    pub fn new() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Creates a splitter that reads `window_size` bytes at a time
    pub fn with_window_size(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }

    /// Reads from `source` until the first local file header.
    ///
    /// Returns `Ok(None)` when the input ends without a signature.
    pub fn split<R: Read>(&self, mut source: R) -> io::Result<Option<LauncherPrefix>> {
        let mut matcher = SignatureMatcher::new();
        let mut window = vec![0u8; self.window_size];
        let mut prefix = Vec::new();

        loop {
            let read = match source.read(&mut window) {
                Ok(0) => return Ok(None),
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            trace!("Scanning window at offset {} ({} bytes)", matcher.consumed(), read);

            let seen = matcher.consumed();
            match matcher.feed(&window[..read]) {
                Some(offset) => {
                    // A match may start in an earlier window; drop its carried bytes
                    let offset = offset as usize;
                    if offset >= seen as usize {
                        prefix.extend_from_slice(&window[..offset - seen as usize]);
                    } else {
                        prefix.truncate(offset);
                    }
                    return Ok(Some(LauncherPrefix::new(prefix)));
                }
                None => prefix.extend_from_slice(&window[..read]),
            }
        }
    }

    /// Scans the file at `path`.
    ///
    /// Fails with [`Error::InvalidArchive`] if no zip data is found.
    pub fn split_file(&self, path: impl AsRef<Path>) -> Result<LauncherPrefix> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        let prefix = self
            .split(file)
            .map_err(|e| Error::file_read(path, e))?
            .ok_or_else(|| Error::invalid_archive(path, "zip header not found"))?;

        debug!("Zip payload of {} starts at offset {}", path.display(), prefix.len());
        Ok(prefix)
    }
}

/// Reads the launcher prefix of the file at `path` with the default window
pub fn split_prefix(path: impl AsRef<Path>) -> Result<LauncherPrefix> {
    PrefixSplitter::new().split_file(path)
}
