//! Archive rewriting.
//!
//! The rewriter streams every entry of a source archive into a new archive,
//! moving bundled libraries to generated names on the way.
//!
//! ## Algorithm Overview
//!
//! 1. Copy the launcher prefix to the output before any zip structure
//! 2. Walk the source entries in stored order:
//!    - libraries under `BOOT-INF/lib/` are renamed unless a skip pattern
//!      matches their base name
//!    - the classpath index is dropped, to be regenerated
//!    - everything else is copied as is
//! 3. Append the mapping log and the regenerated classpath index
//!
//! Entries are copied raw: compressed bytes, compression method, sizes, CRC
//! and timestamps all come from the source untouched.

mod manifest;

use crate::config::{RenameConfig, CLASSPATH_INDEX, LIBRARY_PREFIX, LIBRARY_SUFFIX, TEMP_SUFFIX};
use crate::error::{Error, Result};
use crate::naming::{DigestNamer, NameGenerator, RenamePolicy};
use crate::replace::AtomicReplacer;
use crate::scanner::PrefixSplitter;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use zip::{ZipArchive, ZipWriter};

pub use manifest::{RenameLog, RenameRecord};

/// How a source entry is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind<'a> {
    /// A bundled library, eligible for renaming
    Library {
        /// Final path segment of the entry name
        base_name: &'a str,
    },
    /// The classpath index, regenerated after the copy
    ClasspathIndex,
    /// A mapping log left by an earlier run, replaced by the new one
    StaleMapping,
    /// Copied unchanged
    Other,
}

/// True for `BOOT-INF/lib/*.jar` entry names
pub fn is_library(name: &str) -> bool {
    name.starts_with(LIBRARY_PREFIX) && name.ends_with(LIBRARY_SUFFIX)
}

/// Final path segment of an entry name
pub fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Classifies a source entry.
///
/// `replaces_mapping` is set when the run will write its own mapping log, in
/// which case an entry already at `mapping_path` is dropped.
pub fn classify<'a>(name: &'a str, mapping_path: Option<&str>, replaces_mapping: bool) -> EntryKind<'a> {
    if is_library(name) {
        EntryKind::Library {
            base_name: base_name(name),
        }
    } else if name == CLASSPATH_INDEX {
        EntryKind::ClasspathIndex
    } else if replaces_mapping && mapping_path == Some(name) {
        EntryKind::StaleMapping
    } else {
        EntryKind::Other
    }
}

/// Result of rewriting one archive
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// Launcher prefix length copied to the output
    pub prefix_len: usize,
    /// Entries in the output archive, synthetic ones included
    pub entries_written: usize,
    /// Rename decisions in source order
    pub log: RenameLog,
}

/// Streams a source archive into a renamed copy
#[derive(Debug)]
pub struct ArchiveRewriter<'p, N = DigestNamer> {
    policy: &'p RenamePolicy,
    namer: N,
    extension: String,
    mapping_file: Option<String>,
    splitter: PrefixSplitter,
}

impl<'p> ArchiveRewriter<'p, DigestNamer> {
    /// Creates a rewriter with the default namer, configured from `config`
    pub fn from_config(config: &RenameConfig, policy: &'p RenamePolicy) -> Self {
        Self::new(
            policy,
            DigestNamer,
            config.extension.clone(),
            config.mapping_path().map(str::to_string),
        )
    }
}

impl<'p, N: NameGenerator> ArchiveRewriter<'p, N> {
    /// Creates a rewriter
    pub fn new(
        policy: &'p RenamePolicy,
        namer: N,
        extension: impl Into<String>,
        mapping_file: Option<String>,
    ) -> Self {
        Self {
            policy,
            namer,
            extension: extension.into(),
            mapping_file: mapping_file.filter(|path| !path.is_empty()),
            splitter: PrefixSplitter::new(),
        }
    }

    /// Uses `splitter` for launcher prefix detection
    pub fn with_splitter(mut self, splitter: PrefixSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Decides the new name of a library entry
    fn decide(&self, entry_name: &str, base_name: &str) -> RenameRecord {
        if self.policy.should_skip(base_name) {
            info!("Skipping rename for: {} (matches skip pattern)", base_name);
            RenameRecord::kept(base_name, entry_name)
        } else {
            let renamed = self.namer.generate(base_name, &self.extension);
            info!("Renamed: {} -> {}", base_name, renamed);
            RenameRecord::renamed(base_name, renamed, LIBRARY_PREFIX)
        }
    }

    /// Lists the rename decisions for `source` without writing anything
    pub fn plan(&self, source: impl AsRef<Path>) -> Result<RenameLog> {
        let source = source.as_ref();
        let mut archive = open_archive(source)?;
        let mut log = RenameLog::new();

        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| Error::archive_read(source, e))?;
            let name = entry.name();
            if let EntryKind::Library { base_name } = classify(name, None, false) {
                log.insert(self.decide(name, base_name));
            }
        }

        Ok(log)
    }

    /// Writes the renamed copy of `source` to `destination`.
    ///
    /// On failure `destination` is left in place for inspection; `source` is
    /// never modified.
    pub fn rewrite(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<RewriteOutcome> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        let prefix = self.splitter.split_file(source)?;
        if !prefix.is_empty() {
            info!(
                "Found executable script of {} bytes at the beginning of {}",
                prefix.len(),
                source.display()
            );
        }

        let output = File::create(destination).map_err(|e| Error::file_write(destination, e))?;
        let mut output = BufWriter::new(output);
        output
            .write_all(prefix.as_bytes())
            .map_err(|e| Error::file_write(destination, e))?;

        let mut archive = open_archive(source)?;
        let mut writer = ZipWriter::new(output);

        let mapping_path = self.mapping_file.as_deref();
        let has_libraries = archive.file_names().any(is_library);
        let replaces_mapping = has_libraries && mapping_path.is_some();

        let mut log = RenameLog::new();
        let mut written = HashSet::new();

        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| Error::archive_read(source, e))?;
            let name = entry.name().to_string();

            let target = match classify(&name, mapping_path, replaces_mapping) {
                EntryKind::Library { base_name } => {
                    let record = self.decide(&name, base_name);
                    let target = record.final_path.clone();
                    if let Some(previous) = log.insert(record) {
                        warn!(
                            "Duplicate library name {}: mapping for {} replaced",
                            base_name, previous.final_path
                        );
                    }
                    target
                }
                EntryKind::ClasspathIndex => {
                    info!("Skipping original {}, will regenerate after processing all libraries", name);
                    continue;
                }
                EntryKind::StaleMapping => {
                    info!("Replacing mapping file left by an earlier run: {}", name);
                    continue;
                }
                EntryKind::Other => name.clone(),
            };

            if !written.insert(target.clone()) {
                warn!("Entry {} already written, dropping source entry {}", target, name);
                continue;
            }

            debug!("Copying {} as {}", name, target);
            writer
                .raw_copy_file_rename(entry, target)
                .map_err(|e| Error::archive_write(destination, e))?;
        }

        if !log.is_empty() {
            let now = manifest::timestamp_now();

            if let Some(mapping_path) = mapping_path {
                manifest::write_text_entry(&mut writer, mapping_path, &log.mapping_content(), now)
                    .map_err(|e| Error::archive_write(destination, e))?;
                written.insert(mapping_path.to_string());
                info!("Added mapping file: {}", mapping_path);
            }

            let index = log.classpath_index();
            manifest::write_text_entry(&mut writer, CLASSPATH_INDEX, &index, now)
                .map_err(|e| Error::archive_write(destination, e))?;
            written.insert(CLASSPATH_INDEX.to_string());
            info!(
                "Generated new classpath.idx file with {} library references",
                log.len()
            );
            debug!("Generated classpath.idx content:\n{}", index);
        }

        let output = writer
            .finish()
            .map_err(|e| Error::archive_write(destination, e))?;
        let file = output
            .into_inner()
            .map_err(|e| Error::file_write(destination, e.into_error()))?;
        file.sync_all().map_err(|e| Error::file_write(destination, e))?;

        Ok(RewriteOutcome {
            prefix_len: prefix.len(),
            entries_written: written.len(),
            log,
        })
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| Error::archive_read(path, e))
}

/// Sibling path with `suffix` appended to the file name
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Path of the temporary archive written for `archive`
pub fn temp_path(archive: impl AsRef<Path>) -> PathBuf {
    sibling_path(archive.as_ref(), TEMP_SUFFIX)
}

/// Summary of a completed rename run
#[derive(Debug, Clone)]
pub struct RenameSummary {
    /// The rewritten archive
    pub archive: PathBuf,
    /// Launcher prefix length preserved
    pub prefix_len: usize,
    /// Entries in the rewritten archive
    pub entries_written: usize,
    /// Rename decisions in source order
    pub log: RenameLog,
    /// Where the original archive was kept, if it was
    pub backup: Option<PathBuf>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RenameSummary {
    /// Number of libraries processed, skipped ones included
    pub fn processed(&self) -> usize {
        self.log.len()
    }
}

/// Rewrites `archive` in place.
///
/// The renamed copy is written to `<archive>.tmp` and swapped in only after it
/// is complete. If the rewrite fails the temp file stays on disk and `archive`
/// is untouched.
pub fn rename_libraries(
    archive: impl AsRef<Path>,
    config: &RenameConfig,
    policy: &RenamePolicy,
) -> Result<RenameSummary> {
    let archive = archive.as_ref();
    let started = Instant::now();

    info!("Processing JAR file: {}", archive.display());
    let temp = temp_path(archive);
    let outcome = ArchiveRewriter::from_config(config, policy).rewrite(archive, &temp)?;
    let backup = AtomicReplacer::new(config.keep_original).replace(archive, &temp)?;

    info!("Successfully processed JAR file: {}", archive.display());
    Ok(RenameSummary {
        archive: archive.to_path_buf(),
        prefix_len: outcome.prefix_len,
        entries_written: outcome.entries_written,
        log: outcome.log,
        backup,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_library() {
        assert!(is_library("BOOT-INF/lib/guava-32.1.3-jre.jar"));
        assert!(is_library("BOOT-INF/lib/nested/dir/a.jar"));
        assert!(!is_library("BOOT-INF/lib/"));
        assert!(!is_library("BOOT-INF/lib/native.so"));
        assert!(!is_library("BOOT-INF/classes/lib/a.jar"));
        assert!(!is_library("boot-inf/lib/a.jar"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("BOOT-INF/lib/a.jar"), "a.jar");
        assert_eq!(base_name("BOOT-INF/lib/x/y/b.jar"), "b.jar");
        assert_eq!(base_name("plain"), "plain");
    }

    #[test]
    fn test_classify() {
        let mapping = Some("BOOT-INF/mapping.log");
        assert_eq!(
            classify("BOOT-INF/lib/a.jar", mapping, true),
            EntryKind::Library { base_name: "a.jar" }
        );
        assert_eq!(classify("BOOT-INF/classpath.idx", mapping, true), EntryKind::ClasspathIndex);
        assert_eq!(classify("BOOT-INF/classpath.idx", None, false), EntryKind::ClasspathIndex);
        assert_eq!(classify("BOOT-INF/mapping.log", mapping, true), EntryKind::StaleMapping);
        assert_eq!(classify("BOOT-INF/mapping.log", mapping, false), EntryKind::Other);
        assert_eq!(classify("META-INF/MANIFEST.MF", mapping, true), EntryKind::Other);
    }

    #[test]
    fn test_sibling_paths() {
        let archive = Path::new("/build/target/app-1.0.jar");
        assert_eq!(temp_path(archive), PathBuf::from("/build/target/app-1.0.jar.tmp"));
        assert_eq!(
            sibling_path(archive, ".norename"),
            PathBuf::from("/build/target/app-1.0.jar.norename")
        );
    }
}
