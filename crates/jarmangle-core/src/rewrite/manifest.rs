//! Rename records and the synthetic entries generated from them.
//!
//! Two text entries are derived from the records once every library has been
//! copied:
//!
//! - the mapping log, one `original --> final` line per record
//! - the classpath index, one `- "<final path>"` line per record
//!
//! Both follow record insertion order, which is the order libraries appear in
//! the source archive.

use chrono::{Datelike, Local, Timelike};
use std::io::{Seek, Write};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Name decision for one library entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    /// Base name in the source archive
    pub original: String,
    /// Base name in the rewritten archive
    pub renamed: String,
    /// Full entry path in the rewritten archive
    pub final_path: String,
}

impl RenameRecord {
    /// A library copied under its original path
    pub fn kept(base_name: impl Into<String>, entry_path: impl Into<String>) -> Self {
        let base_name = base_name.into();
        Self {
            renamed: base_name.clone(),
            original: base_name,
            final_path: entry_path.into(),
        }
    }

    /// A library moved to `directory` + `renamed`
    pub fn renamed(original: impl Into<String>, renamed: impl Into<String>, directory: &str) -> Self {
        let renamed = renamed.into();
        Self {
            original: original.into(),
            final_path: format!("{}{}", directory, renamed),
            renamed,
        }
    }

    /// True when the library kept its name
    pub fn is_identity(&self) -> bool {
        self.original == self.renamed
    }
}

/// Ordered rename records keyed by original base name.
///
/// Inserting a name that is already present replaces the earlier record in
/// place: the newest decision wins, the first position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameLog {
    records: Vec<RenameRecord>,
}

impl RenameLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `record`, returning the record it displaced, if any
    pub fn insert(&mut self, record: RenameRecord) -> Option<RenameRecord> {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.original == record.original)
        {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    /// Looks up the record for an original base name
    pub fn get(&self, original: &str) -> Option<&RenameRecord> {
        self.records.iter().find(|record| record.original == original)
    }

    /// Records in insertion order
    pub fn records(&self) -> &[RenameRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no library was processed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of libraries that received a generated name
    pub fn renamed_count(&self) -> usize {
        self.records.iter().filter(|record| !record.is_identity()).count()
    }

    /// Content of the mapping log entry
    pub fn mapping_content(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{} --> {}\n", record.original, record.renamed))
            .collect()
    }

    /// Content of the classpath index entry
    pub fn classpath_index(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("- \"{}\"\n", record.final_path))
            .collect()
    }
}

/// Current local time as a zip timestamp
pub(crate) fn timestamp_now() -> DateTime {
    let now = Local::now();
    DateTime::from_date_and_time(
        now.year().clamp(1980, 2107) as u16,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second().min(59) as u8,
    )
    .unwrap_or_default()
}

/// Writes a deflated text entry stamped with `modified`
pub(crate) fn write_text_entry<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    name: &str,
    content: &str,
    modified: DateTime,
) -> ZipResult<()> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(modified);
    writer.start_file(name, options)?;
    writer.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LIBRARY_PREFIX;
    use pretty_assertions::assert_eq;

    fn sample_log() -> RenameLog {
        let mut log = RenameLog::new();
        log.insert(RenameRecord::renamed("guava-32.1.3-jre.jar", "1a2b3c.lib", LIBRARY_PREFIX));
        log.insert(RenameRecord::kept(
            "spring-boot-3.2.0.jar",
            "BOOT-INF/lib/spring-boot-3.2.0.jar",
        ));
        log
    }

    #[test]
    fn test_mapping_content() {
        assert_eq!(
            sample_log().mapping_content(),
            "guava-32.1.3-jre.jar --> 1a2b3c.lib\n\
             spring-boot-3.2.0.jar --> spring-boot-3.2.0.jar\n"
        );
    }

    #[test]
    fn test_classpath_index_content() {
        assert_eq!(
            sample_log().classpath_index(),
            "- \"BOOT-INF/lib/1a2b3c.lib\"\n\
             - \"BOOT-INF/lib/spring-boot-3.2.0.jar\"\n"
        );
    }

    #[test]
    fn test_duplicate_original_is_last_write_wins() {
        let mut log = sample_log();
        let displaced = log.insert(RenameRecord::kept(
            "guava-32.1.3-jre.jar",
            "BOOT-INF/lib/shaded/guava-32.1.3-jre.jar",
        ));

        assert_eq!(displaced.map(|record| record.renamed), Some("1a2b3c.lib".to_string()));
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].final_path, "BOOT-INF/lib/shaded/guava-32.1.3-jre.jar");
        assert_eq!(log.renamed_count(), 0);
    }

    #[test]
    fn test_empty_log_renders_nothing() {
        let log = RenameLog::new();
        assert!(log.is_empty());
        assert_eq!(log.mapping_content(), "");
        assert_eq!(log.classpath_index(), "");
    }

    #[test]
    fn test_timestamp_now_is_valid() {
        let stamp = timestamp_now();
        assert!(stamp.year() >= 2020);
    }
}
