//! Run configuration and archive layout constants.

use crate::naming::RenamePolicy;

/// Directory holding the bundled libraries
pub const LIBRARY_PREFIX: &str = "BOOT-INF/lib/";

/// File extension of a bundled library
pub const LIBRARY_SUFFIX: &str = ".jar";

/// Launcher classpath index, regenerated on every rewrite
pub const CLASSPATH_INDEX: &str = "BOOT-INF/classpath.idx";

/// Default location of the rename mapping inside the archive
pub const DEFAULT_MAPPING_FILE: &str = "BOOT-INF/mapping.log";

/// Default suffix of generated library names
pub const DEFAULT_EXTENSION: &str = ".lib";

/// Appended to the archive file name for the rewrite output
pub const TEMP_SUFFIX: &str = ".tmp";

/// Appended to the archive file name for the preserved original
pub const BACKUP_SUFFIX: &str = ".norename";

/// Options for one rename run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameConfig {
    /// Keep the original archive next to the rewritten one
    pub keep_original: bool,
    /// Suffix appended to generated names
    pub extension: String,
    /// Archive path of the mapping log (`None` disables it)
    pub mapping_file: Option<String>,
    /// Regular expressions exempting libraries from renaming
    pub skip_patterns: Vec<String>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            keep_original: true,
            extension: DEFAULT_EXTENSION.to_string(),
            mapping_file: Some(DEFAULT_MAPPING_FILE.to_string()),
            skip_patterns: Vec::new(),
        }
    }
}

impl RenameConfig {
    /// Creates a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the original archive is kept as a backup
    pub fn keep_original(mut self, keep: bool) -> Self {
        self.keep_original = keep;
        self
    }

    /// Sets the suffix of generated names
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the mapping log path; an empty path disables the log
    pub fn mapping_file(mut self, path: Option<impl Into<String>>) -> Self {
        let path: Option<String> = path.map(Into::into);
        self.mapping_file = path.filter(|path| !path.is_empty());
        self
    }

    /// Replaces the skip patterns
    pub fn skip_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one skip pattern
    pub fn skip_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.skip_patterns.push(pattern.into());
        self
    }

    /// Compiles the configured skip patterns
    pub fn policy(&self) -> RenamePolicy {
        RenamePolicy::new(&self.skip_patterns)
    }

    /// Mapping log path, if enabled
    pub fn mapping_path(&self) -> Option<&str> {
        self.mapping_file.as_deref().filter(|path| !path.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenameConfig::default();
        assert!(config.keep_original);
        assert_eq!(config.extension, ".lib");
        assert_eq!(config.mapping_path(), Some("BOOT-INF/mapping.log"));
        assert!(config.skip_patterns.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = RenameConfig::new()
            .keep_original(false)
            .extension(".bin")
            .mapping_file(Some("META-INF/renames.txt"))
            .skip_patterns(["a.*"])
            .skip_pattern("b.*");

        assert!(!config.keep_original);
        assert_eq!(config.extension, ".bin");
        assert_eq!(config.mapping_path(), Some("META-INF/renames.txt"));
        assert_eq!(config.skip_patterns, vec!["a.*", "b.*"]);
    }

    #[test]
    fn test_empty_mapping_file_disables_log() {
        let config = RenameConfig::new().mapping_file(Some(""));
        assert_eq!(config.mapping_path(), None);

        let config = RenameConfig::new().mapping_file(None::<String>);
        assert_eq!(config.mapping_path(), None);
    }
}
