//! # jarmangle-core
//!
//! A library for renaming the bundled libraries of executable Spring Boot jars.
//!
//! This crate provides the core functionality for:
//! - Detecting and preserving a launcher script prepended to the jar
//! - Moving `BOOT-INF/lib/*.jar` entries to short hashed names
//! - Regenerating `BOOT-INF/classpath.idx` and writing a rename mapping log
//! - Swapping the rewritten jar into place without losing the original
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`scanner`]: Launcher prefix detection
//! - [`naming`]: Name generation and skip patterns
//! - [`rewrite`]: Archive rewriting and the generated entries
//! - [`replace`]: Final swap of the rewritten archive
//! - [`config`]: Run options and archive layout constants
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use jarmangle_core::{rename_libraries, RenameConfig};
//!
//! let config = RenameConfig::new().skip_pattern(r"spring-boot-.*\.jar");
//! let policy = config.policy();
//! let summary = rename_libraries("target/app-1.0.jar", &config, &policy)?;
//!
//! for record in summary.log.records() {
//!     println!("{} --> {}", record.original, record.renamed);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`NameGenerator`]: Customize how replacement names are derived

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod config;
pub mod error;
pub mod naming;
pub mod replace;
pub mod rewrite;
pub mod scanner;

// Re-export primary types for convenience
pub use config::RenameConfig;
pub use error::{Error, ErrorKind, ReplaceAction, Result};
pub use naming::{DigestNamer, NameGenerator, RenamePolicy};
pub use replace::AtomicReplacer;
pub use rewrite::{
    rename_libraries, ArchiveRewriter, RenameLog, RenameRecord, RenameSummary, RewriteOutcome,
};
pub use scanner::{split_prefix, LauncherPrefix, PrefixSplitter};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
