//! Short name generation for library entries.
//!
//! A library keeps its identity through the mapping log, so the archive itself
//! only needs a stable, compact name. The default generator hashes the
//! original file name with MD5 and keeps the first three digest bytes.
//!
//! ## Extensibility
//!
//! The [`NameGenerator`] trait allows custom naming schemes:
//!
//! ```
//! use jarmangle_core::NameGenerator;
//!
//! struct Numbered;
//!
//! impl NameGenerator for Numbered {
//!     fn generate(&self, original: &str, suffix: &str) -> String {
//!         format!("{}{}", original.len(), suffix)
//!     }
//! }
//!
//! assert_eq!(Numbered.generate("guava-33.0.jar", ".lib"), "14.lib");
//! ```

mod policy;

use md5::{Digest, Md5};
use std::fmt::Write;

pub use policy::RenamePolicy;

/// Number of leading digest bytes kept in a generated name
pub const DIGEST_PREFIX_LEN: usize = 3;

/// Trait for mapping an original library name to its replacement
pub trait NameGenerator {
    /// Returns the new base name for `original`, ending in `suffix`
    fn generate(&self, original: &str, suffix: &str) -> String;
}

/// Default generator: six lowercase hex digits of the MD5 digest of the name
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestNamer;

impl NameGenerator for DigestNamer {
    fn generate(&self, original: &str, suffix: &str) -> String {
        let digest = Md5::digest(original.as_bytes());
        let mut name = String::with_capacity(DIGEST_PREFIX_LEN * 2 + suffix.len());
        for byte in &digest[..DIGEST_PREFIX_LEN] {
            // Writing to a String cannot fail
            let _ = write!(name, "{:02x}", byte);
        }
        name.push_str(suffix);
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_digests() {
        // md5("") = d41d8cd9..., md5("abc") = 90015098...
        assert_eq!(DigestNamer.generate("", ".lib"), "d41d8c.lib");
        assert_eq!(DigestNamer.generate("abc", ".lib"), "900150.lib");
        assert_eq!(
            DigestNamer.generate("The quick brown fox jumps over the lazy dog", ""),
            "9e107d"
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let first = DigestNamer.generate("spring-core-6.1.2.jar", ".lib");
        let second = DigestNamer.generate("spring-core-6.1.2.jar", ".lib");
        assert_eq!(first, second);
        assert_eq!(first.len(), 6 + ".lib".len());
        assert!(first[..6].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_suffix_is_appended_verbatim() {
        let name = DigestNamer.generate("guava-33.0.0-jre.jar", ".jar");
        assert!(name.ends_with(".jar"));
        assert_eq!(
            name[..6],
            DigestNamer.generate("guava-33.0.0-jre.jar", ".lib")[..6]
        );
    }

    #[test]
    fn test_no_collisions_across_typical_libraries() {
        let corpus = [
            "spring-boot-3.2.0.jar",
            "spring-boot-autoconfigure-3.2.0.jar",
            "spring-core-6.1.1.jar",
            "spring-context-6.1.1.jar",
            "spring-beans-6.1.1.jar",
            "spring-aop-6.1.1.jar",
            "spring-expression-6.1.1.jar",
            "spring-web-6.1.1.jar",
            "spring-webmvc-6.1.1.jar",
            "spring-jcl-6.1.1.jar",
            "jackson-databind-2.15.3.jar",
            "jackson-core-2.15.3.jar",
            "jackson-annotations-2.15.3.jar",
            "jackson-datatype-jsr310-2.15.3.jar",
            "tomcat-embed-core-10.1.16.jar",
            "tomcat-embed-el-10.1.16.jar",
            "tomcat-embed-websocket-10.1.16.jar",
            "logback-classic-1.4.11.jar",
            "logback-core-1.4.11.jar",
            "slf4j-api-2.0.9.jar",
            "log4j-to-slf4j-2.21.1.jar",
            "log4j-api-2.21.1.jar",
            "jul-to-slf4j-2.0.9.jar",
            "snakeyaml-2.2.jar",
            "micrometer-observation-1.12.0.jar",
            "micrometer-commons-1.12.0.jar",
            "guava-32.1.3-jre.jar",
            "commons-lang3-3.13.0.jar",
            "commons-io-2.15.0.jar",
            "hibernate-core-6.3.1.Final.jar",
            "HikariCP-5.0.1.jar",
            "postgresql-42.6.0.jar",
        ];

        let names: HashSet<_> = corpus
            .iter()
            .map(|original| DigestNamer.generate(original, ".lib"))
            .collect();
        assert_eq!(names.len(), corpus.len());
    }
}
