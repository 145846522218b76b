//! jarmangle - Rename the bundled libraries of executable Spring Boot jars
//!
//! This tool moves every `BOOT-INF/lib/*.jar` entry to a short hashed name,
//! regenerates the classpath index and records the renames inside the jar.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use jarmangle_core::rewrite::temp_path;
use jarmangle_core::{
    rename_libraries, ArchiveRewriter, ErrorKind, RenameConfig, RenamePolicy, RenameSummary,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Rename the bundled libraries of an executable Spring Boot jar
#[derive(Parser, Debug)]
#[command(name = "jarmangle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Skip execution entirely
    #[arg(long, env = "JARMANGLE_SKIP")]
    skip: bool,

    /// Keep the original jar as <jar>.norename
    #[arg(
        long,
        env = "JARMANGLE_KEEP_ORIGINAL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    keep_original: bool,

    /// Suffix of the generated library names
    #[arg(long, env = "JARMANGLE_EXTENSION", default_value = jarmangle_core::config::DEFAULT_EXTENSION)]
    extension: String,

    /// Path of the mapping log inside the jar (empty disables it)
    #[arg(long, env = "JARMANGLE_MAPPING_FILE", default_value = jarmangle_core::config::DEFAULT_MAPPING_FILE)]
    mapping_file: String,

    /// Regular expression for libraries that keep their name (repeatable)
    #[arg(short = 's', long = "skip-pattern", env = "JARMANGLE_SKIP_PATTERNS")]
    skip_patterns: Vec<String>,

    /// Print the planned renames without modifying the jar
    #[arg(long)]
    dry_run: bool,

    /// Remove the temporary jar if the rewrite fails
    #[arg(long)]
    clean_temp: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = true)]
struct InputMode {
    /// Path to the jar to rewrite
    #[arg(short, long, conflicts_with_all = ["build_dir", "final_name"])]
    file: Option<PathBuf>,

    /// Build output directory holding the jar
    #[arg(short, long, requires = "final_name", env = "JARMANGLE_BUILD_DIR")]
    build_dir: Option<PathBuf>,

    /// Final artifact name, without the .jar extension
    #[arg(short = 'n', long, requires = "build_dir", env = "JARMANGLE_FINAL_NAME")]
    final_name: Option<String>,
}

impl InputMode {
    /// Resolves the jar to process
    fn jar_path(&self) -> Result<PathBuf> {
        match (&self.file, &self.build_dir, &self.final_name) {
            (Some(file), _, _) => Ok(file.clone()),
            (None, Some(dir), Some(name)) => Ok(dir.join(format!("{}.jar", name))),
            _ => bail!("Either --file or --build-dir with --final-name must be specified"),
        }
    }
}

impl Cli {
    fn config(&self) -> RenameConfig {
        RenameConfig::new()
            .keep_original(self.keep_original)
            .extension(self.extension.clone())
            .mapping_file(Some(self.mapping_file.clone()))
            .skip_patterns(self.skip_patterns.iter().filter(|pattern| !pattern.is_empty()).cloned())
    }
}

/// Process exit code for a failed run
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<jarmangle_core::Error>().map(|e| e.kind()) {
        Some(ErrorKind::InvalidArchive) => 2,
        Some(ErrorKind::Io) => 3,
        Some(ErrorKind::Replace) => 4,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error processing JAR file: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.skip {
        info!("Skipping jarmangle execution");
        return Ok(());
    }

    let jar = cli.input.jar_path()?;
    if !jar.is_file() {
        let shown = std::env::current_dir()
            .map(|dir| dir.join(&jar))
            .unwrap_or_else(|_| jar.clone());
        bail!("JAR file not found: {}", shown.display());
    }

    let config = cli.config();
    let policy = config.policy();
    for rejected in policy.rejected() {
        warn!("{}", rejected);
    }

    info!(
        "Configuration: keepOriginal={}, extension={}",
        config.keep_original, config.extension
    );
    if !policy.is_empty() {
        info!("Skip patterns: {:?}", policy.active_patterns());
    }

    if cli.dry_run {
        return print_plan(&jar, &config, &policy);
    }

    match rename_libraries(&jar, &config, &policy) {
        Ok(summary) => {
            report(&summary);
            Ok(())
        }
        Err(e) => {
            let temp = temp_path(&jar);
            if cli.clean_temp && e.kind() == ErrorKind::Io && temp.exists() {
                fs::remove_file(&temp)
                    .with_context(|| format!("Failed to remove {}", temp.display()))?;
            } else if temp.exists() {
                warn!("Partial output left at {}", temp.display());
            }
            Err(e).with_context(|| format!("Failed to rename libraries in {}", jar.display()))
        }
    }
}

/// Print what a rewrite would do
fn print_plan(jar: &Path, config: &RenameConfig, policy: &RenamePolicy) -> Result<()> {
    let log = ArchiveRewriter::from_config(config, policy)
        .plan(jar)
        .with_context(|| format!("Failed to read {}", jar.display()))?;

    for record in log.records() {
        if record.is_identity() {
            println!("{} (kept)", record.original);
        } else {
            println!("{} --> {}", record.original, record.renamed);
        }
    }
    println!(
        "Would rename {} of {} libraries in {}",
        log.renamed_count(),
        log.len(),
        jar.display()
    );
    Ok(())
}

fn report(summary: &RenameSummary) {
    println!(
        "Renamed {} libraries in {} ms ({} kept)",
        summary.log.renamed_count(),
        summary.elapsed.as_millis(),
        summary.processed() - summary.log.renamed_count()
    );
    if summary.prefix_len > 0 {
        info!("Preserved {} byte launch script", summary.prefix_len);
    }
    if let Some(backup) = &summary.backup {
        println!("Original kept at {}", backup.display());
    }
}
