//! Configuration management

mod preset;

pub use preset::{Preset, PresetExpansion};

use crate::types::MirraError;
use clap::Parser;
use std::path::PathBuf;

/// Default upper bound for copied files (100 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 104_857_600;

/// Smallest accepted `--maxsize` value (exclusive)
const MIN_MAX_SIZE: u64 = 100;

/// Characters that can never appear in a file extension
const INVALID_EXTENSION_CHARS: &[char] = &['/', '\\', '\0', '<', '>', ':', '"', '|', '?', '*'];

/// Command line arguments
#[derive(Debug, Parser)]
#[command(
    name = "mirra",
    version,
    about = "Mirror a directory into a backup folder, copying only what changed"
)]
pub struct Cli {
    /// File extensions to look for (all files are copied if omitted)
    #[arg(short = 'i', long = "include", value_delimiter = ',')]
    pub include: Vec<String>,

    /// File extensions to ignore
    #[arg(short = 'e', long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Preset filter for common file types; can't be combined with --include/--exclude
    #[arg(short = 'p', long, value_enum, ignore_case = true)]
    pub preset: Option<Preset>,

    /// Maximum size in bytes of files to copy
    #[arg(short = 'M', long = "maxsize", default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: u64,

    /// Source directory to back up
    #[arg(short = 's', long)]
    pub source: Option<PathBuf>,

    /// Use the current working directory as the source
    #[arg(long = "source-current")]
    pub source_current: bool,

    /// Directory that will hold the backup
    #[arg(short = 't', long)]
    pub target: PathBuf,

    /// Worker threads (0 = available parallelism)
    #[arg(short = 'T', long, default_value_t = 0)]
    pub threads: usize,

    /// Ring the terminal bell when the run completes
    #[arg(short = 'b', long)]
    pub beep: bool,

    /// Show extra statistics and scan diagnostics
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated configuration for a single sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Source directory
    pub source: PathBuf,

    /// Target directory; the mirror lives in `target/<source name>`
    pub target: PathBuf,

    /// Extensions to include (lower-cased, no leading dot)
    pub include: Vec<String>,

    /// Extensions to exclude (lower-cased, no leading dot)
    pub exclude: Vec<String>,

    /// Directory names skipped at any depth
    pub excluded_dirs: Vec<String>,

    /// Files larger than this are never copied
    pub max_size: u64,

    /// Requested worker threads (0 = available parallelism)
    pub threads: usize,

    pub verbose: bool,

    pub beep: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            excluded_dirs: Vec::new(),
            max_size: DEFAULT_MAX_SIZE,
            threads: 0,
            verbose: false,
            beep: false,
        }
    }
}

impl SyncConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), MirraError> {
        if self.max_size <= MIN_MAX_SIZE {
            return Err(MirraError::Config(format!(
                "The maximum size must be greater than {} bytes",
                MIN_MAX_SIZE
            )));
        }

        if !self.source.is_dir() {
            return Err(MirraError::Config(format!(
                "The source directory doesn't exist: {:?}",
                self.source
            )));
        }

        if !self.target.is_dir() {
            return Err(MirraError::Config(format!(
                "The target directory doesn't exist: {:?}",
                self.target
            )));
        }

        if !self.include.is_empty() && !self.exclude.is_empty() {
            return Err(MirraError::Config(
                "The list of extensions to exclude must be empty when extensions to include are specified"
                    .to_string(),
            ));
        }

        if self.source.file_name().is_none() {
            return Err(MirraError::Config(format!(
                "The source directory has no name to mirror under the target: {:?}",
                self.source
            )));
        }

        let source = self.source.canonicalize().map_err(MirraError::Io)?;
        let target = self.target.canonicalize().map_err(MirraError::Io)?;
        if target.starts_with(&source) {
            return Err(MirraError::Config(
                "The target directory can't be inside the source directory".to_string(),
            ));
        }

        Ok(())
    }

    /// Worker count for this machine: at least one, never above available parallelism.
    pub fn resolved_threads(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        match self.threads {
            0 => available,
            requested => requested.min(available),
        }
    }

    /// Folder inside `target` that mirrors `source`
    pub fn mirror_root(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.target.join(name),
            None => self.target.clone(),
        }
    }
}

impl TryFrom<Cli> for SyncConfig {
    type Error = MirraError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let include = normalize_extensions(&cli.include)?;
        let exclude = normalize_extensions(&cli.exclude)?;

        let source = match (cli.source, cli.source_current) {
            (Some(_), true) => {
                return Err(MirraError::Config(
                    "The --source-current and --source options can't be used at the same time"
                        .to_string(),
                ))
            }
            (Some(source), false) => source,
            (None, true) => std::env::current_dir().map_err(MirraError::Io)?,
            (None, false) => {
                return Err(MirraError::Config(
                    "The source directory can't be empty".to_string(),
                ))
            }
        };

        let mut config = SyncConfig {
            source: absolutize(source)?,
            target: absolutize(cli.target)?,
            include,
            exclude,
            excluded_dirs: Vec::new(),
            max_size: cli.max_size,
            threads: cli.threads,
            verbose: cli.verbose,
            beep: cli.beep,
        };

        if let Some(preset) = cli.preset {
            if !config.include.is_empty() || !config.exclude.is_empty() {
                return Err(MirraError::Config(
                    "The preset option cannot be used with --include or --exclude".to_string(),
                ));
            }
            preset.expand().apply_to(&mut config);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Lower-case, strip leading dots, and reject characters no extension can hold.
pub fn normalize_extensions(raw: &[String]) -> Result<Vec<String>, MirraError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for ext in raw {
        let trimmed = ext.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.contains(INVALID_EXTENSION_CHARS) {
            return Err(MirraError::Config(format!(
                "One or more file extensions are not valid: {:?}",
                ext
            )));
        }
        let lowered = trimmed.to_lowercase();
        if !out.contains(&lowered) {
            out.push(lowered);
        }
    }
    Ok(out)
}

fn absolutize(path: PathBuf) -> Result<PathBuf, MirraError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir().map_err(MirraError::Io)?.join(path))
    }
}
