//! Configuration types for fileproc
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Minimum task queue size
const MIN_QUEUE_SIZE: usize = 16;

/// Concurrent file processor with pluggable per-type operations
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fileproc",
    version,
    about = "Concurrent file processor with pluggable per-type operations",
    long_about = "Visits a directory and its immediate children, classifies each entry by \
                  content, and runs every registered worker that matches the requested \
                  operations on the entry's type. Matched work executes on a bounded \
                  thread pool; each execution is reported as one JSON log line.",
    after_help = "EXAMPLES:\n    \
        fileproc -d /var/data -o dir,sizeof\n    \
        fileproc -d . -o sizeof -w 8 --timeout 120\n    \
        fileproc -d /srv/files -o dir --exclude '\\.snapshot' -v"
)]
pub struct CliArgs {
    /// Directory (or single file) from which to start processing
    #[arg(short = 'd', long, value_name = "DIR")]
    pub directory: PathBuf,

    /// Operations to perform on each entry
    #[arg(
        short = 'o',
        long,
        value_name = "OP1,OP2,...",
        value_delimiter = ',',
        required = true
    )]
    pub operations: Vec<String>,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Task queue size (bounds memory usage, applies backpressure)
    #[arg(long, default_value = "1000", value_name = "NUM")]
    pub queue_size: usize,

    /// Overall run timeout in seconds, covering the walk and the drain
    #[arg(long, default_value = "60", value_name = "SECS")]
    pub timeout: u64,

    /// Exclude paths matching pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Quiet mode - suppress the end-of-run summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Default to 2x CPU cores, as the work is I/O bound
    num_cpus::get() * 2
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Entry point of the walk
    pub root: PathBuf,

    /// Operations to perform, in caller order (duplicates allowed)
    pub operations: Vec<String>,

    /// Number of worker threads
    pub worker_count: usize,

    /// Task queue capacity
    pub queue_size: usize,

    /// Wall-clock bound for the whole run
    pub timeout: Duration,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Print the end-of-run summary
    pub show_summary: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl ProcessConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Root must exist up front; everything else about it is the
        // dispatcher's problem
        if let Err(e) = std::fs::metadata(&args.directory) {
            return Err(ConfigError::InvalidRoot {
                path: args.directory.clone(),
                reason: e.to_string(),
            });
        }

        let operations: Vec<String> = args
            .operations
            .into_iter()
            .map(|op| op.trim().to_string())
            .filter(|op| !op.is_empty())
            .collect();

        if operations.is_empty() {
            return Err(ConfigError::EmptyOperations);
        }

        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if args.timeout == 0 {
            return Err(ConfigError::InvalidTimeout { secs: args.timeout });
        }

        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: args.directory,
            operations,
            worker_count: args.workers,
            queue_size: args.queue_size,
            timeout: Duration::from_secs(args.timeout),
            exclude_patterns,
            show_summary: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.exclude_patterns.iter().any(|re| re.is_match(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn base_args(root: &Path) -> CliArgs {
        CliArgs {
            directory: root.to_path_buf(),
            operations: vec!["dir".into(), "sizeof".into()],
            workers: 4,
            queue_size: 1000,
            timeout: 60,
            exclude_patterns: Vec::new(),
            quiet: false,
            verbose: false,
        }
    }

    #[test]
    fn test_from_args_valid() {
        let dir = tempdir().unwrap();
        let config = ProcessConfig::from_args(base_args(dir.path())).unwrap();

        assert_eq!(config.root, dir.path());
        assert_eq!(config.operations, vec!["dir", "sizeof"]);
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.show_summary);
    }

    #[test]
    fn test_missing_root_rejected() {
        let mut args = base_args(Path::new("/nonexistent/fileproc-test-root"));
        args.directory = PathBuf::from("/nonexistent/fileproc-test-root");

        let err = ProcessConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot { .. }));
    }

    #[test]
    fn test_empty_operations_rejected() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path());
        args.operations = vec!["".into(), "  ".into()];

        let err = ProcessConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyOperations));
    }

    #[test]
    fn test_operations_are_trimmed() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path());
        args.operations = vec![" dir".into(), "sizeof ".into()];

        let config = ProcessConfig::from_args(args).unwrap();
        assert_eq!(config.operations, vec!["dir", "sizeof"]);
    }

    #[test]
    fn test_worker_count_bounds() {
        let dir = tempdir().unwrap();

        let mut args = base_args(dir.path());
        args.workers = 0;
        assert!(matches!(
            ProcessConfig::from_args(args).unwrap_err(),
            ConfigError::InvalidWorkerCount { .. }
        ));

        let mut args = base_args(dir.path());
        args.workers = MAX_WORKERS + 1;
        assert!(matches!(
            ProcessConfig::from_args(args).unwrap_err(),
            ConfigError::InvalidWorkerCount { .. }
        ));
    }

    #[test]
    fn test_queue_size_minimum() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path());
        args.queue_size = MIN_QUEUE_SIZE - 1;

        assert!(matches!(
            ProcessConfig::from_args(args).unwrap_err(),
            ConfigError::InvalidQueueSize { .. }
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path());
        args.timeout = 0;

        assert!(matches!(
            ProcessConfig::from_args(args).unwrap_err(),
            ConfigError::InvalidTimeout { .. }
        ));
    }

    #[test]
    fn test_bad_exclude_pattern_rejected() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path());
        args.exclude_patterns = vec!["[unclosed".into()];

        assert!(matches!(
            ProcessConfig::from_args(args).unwrap_err(),
            ConfigError::InvalidExcludePattern { .. }
        ));
    }

    #[test]
    fn test_exclude_pattern_matching() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path());
        args.exclude_patterns = vec![r"\.snapshot".into()];

        let config = ProcessConfig::from_args(args).unwrap();
        assert!(config.is_excluded(Path::new("/data/.snapshot/hourly.0")));
        assert!(!config.is_excluded(Path::new("/data/myfile.txt")));
    }

    #[test]
    fn test_cli_operations_split_on_comma() {
        let dir = tempdir().unwrap();
        let args = CliArgs::try_parse_from([
            "fileproc",
            "-d",
            dir.path().to_str().unwrap(),
            "-o",
            "dir,sizeof",
        ])
        .unwrap();

        assert_eq!(args.operations, vec!["dir", "sizeof"]);
    }
}
