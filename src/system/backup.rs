//! Dotfile content backup for `export --include-config`
//!
//! Copies every configured dotfile under home into a timestamped directory
//! beneath the backup root. Directory trees are walked without following
//! symlinks; build output, caches and anything a local `.gitignore` names
//! are left behind, except for files that look like configuration.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use glob::Pattern;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DIR_PREFIX: &str = "dotfiles-backup-";
pub const INFO_FILE: &str = "backup_info.json";
const INFO_VERSION: &str = "1.0";

/// Deepest directory level copied below each dotfile directory
const MAX_DEPTH: usize = 10;

/// Build and cache directories that never hold configuration
const SKIP_DIRS: &[&str] = &[
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "node_modules",
    ".npm",
    ".yarn",
    "dist",
    "build",
    "target",
    ".venv",
    "venv",
    "virtualenv",
    ".git",
    ".svn",
    ".hg",
    ".gradle",
    "cmake-build-debug",
    "cmake-build-release",
    "zig-cache",
    "zig-out",
    ".stack-work",
    "_build",
    "coverage",
    ".nyc_output",
    "logs",
    "tmp",
    "temp",
    ".cache",
];

/// Directory names kept even when a skip rule matches
const KEEP_DIRS: &[&str] = &[".ssh", ".gnupg", ".config", ".local", ".aws", ".docker", ".kube"];

const SKIP_FILES: &[&str] = &[
    "*.pyc",
    "*.pyo",
    "*.so",
    "*.o",
    "*.class",
    "*.jar",
    "*.zip",
    "*.tar.gz",
    "*.7z",
    "*.swp",
    "*.swo",
    "*~",
    ".DS_Store",
    "*.tmp",
    "*.cache",
    "*.log",
    "core",
    "*.lock",
    "*.min.js",
    "*.map",
];

/// Files that always look like configuration, whatever a `.gitignore` says
const KEEP_FILES: &[&str] = &[
    ".*rc",
    ".*profile",
    ".env*",
    "*.conf",
    "*.config",
    "config.*",
    "*.toml",
    "*.yaml",
    "*.yml",
    "*.json",
    "*.lua",
    "*.vim",
];

/// What one backup run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackupStats {
    pub copied: usize,
    pub skipped: usize,
    pub errors: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotfileBackup {
    pub dir: PathBuf,
    pub stats: BackupStats,
    /// Nothing was written; `stats` counts what would have been copied
    pub dry_run: bool,
}

#[derive(Serialize)]
struct BackupInfo<'a> {
    timestamp: String,
    source: &'a Path,
    destination: &'a Path,
    paths: &'a [String],
    stats: BackupStats,
    version: &'static str,
}

/// e.g. `dotfiles-backup-20240115-084432`
pub fn backup_name(at: DateTime<Local>) -> String {
    format!("{}{}", DIR_PREFIX, at.format("%Y%m%d-%H%M%S"))
}

/// Copy `dotfiles` (relative to `home`) into a fresh directory under `backup_root`
///
/// Per-file failures are counted and logged; only failing to create the
/// backup directory or its info file is an error.
pub fn backup_dotfiles(
    home: &Path,
    dotfiles: &[String],
    backup_root: &Path,
    at: DateTime<Local>,
    dry_run: bool,
) -> Result<DotfileBackup> {
    let dir = backup_root.join(backup_name(at));
    if !dry_run {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create backup directory {:?}", dir))?;
    }

    let mut copier = Copier::new(dry_run);
    for relative in dotfiles {
        let source = home.join(relative);
        let metadata = match fs::symlink_metadata(&source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("dotfile {} not present, skipping", relative);
                continue;
            }
            Err(e) => {
                log::warn!("cannot read {}: {}", source.display(), e);
                copier.stats.errors += 1;
                continue;
            }
        };

        let target = dir.join(relative);
        if metadata.is_dir() {
            copier.copy_tree(&source, &target);
        } else {
            copier.copy_entry(&source, &target, metadata.file_type());
        }
    }

    let stats = copier.stats;
    if !dry_run {
        write_info(&dir, home, dotfiles, stats, at)?;
    }
    log::info!(
        "dotfile backup in {}: {} copied, {} skipped, {} errors, {} bytes",
        dir.display(),
        stats.copied,
        stats.skipped,
        stats.errors,
        stats.bytes
    );

    Ok(DotfileBackup {
        dir,
        stats,
        dry_run,
    })
}

fn write_info(
    dir: &Path,
    home: &Path,
    dotfiles: &[String],
    stats: BackupStats,
    at: DateTime<Local>,
) -> Result<()> {
    let info = BackupInfo {
        timestamp: at.to_rfc3339(),
        source: home,
        destination: dir,
        paths: dotfiles,
        stats,
        version: INFO_VERSION,
    };
    let path = dir.join(INFO_FILE);
    let text = serde_json::to_string_pretty(&info).context("Failed to serialize backup info")?;
    fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))
}

struct Copier {
    dry_run: bool,
    stats: BackupStats,
    skip_files: Vec<Pattern>,
    keep_files: Vec<Pattern>,
}

impl Copier {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            stats: BackupStats::default(),
            skip_files: compile(SKIP_FILES),
            keep_files: compile(KEEP_FILES),
        }
    }

    fn copy_tree(&mut self, source: &Path, target: &Path) {
        let mut ignored: HashMap<PathBuf, Vec<Pattern>> = HashMap::new();
        let mut entries = WalkDir::new(source)
            .follow_links(false)
            .min_depth(1)
            .max_depth(MAX_DEPTH)
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("cannot read {}: {}", source.display(), e);
                    self.stats.errors += 1;
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if self.skip_dir(&name) {
                    log::debug!("skipping directory {}", entry.path().display());
                    self.stats.skipped += 1;
                    entries.skip_current_dir();
                } else if entry.depth() == MAX_DEPTH {
                    log::warn!("maximum depth reached at {}", entry.path().display());
                }
                continue;
            }

            let parent = entry.path().parent().unwrap_or(source);
            let patterns = ignored
                .entry(parent.to_path_buf())
                .or_insert_with(|| gitignore_patterns(parent));
            if self.skip_file(relative, &name, patterns) {
                self.stats.skipped += 1;
                continue;
            }

            self.copy_entry(entry.path(), &target.join(relative), entry.file_type());
        }
    }

    fn skip_dir(&self, name: &str) -> bool {
        if KEEP_DIRS.contains(&name) {
            return false;
        }
        SKIP_DIRS.contains(&name) || matches_any(&self.skip_files, name)
    }

    fn skip_file(&self, relative: &Path, name: &str, ignored: &[Pattern]) -> bool {
        if matches_any(&self.keep_files, name) {
            return false;
        }
        let relative = relative.to_string_lossy();
        ignored
            .iter()
            .any(|pattern| pattern.matches(&relative) || pattern.matches(name))
            || matches_any(&self.skip_files, name)
    }

    /// Copy one regular file or recreate one symlink
    fn copy_entry(&mut self, source: &Path, target: &Path, file_type: FileType) {
        if !file_type.is_file() && !file_type.is_symlink() {
            log::debug!("skipping special file {}", source.display());
            self.stats.skipped += 1;
            return;
        }

        let result = if self.dry_run {
            log::info!("would copy {}", source.display());
            fs::symlink_metadata(source)
                .map(|metadata| if file_type.is_symlink() { 0 } else { metadata.len() })
                .map_err(anyhow::Error::from)
        } else {
            copy_one(source, target, file_type)
        };

        match result {
            Ok(bytes) => {
                self.stats.copied += 1;
                self.stats.bytes += bytes;
            }
            Err(e) => {
                log::warn!("failed to copy {}: {:#}", source.display(), e);
                self.stats.errors += 1;
            }
        }
    }
}

/// Links are recreated with their original target, never followed
fn copy_one(source: &Path, target: &Path, file_type: FileType) -> Result<u64> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    if file_type.is_symlink() {
        let link = fs::read_link(source)
            .with_context(|| format!("Failed to read symlink {:?}", source))?;
        std::os::unix::fs::symlink(&link, target)
            .with_context(|| format!("Failed to create symlink {:?}", target))?;
        Ok(0)
    } else {
        fs::copy(source, target).with_context(|| format!("Failed to copy to {:?}", target))
    }
}

/// Patterns from `dir/.gitignore`; negations are not supported and dropped
fn gitignore_patterns(dir: &Path) -> Vec<Pattern> {
    let path = dir.join(".gitignore");
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            log::warn!("could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(|line| line.trim_start_matches('/').trim_end_matches('/'))
        .filter_map(|line| Pattern::new(line).ok())
        .collect()
}

fn compile(patterns: &[&str]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|pattern| Pattern::new(pattern).ok())
        .collect()
}

fn matches_any(patterns: &[Pattern], name: &str) -> bool {
    patterns.iter().any(|pattern| pattern.matches(name))
}
