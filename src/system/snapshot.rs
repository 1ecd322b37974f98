//! Desktop and theme snapshot scripts
//!
//! The scripts are external collaborators. pkgport only finds them by file
//! name, runs them with a target directory, and checks whether that
//! directory and its optional `restore.sh` exist afterwards.

use super::runner::CommandRunner;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub const RESTORE_ENTRY: &str = "restore.sh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Desktop,
    Themes,
}

impl SnapshotKind {
    pub fn all() -> &'static [SnapshotKind] {
        &[SnapshotKind::Desktop, SnapshotKind::Themes]
    }

    pub fn script_name(&self) -> &'static str {
        match self {
            SnapshotKind::Desktop => "snapshot-desktop.sh",
            SnapshotKind::Themes => "snapshot-themes.sh",
        }
    }

    pub fn dir_prefix(&self) -> &'static str {
        match self {
            SnapshotKind::Desktop => "desktop-backup-",
            SnapshotKind::Themes => "themes-backup-",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SnapshotKind::Desktop => "desktop settings",
            SnapshotKind::Themes => "themes",
        }
    }

    /// e.g. `desktop-backup-20240115-084432`
    pub fn backup_name(&self, at: DateTime<Local>) -> String {
        format!("{}{}", self.dir_prefix(), at.format("%Y%m%d-%H%M%S"))
    }
}

/// A backup directory left behind by a snapshot script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub kind: SnapshotKind,
    pub dir: PathBuf,
    pub restore_script: Option<PathBuf>,
}

impl Backup {
    fn from_dir(kind: SnapshotKind, dir: PathBuf) -> Self {
        let restore = dir.join(RESTORE_ENTRY);
        Self {
            kind,
            restore_script: restore.is_file().then_some(restore),
            dir,
        }
    }
}

/// Run one snapshot script into a fresh timestamped directory
///
/// Returns `Ok(None)` when the script is not installed.
pub fn run_snapshot(
    kind: SnapshotKind,
    scripts_dir: &Path,
    backup_root: &Path,
    runner: &mut dyn CommandRunner,
) -> Result<Option<Backup>> {
    let script = scripts_dir.join(kind.script_name());
    if !script.is_file() {
        log::warn!("{} not found, skipping {} snapshot", script.display(), kind.label());
        return Ok(None);
    }

    std::fs::create_dir_all(backup_root)
        .with_context(|| format!("Failed to create backup directory {:?}", backup_root))?;

    let target = backup_root.join(kind.backup_name(Local::now()));
    let argv = vec![
        "sh".to_string(),
        script.to_string_lossy().into_owned(),
        target.to_string_lossy().into_owned(),
    ];
    runner
        .run(&argv)
        .with_context(|| format!("{} snapshot failed", kind.label()))?;

    if target.is_dir() {
        Ok(Some(Backup::from_dir(kind, target)))
    } else {
        Ok(latest_backup(kind, backup_root))
    }
}

/// Most recent backup of `kind` under `backup_root`, by directory name
pub fn latest_backup(kind: SnapshotKind, backup_root: &Path) -> Option<Backup> {
    let entries = std::fs::read_dir(backup_root).ok()?;
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter(|e| e.file_name().to_string_lossy().starts_with(kind.dir_prefix()))
        .map(|e| e.path())
        .max()
        .map(|dir| Backup::from_dir(kind, dir))
}
