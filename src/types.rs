//! Core data types for pkgport
//!
//! This module defines the shared vocabulary used by the detector, the
//! command builder, the profile codec and the import engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backend family handles a package.
///
/// The category of a package is positional: it is the profile array the
/// name came from, never something guessed from the name itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Native,
    Flatpak,
    AppImage,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[Category::Native, Category::Flatpak, Category::AppImage]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Native => "Native",
            Category::Flatpak => "Flatpak",
            Category::AppImage => "AppImage",
        }
    }

    /// Categories that can hand many names to one backend invocation
    pub fn supports_batch(&self) -> bool {
        matches!(self, Category::Native | Category::Flatpak)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Abstract intent that selects a command template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Install,
    Search,
    Remove,
    Update,
    Info,
    List,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Search => "search",
            Action::Remove => "remove",
            Action::Update => "update",
            Action::Info => "info",
            Action::List => "list",
        }
    }

    /// Actions that produce a meaningful command without package names
    pub fn allows_empty(&self) -> bool {
        matches!(self, Action::Update | Action::List)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package name tagged with the category it was listed under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    pub name: String,
    pub category: Category,
}

impl PackageRef {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// How to drive the backend for a multi-package install
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InstallMethod {
    #[default]
    Batch,
    Individual,
}

/// Result of installing one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Failed(String),
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed)
    }
}

/// Run-level tally of install outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSummary {
    pub installed: usize,
    pub failed: usize,
    pub total: usize,
}

impl InstallSummary {
    pub fn record(&mut self, outcome: &InstallOutcome) {
        self.total += 1;
        if outcome.is_installed() {
            self.installed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn merge(&mut self, other: InstallSummary) {
        self.installed += other.installed;
        self.failed += other.failed;
        self.total += other.total;
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// e.g. "2 installed · 1 failed · 3 total"
    pub fn line(&self) -> String {
        format!(
            "{} installed · {} failed · {} total",
            self.installed, self.failed, self.total
        )
    }
}

/// Per-category package counts, computed once from a parsed profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageCounts {
    pub native: usize,
    pub flatpak: usize,
    pub appimage: usize,
    pub dotfiles: usize,
}

impl PackageCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Native => self.native,
            Category::Flatpak => self.flatpak,
            Category::AppImage => self.appimage,
        }
    }

    pub fn packages_total(&self) -> usize {
        self.native + self.flatpak + self.appimage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = InstallSummary::default();
        summary.record(&InstallOutcome::Installed);
        summary.record(&InstallOutcome::Failed("exit 1".into()));
        summary.record(&InstallOutcome::Installed);

        assert_eq!(
            summary,
            InstallSummary {
                installed: 2,
                failed: 1,
                total: 3
            }
        );
        assert!(!summary.is_clean());
        assert_eq!(summary.line(), "2 installed · 1 failed · 3 total");
    }

    #[test]
    fn test_batch_eligibility() {
        assert!(Category::Native.supports_batch());
        assert!(Category::Flatpak.supports_batch());
        assert!(!Category::AppImage.supports_batch());
    }

    #[test]
    fn test_empty_allowed_actions() {
        assert!(Action::Update.allows_empty());
        assert!(Action::List.allows_empty());
        assert!(!Action::Install.allows_empty());
        assert!(!Action::Search.allows_empty());
    }
}
