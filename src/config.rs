//! Configuration management for pkgport
//!
//! Handles loading, saving, and default configuration values.
//! Config file location: ~/.config/pkgport/config.toml

use crate::types::InstallMethod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub install: InstallOptions,
    pub paths: PathOptions,
    pub export: ExportOptions,
    pub ui: UiOptions,
}

impl Config {
    /// Get the config file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("pkgport");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }
}

/// How imports drive the backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallOptions {
    /// Method picked when the method prompt gets an empty answer
    pub default_method: InstallMethod,
    /// Answer assumed when the confirmation prompt gets an empty line
    pub confirm_default: bool,
    /// Prefix root-only verbs with sudo when not running as root
    pub use_sudo: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            default_method: InstallMethod::Batch,
            confirm_default: true,
            use_sudo: true,
        }
    }
}

/// Locations used by export and the snapshot scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    pub backup_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub appimage_dirs: Vec<PathBuf>,
}

impl Default for PathOptions {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data = home.join(".local/share/pkgport");
        Self {
            backup_dir: data.join("backups"),
            scripts_dir: data.join("scripts"),
            appimage_dirs: vec![home.join("Applications"), home.join(".local/bin")],
        }
    }
}

/// What `export --include-config` records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Home-relative paths, kept in the profile when they exist
    pub dotfiles: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        let dotfiles = [
            ".bashrc",
            ".zshrc",
            ".profile",
            ".gitconfig",
            ".vimrc",
            ".tmux.conf",
            ".config/nvim",
            ".config/fish",
            ".config/kitty",
            ".config/alacritty",
            ".config/starship.toml",
        ];
        Self {
            dotfiles: dotfiles.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiOptions {
    pub theme: ThemeName,
    pub color: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            theme: ThemeName::Gruvbox,
            color: true,
        }
    }
}

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Gruvbox,
    Nord,
    Plain,
}

impl ThemeName {
    #[cfg(test)]
    pub fn all() -> &'static [ThemeName] {
        &[ThemeName::Gruvbox, ThemeName::Nord, ThemeName::Plain]
    }
}
