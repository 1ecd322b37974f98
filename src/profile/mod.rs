//! Export profiles
//!
//! A profile is the portable inventory written by `export` and replayed by
//! `import`. It is parsed once, never mutated, and dropped at exit.

pub mod codec;

pub use codec::{parse, serialize};

use crate::system::inventory::Inventory;
use crate::system::SystemInfo;
use crate::types::{Category, PackageCounts};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parsed profile contents
///
/// Package order is the order of the source document and drives the
/// 1-based numbering shown while browsing. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDocument {
    pub system_distro: String,
    pub system_package_manager: String,
    pub system_arch: String,
    pub native_packages: Vec<String>,
    pub flatpak_packages: Vec<String>,
    pub appimage_packages: Vec<String>,
    pub dotfiles: Vec<String>,
}

impl ProfileDocument {
    /// Build a profile describing this host
    pub fn from_host(info: &SystemInfo, inventory: Inventory) -> Self {
        Self {
            system_distro: info.distro.clone(),
            system_package_manager: info.native_package_manager.to_string(),
            system_arch: info.architecture.clone(),
            native_packages: inventory.native,
            flatpak_packages: inventory.flatpak,
            appimage_packages: inventory.appimage,
            dotfiles: inventory.dotfiles,
        }
    }

    pub fn packages(&self, category: Category) -> &[String] {
        match category {
            Category::Native => &self.native_packages,
            Category::Flatpak => &self.flatpak_packages,
            Category::AppImage => &self.appimage_packages,
        }
    }

    pub fn counts(&self) -> PackageCounts {
        PackageCounts {
            native: self.native_packages.len(),
            flatpak: self.flatpak_packages.len(),
            appimage: self.appimage_packages.len(),
            dotfiles: self.dotfiles.len(),
        }
    }
}

/// Read and parse a profile file
pub fn load(path: &Path) -> Result<ProfileDocument> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read profile {:?}", path))?;
    Ok(parse(&bytes))
}

/// Serialize and write a profile file, creating parent directories
pub fn save(path: &Path, doc: &ProfileDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let text = serialize(doc).context("Failed to serialize profile")?;
    fs::write(path, text).with_context(|| format!("Failed to write profile to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::detect::NativeManager;

    #[test]
    fn test_from_host() {
        let mut info = SystemInfo::bare("fedora", NativeManager::Dnf);
        info.architecture = "x86_64".into();
        let inventory = Inventory {
            native: vec!["htop".into()],
            flatpak: vec!["org.gimp.GIMP".into()],
            appimage: Vec::new(),
            dotfiles: vec![".bashrc".into()],
        };

        let doc = ProfileDocument::from_host(&info, inventory);
        assert_eq!(doc.system_distro, "fedora");
        assert_eq!(doc.system_package_manager, "dnf");
        assert_eq!(doc.system_arch, "x86_64");
        assert_eq!(
            doc.counts(),
            PackageCounts {
                native: 1,
                flatpak: 1,
                appimage: 0,
                dotfiles: 1
            }
        );
        assert_eq!(doc.packages(Category::Flatpak), ["org.gimp.GIMP".to_string()]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/profile.json");
        let doc = ProfileDocument {
            system_distro: "arch".into(),
            system_package_manager: "paru".into(),
            system_arch: "x86_64".into(),
            native_packages: vec!["git".into(), "git".into()],
            ..Default::default()
        };

        save(&path, &doc).unwrap();
        assert_eq!(load(&path).unwrap(), doc);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.json")).is_err());
    }
}
