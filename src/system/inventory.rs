//! Inventory of what is installed on this host
//!
//! Used by export. Every category is collected independently: a failing
//! query leaves that category empty and logs a warning, it never aborts
//! the export.

use super::detect::SystemInfo;
use super::registry::Registry;
use super::runner::capture;
use crate::types::Category;
use std::path::{Path, PathBuf};

/// Package names found on the host, per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub native: Vec<String>,
    pub flatpak: Vec<String>,
    pub appimage: Vec<String>,
    pub dotfiles: Vec<String>,
}

/// Query the installed packages of one backend category
pub fn query_category(info: &SystemInfo, category: Category) -> Vec<String> {
    let Ok(spec) = Registry::default().lookup(category, info) else {
        log::debug!("no {} backend, skipping inventory", category);
        return Vec::new();
    };
    let Some(argv) = spec.inventory else {
        return Vec::new();
    };

    match capture(argv) {
        Ok(stdout) => parse_name_lines(&stdout),
        Err(e) => {
            log::warn!("could not list {} packages: {}", category, e);
            Vec::new()
        }
    }
}

/// Collect the full inventory
pub fn collect(
    info: &SystemInfo,
    appimage_dirs: &[PathBuf],
    dotfiles: Option<(&Path, &[String])>,
) -> Inventory {
    Inventory {
        native: query_category(info, Category::Native),
        flatpak: query_category(info, Category::Flatpak),
        appimage: scan_appimages(appimage_dirs),
        dotfiles: dotfiles
            .map(|(home, candidates)| existing_dotfiles(home, candidates))
            .unwrap_or_default(),
    }
}

/// One name per line; blank lines and table headers are dropped
fn parse_name_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| *line != "Application ID")
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// File names of `*.AppImage` files, directory order then name order
pub fn scan_appimages(dirs: &[PathBuf]) -> Vec<String> {
    let mut found = Vec::new();
    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.to_lowercase().ends_with(".appimage"))
            .collect();
        names.sort();
        found.extend(names);
    }
    found
}

/// Home-relative paths from `candidates` that exist under `home`
pub fn existing_dotfiles(home: &Path, candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .filter(|rel| home.join(rel.as_str()).exists())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::detect::NativeManager;
    use std::fs;

    #[test]
    fn test_parse_name_lines() {
        let out = "htop\n\n  git  \nApplication ID\nvim 9.1\n";
        assert_eq!(parse_name_lines(out), vec!["htop", "git", "vim"]);
    }

    #[test]
    fn test_scan_appimages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Obsidian.AppImage"), b"").unwrap();
        fs::write(dir.path().join("balena.appimage"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("Fake.AppImage")).unwrap();

        let missing = dir.path().join("missing");
        let names = scan_appimages(&[missing, dir.path().to_path_buf()]);
        assert_eq!(names, vec!["Obsidian.AppImage", "balena.appimage"]);
    }

    #[test]
    fn test_existing_dotfiles() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(".bashrc"), b"").unwrap();
        fs::create_dir_all(home.path().join(".config/nvim")).unwrap();

        let candidates = vec![
            ".bashrc".to_string(),
            ".zshrc".to_string(),
            ".config/nvim".to_string(),
        ];
        assert_eq!(
            existing_dotfiles(home.path(), &candidates),
            vec![".bashrc", ".config/nvim"]
        );
    }

    #[test]
    fn test_missing_backend_yields_empty() {
        let info = SystemInfo::bare("unknown", NativeManager::Unknown);
        assert!(query_category(&info, Category::Native).is_empty());
        assert!(query_category(&info, Category::Flatpak).is_empty());
    }
}
