//! System detection
//!
//! Detects:
//! - The distribution id from /etc/os-release
//! - The native package manager (fixed priority, first match wins)
//! - Every installed language version manager
//! - Every cross-distro package source (Flatpak, Snap, AppImage tooling)
//!
//! Detection is never cached: callers detect once per run and share the
//! resulting snapshot by reference.

use super::registry::{
    ShellManager, EXTRA_SOURCES, NATIVE_BACKENDS, SHELL_VERSION_MANAGERS, SOURCE_BACKENDS,
    VERSION_MANAGERS,
};
use crate::error::DetectionError;
use std::fmt;
use std::path::PathBuf;

/// Native package managers pkgport knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeManager {
    Paru,
    Yay,
    Pacman,
    Apt,
    Dnf,
    Yum,
    Zypper,
    Apk,
    Unknown,
}

impl NativeManager {
    /// Every manager that maps to a registry entry
    pub fn all() -> &'static [NativeManager] {
        &[
            NativeManager::Paru,
            NativeManager::Yay,
            NativeManager::Pacman,
            NativeManager::Apt,
            NativeManager::Dnf,
            NativeManager::Yum,
            NativeManager::Zypper,
            NativeManager::Apk,
        ]
    }

    pub fn from_backend_name(name: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|manager| manager.backend_name() == Some(name))
            .unwrap_or(NativeManager::Unknown)
    }

    /// Registry name of the backend, `None` for `Unknown`
    pub fn backend_name(&self) -> Option<&'static str> {
        match self {
            NativeManager::Paru => Some("paru"),
            NativeManager::Yay => Some("yay"),
            NativeManager::Pacman => Some("pacman"),
            NativeManager::Apt => Some("apt"),
            NativeManager::Dnf => Some("dnf"),
            NativeManager::Yum => Some("yum"),
            NativeManager::Zypper => Some("zypper"),
            NativeManager::Apk => Some("apk"),
            NativeManager::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.backend_name().unwrap_or("unknown")
    }
}

impl fmt::Display for NativeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the host's package management capabilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub distro: String,
    pub native_package_manager: NativeManager,
    pub architecture: String,
    pub version_managers: Vec<String>,
    pub package_sources: Vec<String>,
    pub is_root: bool,
}

impl SystemInfo {
    /// A snapshot with no optional capabilities
    #[cfg(test)]
    pub fn bare(distro: &str, native: NativeManager) -> Self {
        Self {
            distro: distro.to_string(),
            native_package_manager: native,
            architecture: std::env::consts::ARCH.to_string(),
            version_managers: Vec::new(),
            package_sources: Vec::new(),
            is_root: false,
        }
    }

    /// Build a snapshot from raw probe results
    pub fn from_probes(
        os_release: Option<&str>,
        architecture: &str,
        is_root: bool,
        on_path: impl Fn(&str) -> bool,
    ) -> Self {
        let native_package_manager = NATIVE_BACKENDS
            .iter()
            .find(|spec| any_on_path(&on_path, spec.probe))
            .map(|spec| NativeManager::from_backend_name(spec.name))
            .unwrap_or(NativeManager::Unknown);

        let version_managers = VERSION_MANAGERS
            .iter()
            .filter(|(_, probes)| any_on_path(&on_path, probes))
            .map(|(name, _)| name.to_string())
            .collect();

        let package_sources = SOURCE_BACKENDS
            .iter()
            .map(|spec| (spec.name, spec.probe))
            .chain(EXTRA_SOURCES.iter().copied())
            .filter(|(_, probes)| any_on_path(&on_path, probes))
            .map(|(name, _)| name.to_string())
            .collect();

        Self {
            distro: os_release
                .and_then(parse_os_release_id)
                .unwrap_or_else(|| "unknown".to_string()),
            native_package_manager,
            architecture: architecture.to_string(),
            version_managers,
            package_sources,
            is_root,
        }
    }

    /// Append the shell-function version managers that `installed` accepts
    pub fn with_shell_managers(mut self, installed: impl Fn(&ShellManager) -> bool) -> Self {
        self.version_managers.extend(
            SHELL_VERSION_MANAGERS
                .iter()
                .filter(|manager| installed(manager))
                .map(|manager| manager.name.to_string()),
        );
        self
    }

    pub fn has_native(&self) -> bool {
        self.native_package_manager != NativeManager::Unknown
    }

    pub fn has_source(&self, name: &str) -> bool {
        self.package_sources.iter().any(|s| s == name)
    }
}

/// Probe the host; reports `Unknown` instead of failing when no native
/// package manager is found
pub fn probe() -> SystemInfo {
    let os_release = std::fs::read_to_string("/etc/os-release").ok();
    let info = SystemInfo::from_probes(
        os_release.as_deref(),
        std::env::consts::ARCH,
        is_root(),
        command_exists,
    )
    .with_shell_managers(shell_manager_installed);

    log::debug!(
        "detected distro={} native={} arch={} version_managers={:?} sources={:?}",
        info.distro,
        info.native_package_manager,
        info.architecture,
        info.version_managers,
        info.package_sources
    );
    info
}

/// Probe the host and require a native package manager
pub fn detect() -> Result<SystemInfo, DetectionError> {
    let info = probe();
    if info.has_native() {
        Ok(info)
    } else {
        Err(DetectionError::NoNativeManager)
    }
}

fn any_on_path(on_path: &impl Fn(&str) -> bool, probes: &[&str]) -> bool {
    probes.iter().any(|bin| on_path(bin))
}

/// Check if a command exists in PATH
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// nvm and sdkman are sourced into the shell, so look for their install dir
fn shell_manager_installed(manager: &ShellManager) -> bool {
    std::env::var_os(manager.env_dir)
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(manager.home_dir)))
        .is_some_and(|dir| dir.is_dir())
}

fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Extract `ID=` from os-release content
fn parse_os_release_id(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|id| id.trim().trim_matches('"').to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCH_RELEASE: &str = r#"NAME="Arch Linux"
PRETTY_NAME="Arch Linux"
ID=arch
BUILD_ID=rolling"#;

    const UBUNTU_RELEASE: &str = r#"PRETTY_NAME="Ubuntu 22.04.3 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
ID=ubuntu
ID_LIKE=debian"#;

    fn path_with(bins: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |cmd: &str| bins.iter().any(|bin| *bin == cmd)
    }

    #[test]
    fn test_parse_os_release_id() {
        assert_eq!(parse_os_release_id(ARCH_RELEASE).as_deref(), Some("arch"));
        assert_eq!(parse_os_release_id(UBUNTU_RELEASE).as_deref(), Some("ubuntu"));
        assert_eq!(parse_os_release_id("ID=\"fedora\"").as_deref(), Some("fedora"));
        assert_eq!(parse_os_release_id("NAME=x"), None);
    }

    #[test]
    fn test_aur_helper_wins_over_pacman() {
        let info = SystemInfo::from_probes(
            Some(ARCH_RELEASE),
            "x86_64",
            false,
            path_with(&["pacman", "yay", "paru"]),
        );
        assert_eq!(info.native_package_manager, NativeManager::Paru);
        assert_eq!(info.distro, "arch");
    }

    #[test]
    fn test_priority_not_alphabetical() {
        // dnf sorts before pacman but pacman is probed first
        let info = SystemInfo::from_probes(None, "x86_64", false, path_with(&["dnf", "pacman"]));
        assert_eq!(info.native_package_manager, NativeManager::Pacman);
        assert_eq!(info.distro, "unknown");
    }

    #[test]
    fn test_all_sources_and_managers_kept_in_order() {
        let info = SystemInfo::from_probes(
            Some(UBUNTU_RELEASE),
            "aarch64",
            false,
            path_with(&["apt-get", "snap", "flatpak", "mise", "rustup", "pyenv"]),
        );
        assert_eq!(info.native_package_manager, NativeManager::Apt);
        assert_eq!(info.package_sources, vec!["flatpak", "snap"]);
        assert_eq!(info.version_managers, vec!["rustup", "pyenv", "mise"]);
        assert_eq!(info.architecture, "aarch64");
    }

    #[test]
    fn test_no_native_manager() {
        let info = SystemInfo::from_probes(None, "x86_64", false, path_with(&["flatpak"]));
        assert!(!info.has_native());
        assert!(info.has_source("flatpak"));
    }

    #[test]
    fn test_shell_managers_found_by_directory() {
        // neither nvm nor sdk is ever a binary on PATH
        let info = SystemInfo::from_probes(None, "x86_64", false, path_with(&["nvm", "sdk"]));
        assert!(info.version_managers.is_empty());

        let info = SystemInfo::from_probes(None, "x86_64", false, path_with(&["rustup"]))
            .with_shell_managers(|manager| manager.name == "nvm");
        assert_eq!(info.version_managers, vec!["rustup", "nvm"]);
    }

    #[test]
    fn test_shell_manager_env_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ShellManager {
            name: "pkgport-test-manager",
            env_dir: "PKGPORT_TEST_MANAGER_DIR",
            home_dir: ".pkgport-test-manager-missing",
        };
        assert!(!shell_manager_installed(&manager));

        std::env::set_var(manager.env_dir, dir.path());
        assert!(shell_manager_installed(&manager));
        std::env::remove_var(manager.env_dir);
    }
}
