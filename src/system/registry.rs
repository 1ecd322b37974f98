//! Static knowledge about every supported backend
//!
//! Each entry names the binaries that reveal the backend on PATH and the
//! command template for every action it supports. Adding a backend means
//! adding one entry here; detection and command building pick it up from
//! the declaration order.

use super::detect::SystemInfo;
use crate::error::BuildError;
use crate::types::{Action, Category};

/// Verb tokens for one action, placed after the backend's fixed flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub verb: &'static [&'static str],
    pub needs_root: bool,
}

const fn root(verb: &'static [&'static str]) -> Template {
    Template {
        verb,
        needs_root: true,
    }
}

const fn user(verb: &'static [&'static str]) -> Template {
    Template {
        verb,
        needs_root: false,
    }
}

/// Everything needed to drive one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSpec {
    pub name: &'static str,
    pub category: Category,
    pub program: &'static str,
    /// Any of these on PATH means the backend is present
    pub probe: &'static [&'static str],
    /// Non-interactive flags that go between the program and the verb
    pub flags: &'static [&'static str],
    pub install: Option<Template>,
    pub search: Option<Template>,
    pub remove: Option<Template>,
    pub update: Option<Template>,
    pub info: Option<Template>,
    pub list: Option<Template>,
    /// Lists explicitly installed package names, one per line
    pub inventory: Option<&'static [&'static str]>,
}

impl BackendSpec {
    pub fn template(&self, action: Action) -> Option<&Template> {
        match action {
            Action::Install => self.install.as_ref(),
            Action::Search => self.search.as_ref(),
            Action::Remove => self.remove.as_ref(),
            Action::Update => self.update.as_ref(),
            Action::Info => self.info.as_ref(),
            Action::List => self.list.as_ref(),
        }
    }
}

/// AUR helpers elevate on their own, so none of their verbs need sudo
pub(crate) const fn aur_helper(name: &'static str) -> BackendSpec {
    BackendSpec {
        name,
        category: Category::Native,
        program: name,
        probe: &[],
        flags: &["--noconfirm"],
        install: Some(user(&["-S", "--needed"])),
        search: Some(user(&["-Ss"])),
        remove: Some(user(&["-Rns"])),
        update: Some(user(&["-Syu"])),
        info: Some(user(&["-Si"])),
        list: Some(user(&["-Qe"])),
        inventory: Some(&["pacman", "-Qqe"]),
    }
}

/// Native package managers in probe priority; first match wins
pub static NATIVE_BACKENDS: &[BackendSpec] = &[
    BackendSpec {
        probe: &["paru"],
        ..aur_helper("paru")
    },
    BackendSpec {
        probe: &["yay"],
        ..aur_helper("yay")
    },
    BackendSpec {
        name: "pacman",
        category: Category::Native,
        program: "pacman",
        probe: &["pacman"],
        flags: &["--noconfirm"],
        install: Some(root(&["-S", "--needed"])),
        search: Some(user(&["-Ss"])),
        remove: Some(root(&["-Rns"])),
        update: Some(root(&["-Syu"])),
        info: Some(user(&["-Si"])),
        list: Some(user(&["-Qe"])),
        inventory: Some(&["pacman", "-Qqe"]),
    },
    BackendSpec {
        name: "apt",
        category: Category::Native,
        program: "apt-get",
        probe: &["apt-get"],
        flags: &["-y"],
        install: Some(root(&["install"])),
        search: None,
        remove: Some(root(&["remove"])),
        update: Some(root(&["upgrade"])),
        info: None,
        list: None,
        inventory: Some(&["apt-mark", "showmanual"]),
    },
    BackendSpec {
        name: "dnf",
        category: Category::Native,
        program: "dnf",
        probe: &["dnf"],
        flags: &["-y"],
        install: Some(root(&["install"])),
        search: Some(user(&["search"])),
        remove: Some(root(&["remove"])),
        update: Some(root(&["upgrade"])),
        info: Some(user(&["info"])),
        list: Some(user(&["list", "--installed"])),
        inventory: Some(&["dnf", "repoquery", "--userinstalled", "--qf", "%{name}\n"]),
    },
    BackendSpec {
        name: "yum",
        category: Category::Native,
        program: "yum",
        probe: &["yum"],
        flags: &["-y"],
        install: Some(root(&["install"])),
        search: Some(user(&["search"])),
        remove: Some(root(&["remove"])),
        update: Some(root(&["update"])),
        info: Some(user(&["info"])),
        list: Some(user(&["list", "installed"])),
        inventory: Some(&["rpm", "-qa", "--qf", "%{NAME}\n"]),
    },
    BackendSpec {
        name: "zypper",
        category: Category::Native,
        program: "zypper",
        probe: &["zypper"],
        flags: &["--non-interactive"],
        install: Some(root(&["install"])),
        search: Some(user(&["search"])),
        remove: Some(root(&["remove"])),
        update: Some(root(&["update"])),
        info: Some(user(&["info"])),
        list: Some(user(&["search", "--installed-only"])),
        inventory: Some(&["rpm", "-qa", "--qf", "%{NAME}\n"]),
    },
    BackendSpec {
        name: "apk",
        category: Category::Native,
        program: "apk",
        probe: &["apk"],
        flags: &[],
        install: Some(root(&["add"])),
        search: Some(user(&["search"])),
        remove: Some(root(&["del"])),
        update: Some(root(&["upgrade"])),
        info: Some(user(&["info"])),
        list: Some(user(&["info"])),
        inventory: Some(&["cat", "/etc/apk/world"]),
    },
];

/// Cross-distro package sources, in probe order
pub static SOURCE_BACKENDS: &[BackendSpec] = &[
    BackendSpec {
        name: "flatpak",
        category: Category::Flatpak,
        program: "flatpak",
        probe: &["flatpak"],
        flags: &[],
        install: Some(user(&["install", "-y", "--noninteractive", "flathub"])),
        search: Some(user(&["search"])),
        remove: Some(user(&["uninstall", "-y", "--noninteractive"])),
        update: Some(user(&["update", "-y", "--noninteractive"])),
        info: Some(user(&["info"])),
        list: Some(user(&["list", "--app"])),
        inventory: Some(&["flatpak", "list", "--app", "--columns=application"]),
    },
    BackendSpec {
        name: "appimage",
        category: Category::AppImage,
        program: "ail-cli",
        probe: &["ail-cli"],
        flags: &[],
        install: Some(user(&["integrate"])),
        search: None,
        remove: Some(user(&["unintegrate"])),
        update: None,
        info: Some(user(&["would-integrate"])),
        list: None,
        inventory: None,
    },
];

/// Sources worth reporting that have no category of their own
pub static EXTRA_SOURCES: &[(&str, &[&str])] = &[("snap", &["snap"])];

/// Version managers, each probed independently
pub static VERSION_MANAGERS: &[(&str, &[&str])] = &[
    ("rustup", &["rustup"]),
    ("pyenv", &["pyenv"]),
    ("rbenv", &["rbenv"]),
    ("nodenv", &["nodenv"]),
    ("fnm", &["fnm"]),
    ("volta", &["volta"]),
    ("asdf", &["asdf"]),
    ("mise", &["mise"]),
    ("goenv", &["goenv"]),
    ("jenv", &["jenv"]),
];

/// A version manager that installs a shell function rather than a binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellManager {
    pub name: &'static str,
    /// Environment variable pointing at the install directory
    pub env_dir: &'static str,
    /// Default install directory, relative to home
    pub home_dir: &'static str,
}

/// Version managers found by their install directory, after the PATH ones
pub static SHELL_VERSION_MANAGERS: &[ShellManager] = &[
    ShellManager {
        name: "sdkman",
        env_dir: "SDKMAN_DIR",
        home_dir: ".sdkman",
    },
    ShellManager {
        name: "nvm",
        env_dir: "NVM_DIR",
        home_dir: ".nvm",
    },
];

/// Lookup table over a set of backend specs
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    native: &'static [BackendSpec],
    sources: &'static [BackendSpec],
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            native: NATIVE_BACKENDS,
            sources: SOURCE_BACKENDS,
        }
    }
}

impl Registry {
    #[cfg(test)]
    pub fn new(native: &'static [BackendSpec], sources: &'static [BackendSpec]) -> Self {
        Self { native, sources }
    }

    /// Find a backend by its registry name
    pub fn backend(&self, name: &str) -> Option<&'static BackendSpec> {
        self.native
            .iter()
            .chain(self.sources.iter())
            .find(|spec| spec.name == name)
    }

    /// Resolve the backend that serves `category` on the detected system
    pub fn lookup(
        &self,
        category: Category,
        info: &SystemInfo,
    ) -> Result<&'static BackendSpec, BuildError> {
        let name = match category {
            Category::Native => info.native_package_manager.backend_name(),
            Category::Flatpak | Category::AppImage => self
                .sources
                .iter()
                .find(|spec| spec.category == category)
                .map(|spec| spec.name)
                .filter(|name| info.has_source(name)),
        };

        name.and_then(|name| self.backend(name))
            .filter(|spec| spec.category == category)
            .ok_or(BuildError::NoBackendAvailable(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::detect::NativeManager;

    #[test]
    fn test_pacman_family_probed_first() {
        let names: Vec<&str> = NATIVE_BACKENDS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["paru", "yay", "pacman", "apt", "dnf", "yum", "zypper", "apk"]
        );
    }

    #[test]
    fn test_every_native_backend_can_install() {
        for spec in NATIVE_BACKENDS {
            assert!(spec.install.is_some(), "{} cannot install", spec.name);
            assert!(!spec.probe.is_empty(), "{} has no probe", spec.name);
            assert_eq!(spec.category, Category::Native);
        }
    }

    #[test]
    fn test_native_managers_map_to_registry() {
        let registry = Registry::default();
        for manager in NativeManager::all() {
            let name = manager.backend_name().unwrap();
            assert!(registry.backend(name).is_some(), "{} missing", name);
        }
        assert_eq!(NativeManager::Unknown.backend_name(), None);
    }

    #[test]
    fn test_lookup_respects_detected_sources() {
        let registry = Registry::default();
        let mut info = SystemInfo::bare("arch", NativeManager::Pacman);

        assert_eq!(
            registry.lookup(Category::Flatpak, &info),
            Err(BuildError::NoBackendAvailable(Category::Flatpak))
        );

        info.package_sources.push("flatpak".into());
        assert_eq!(registry.lookup(Category::Flatpak, &info).unwrap().name, "flatpak");
        assert_eq!(registry.lookup(Category::Native, &info).unwrap().name, "pacman");
    }

    #[test]
    fn test_lookup_unknown_native() {
        let info = SystemInfo::bare("unknown", NativeManager::Unknown);
        assert_eq!(
            Registry::default().lookup(Category::Native, &info),
            Err(BuildError::NoBackendAvailable(Category::Native))
        );
    }
}
