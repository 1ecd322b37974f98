//! Typed failures for detection, command building and installation
//!
//! Application plumbing uses `anyhow`; these are the errors the import
//! engine has to tell apart.

use crate::types::{Action, Category};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectionError {
    #[error("no supported native package manager found on PATH")]
    NoNativeManager,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("{backend} has no command for '{action}'")]
    UnsupportedAction {
        backend: &'static str,
        action: Action,
    },
    #[error("no usable {0} backend detected on this system")]
    NoBackendAvailable(Category),
    #[error("'{0}' needs at least one package name")]
    MissingPackages(Action),
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to launch {program}: {source}")]
    ExecutionFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {}", exit_label(.code))]
    NonZeroExit { program: String, code: Option<i32> },
    #[error("{0} installation is not implemented yet")]
    NotImplemented(Category),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BuildError::UnsupportedAction {
            backend: "flatpak",
            action: Action::Search,
        };
        assert_eq!(err.to_string(), "flatpak has no command for 'search'");

        let err = InstallError::NonZeroExit {
            program: "apt".into(),
            code: Some(100),
        };
        assert_eq!(err.to_string(), "apt exited with status 100");

        let err = InstallError::NotImplemented(Category::AppImage);
        assert_eq!(err.to_string(), "AppImage installation is not implemented yet");
    }
}
