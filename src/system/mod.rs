//! Host interaction layer
//!
//! This module handles everything that touches the host system:
//! - Backend registry (what each package manager looks like)
//! - Capability detection (which backends are present)
//! - Command building (intent to argv)
//! - Command execution (spawn, inherit stdio, wait)
//! - Inventory, snapshot and dotfile backup collaborators used by export

pub mod backup;
pub mod commands;
pub mod detect;
pub mod inventory;
pub mod registry;
pub mod runner;
pub mod snapshot;

pub use commands::{preview, CommandBuilder};
pub use detect::{detect, probe, SystemInfo};
pub use runner::{CommandRunner, DryRunRunner, SystemRunner};
