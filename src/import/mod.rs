//! Profile import
//!
//! - Line input (`LineReader`, end of input is an answer)
//! - Selection expressions typed while browsing
//! - The interactive engine that turns choices into backend invocations

pub mod engine;
pub mod input;
pub mod selection;

pub use engine::{EngineOptions, ImportEngine};
pub use input::StdinReader;
