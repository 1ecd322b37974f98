//! User Interface layer
//!
//! This module contains all terminal output:
//! - Theme definitions and colors
//! - Menus, package lists, previews and summaries

pub mod render;
pub mod theme;

pub use theme::Theme;
