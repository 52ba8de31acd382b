// Public library interface for salesview-rs
// The viewer, the SVG exporter and the debug CLI all build on these modules.

pub mod app;
pub mod error;
pub mod layout;
pub mod loader;
pub mod render;
pub mod settings;
pub mod tree;
pub mod ui;

pub use error::{Result, TreemapError};
