//! Server configuration: YAML schema, presets, and the layered loader.

pub mod loader;
pub mod preset;
pub mod schema;

pub use loader::{filter_tools, load_config};
pub use schema::{PresetName, ServerConfig};
