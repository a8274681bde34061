//! Application configuration: defaults, TOML file, environment overrides.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, GeneratorConfig, OutputConfig, WordPressConfig};
