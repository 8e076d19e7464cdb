//! Configuration for docqa.
//!
//! TOML configuration with sections for the server, sessions, the generation
//! backend, extraction and logging. Files are layered: the user config
//! directory first, then `./docqa.toml`, with CLI flags applied on top by
//! the binary.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
