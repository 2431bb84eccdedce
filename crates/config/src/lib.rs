//! Configuration loading and schema for the gantry webhook service.
//!
//! Config files: `gantry.toml`, `gantry.yaml`, or `gantry.json`
//! Searched in `./` then `~/.config/gantry/`.
//!
//! Supports `${ENV_VAR}` substitution in the raw config text.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{BridgeConfig, EnvironmentUrls, GantryConfig, RemoteConfig, ServerConfig},
};
