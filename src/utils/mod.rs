/// TOML configuration (`quarry.toml`).
pub mod toml_config;
