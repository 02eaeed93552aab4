pub mod config;

pub use config::{CONFIG_FILE_NAME, ConfigError, MixbomConfig, find_config_file, load_config};
