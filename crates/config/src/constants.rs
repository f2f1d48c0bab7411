//! Names and defaults shared by the config loader and the binary

pub const APP_DIR: &str = "tempshare";
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_PREFIX: &str = "tempshare-";
pub const DEFAULT_RANDOM_LEN: usize = 8;

pub const ENV_TEMP_DIR: &str = "TEMPSHARE_TEMP_DIR";
pub const ENV_PREFIX: &str = "TEMPSHARE_PREFIX";
pub const ENV_RANDOM_LEN: &str = "TEMPSHARE_RANDOM_LEN";
pub const ENV_LOG_LEVEL: &str = "TEMPSHARE_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "TEMPSHARE_LOG_JSON";
