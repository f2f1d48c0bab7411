//! Integration tests for config

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;
    use tempshare_config::constants::*;
    use tempshare_config::*;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            ENV_TEMP_DIR,
            ENV_PREFIX,
            ENV_RANDOM_LEN,
            ENV_LOG_LEVEL,
            ENV_LOG_JSON,
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[temp]
dir = "/var/tmp/etl"
prefix = "job-"
random_len = 12

[logging]
level = "debug"
json = true
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.temp.dir, Some(PathBuf::from("/var/tmp/etl")));
        assert_eq!(config.temp.prefix, "job-");
        assert_eq!(config.temp.random_len, 12);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.temp_dir(), PathBuf::from("/var/tmp/etl"));
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[logging]\nlevel = \"warn\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.temp.prefix, DEFAULT_PREFIX);
        assert_eq!(config.temp.random_len, DEFAULT_RANDOM_LEN);
        assert_eq!(config.temp_dir(), std::env::temp_dir().join(APP_DIR));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_or_default(Some(dir.path().join("nope.toml").as_path())).await;
        assert!(matches!(
            result,
            Err(tempshare_errors::Error::Config(
                tempshare_errors::ConfigError::NotFound { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[temp\nprefix = ").unwrap();

        let result = Config::load_from_file(temp_file.path()).await;
        assert!(matches!(
            result,
            Err(tempshare_errors::Error::Config(
                tempshare_errors::ConfigError::ParseError { .. }
            ))
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_TEMP_DIR, "/scratch/ts");
        std::env::set_var(ENV_PREFIX, "etl-");
        std::env::set_var(ENV_RANDOM_LEN, "16");
        std::env::set_var(ENV_LOG_JSON, "yes");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.temp_dir(), PathBuf::from("/scratch/ts"));
        assert_eq!(config.temp.prefix, "etl-");
        assert_eq!(config.temp.random_len, 16);
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_RANDOM_LEN, "0");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());
        clear_env();

        std::env::set_var(ENV_PREFIX, "a/b");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());
        clear_env();

        std::env::set_var(ENV_LOG_JSON, "maybe");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());
        clear_env();
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.temp.prefix = "rt-".to_string();
        let rendered = config.to_toml_string().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.temp.prefix, "rt-");
        assert_eq!(parsed.logging.level, "info");
    }
}
