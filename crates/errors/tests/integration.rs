//! Integration tests for error types

#[cfg(test)]
mod tests {
    use tempshare_errors::*;

    #[test]
    fn test_error_conversion() {
        let res_err = ResourceError::DuplicateName {
            name: "/tmp/a.csv".into(),
        };
        let err: Error = res_err.into();
        assert!(matches!(err, Error::Resource(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ResourceError::CloseFailed {
            name: "/tmp/x".into(),
            message: "gone".into(),
        };
        assert_eq!(err.to_string(), "failed to close /tmp/x: gone");
    }

    #[test]
    fn test_close_failed_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ResourceError::close_failed("/tmp/ts/a.csv", &io_err);
        assert!(matches!(
            err,
            ResourceError::CloseFailed { ref name, .. } if name == "/tmp/ts/a.csv"
        ));
        assert_eq!(err.user_code(), Some("resource.close_failed"));
    }

    #[test]
    fn test_user_codes_delegate() {
        let err: Error = ResourceError::InvalidSuffix {
            suffix: "a/b".into(),
            reason: "contains a path separator".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("resource.invalid_suffix"));
        assert!(err.user_hint().is_some());
        assert!(!err.is_retryable());

        let err: Error = ConfigError::InvalidValue {
            field: "TEMPSHARE_RANDOM_LEN".into(),
            value: "x".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("config.invalid_value"));
    }

    #[test]
    fn test_create_failed_is_retryable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let err = ResourceError::create_failed(std::path::Path::new("/tmp/ts"), &io_err);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("/tmp/ts"));
    }
}
