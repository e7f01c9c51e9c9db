#[cfg(test)]
mod tests {
    use folio_config::ConfigLoader;
    use folio_config::schema::*;
    use std::io::Write;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_rate_limit_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.key, RateLimitKey::SessionAndAgent);
    }

    #[test]
    fn test_security_defaults() {
        let config = SecurityConfig::default();
        assert_eq!(config.max_argument_size, 10_000);
        assert!(config.blocked_patterns.is_empty());
        assert!(!config.require_auth);
    }

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, "pretty");
        assert!(config.log_successful_executions);
        assert!(config.log_failed_executions);
    }

    #[test]
    fn test_execution_defaults_map_to_call_config() {
        let defaults = ExecutionDefaults::default();
        assert_eq!(defaults.history_limit, 1_000);
        let call = defaults.to_execution_config();
        assert!(call.validate_args);
        assert_eq!(call.timeout_ms, 10_000);
        assert_eq!(call.retry_delay_ms, 1_000);
    }

    #[test]
    fn test_validation_options() {
        let opts = ValidationConfig::default().options();
        assert!(opts.strict);
        assert_eq!(opts.allow_additional_properties, Some(false));
    }

    #[test]
    fn test_log_level_ordering_and_parse() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = FolioConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: FolioConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.rate_limit.max_requests, config.rate_limit.max_requests);
        assert_eq!(restored.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[rate_limit]
max_requests = 5
key = "session"

[logging]
level = "warn"
"#;
        let config: FolioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.key, RateLimitKey::Session);
        assert_eq!(config.logging.level, LogLevel::Warn);
        // Defaults should fill in
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.security.max_argument_size, 10_000);
        assert!(config.logging.enabled);
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_default_config_is_valid() {
        let warnings = FolioConfig::default().validate().unwrap();
        assert!(warnings.iter().all(|w| w.severity != WarningSeverity::Error));
    }

    #[test]
    fn test_zero_max_requests_is_error() {
        let mut config = FolioConfig::default();
        config.rate_limit.max_requests = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("rate_limit.max_requests"));
    }

    #[test]
    fn test_bad_blocked_pattern_is_error() {
        let mut config = FolioConfig::default();
        config.security.blocked_patterns = vec!["(unclosed".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_global_key_is_info() {
        let mut config = FolioConfig::default();
        config.rate_limit.key = RateLimitKey::Global;
        let warnings = config.validate().unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.field == "rate_limit.key" && w.severity == WarningSeverity::Info));
    }

    #[test]
    fn test_warning_messages_are_plain_text() {
        let mut config = FolioConfig::default();
        config.rate_limit.window_ms = 0;
        config.validation.strict_mode = false;
        config.execution.history_limit = 0;
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 3);
        let window = warnings.iter().find(|w| w.field == "rate_limit.window_ms").unwrap();
        assert_eq!(window.message, "window_ms is 0, so rate limiting is effectively disabled");
        assert!(warnings.iter().all(|w| w.message.is_ascii()));
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[security]
max_argument_size = 2048
require_auth = true

[execution]
timeout_ms = 500
history_limit = 10
"#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(config.security.max_argument_size, 2048);
        assert!(config.security.require_auth);
        assert_eq!(config.execution.history_limit, 10);
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        std::fs::write(&config_path, "[rate_limit]\nmax_requests = 0\n").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        std::fs::write(&config_path, "[rate_limit\n").unwrap();
        let err = ConfigLoader::load(Some(config_path.as_path())).err().unwrap();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_config_loader_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");

        std::fs::write(&config_path, "[security]\nmax_argument_size = 100\n").unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert_eq!(loader.get().security.max_argument_size, 100);

        std::fs::write(&config_path, "[security]\nmax_argument_size = 200\n").unwrap();

        loader.reload().unwrap();
        assert_eq!(loader.get().security.max_argument_size, 200);
    }

    #[test]
    fn test_from_config_snapshot() {
        let mut config = FolioConfig::default();
        config.logging.enabled = false;
        let loader = ConfigLoader::from_config(config);
        assert!(!loader.get().logging.enabled);
        assert!(loader.reload().is_err());
    }
}
