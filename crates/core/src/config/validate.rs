use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog root URL and all selectors are non-empty
/// - DevTools endpoint, when set, is ws(s) or http(s)
/// - Browser request timeout is non-zero
/// - Scroll loop bounds are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.root_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.root_url cannot be empty".to_string(),
        ));
    }

    for (name, selector) in [
        ("catalog.control_selector", &config.catalog.control_selector),
        ("catalog.extraction_selector", &config.catalog.extraction_selector),
        ("catalog.title_selector", &config.catalog.title_selector),
        ("detail.cover", &config.detail.cover),
        ("detail.title", &config.detail.title),
        ("detail.author", &config.detail.author),
        ("detail.genre", &config.detail.genre),
        ("detail.views", &config.detail.views),
        ("detail.rating", &config.detail.rating),
        ("detail.schedule", &config.detail.schedule),
        ("detail.episode_total", &config.detail.episode_total),
        ("detail.start_date", &config.detail.start_date),
    ] {
        if selector.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if let Some(endpoint) = &config.browser.devtools_url {
        if !["ws://", "wss://", "http://", "https://"]
            .iter()
            .any(|scheme| endpoint.starts_with(scheme))
        {
            return Err(ConfigError::ValidationError(format!(
                "browser.devtools_url must be a ws(s) or http(s) URL, got {:?}",
                endpoint
            )));
        }
    }

    if config.browser.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "browser.request_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.scroll.stable_height_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "scroll.stable_height_cycles cannot be 0".to_string(),
        ));
    }

    if config.scroll.max_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "scroll.max_cycles cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BrowserConfig, CatalogConfig, CheckpointConfig, DatabaseConfig, DetailSelectors,
        ScrollConfig,
    };

    fn valid_config() -> Config {
        Config {
            catalog: CatalogConfig::new("https://example.com/feed"),
            database: DatabaseConfig::default(),
            browser: BrowserConfig::default(),
            scroll: ScrollConfig::default(),
            detail: DetailSelectors::default(),
            checkpoint: CheckpointConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_detail_selector_fails() {
        let mut config = valid_config();
        config.detail.rating = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("detail.rating"));
    }

    #[test]
    fn test_validate_empty_root_url_fails() {
        let mut config = valid_config();
        config.catalog.root_url = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_selector_fails() {
        let mut config = valid_config();
        config.catalog.control_selector = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("catalog.control_selector"));
    }

    #[test]
    fn test_validate_devtools_scheme() {
        let mut config = valid_config();
        config.browser.devtools_url = Some("localhost:9222".to_string());
        assert!(validate_config(&config).is_err());

        config.browser.devtools_url = Some("ws://localhost:9222/devtools/browser/x".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_request_timeout_fails() {
        let mut config = valid_config();
        config.browser.request_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_cycles_fails() {
        let mut config = valid_config();
        config.scroll.max_cycles = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.scroll.stable_height_cycles = 0;
        assert!(validate_config(&config).is_err());
    }
}
