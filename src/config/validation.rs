use crate::config::types::{BrowserSettings, CategoryEntry, Config, CrawlSettings, OutputSettings};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_settings(&config.browser)?;
    validate_crawl_settings(&config.crawl)?;
    validate_output_settings(&config.output)?;
    validate_categories(&config.category)?;
    Ok(())
}

/// Validates browser settings
fn validate_browser_settings(settings: &BrowserSettings) -> Result<(), ConfigError> {
    if settings.settle_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "settle-delay-ms must be >= 100ms, got {}ms",
            settings.settle_delay_ms
        )));
    }

    if settings.nav_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "nav-timeout-ms must be >= 1000ms, got {}ms",
            settings.nav_timeout_ms
        )));
    }

    Ok(())
}

/// Validates crawl settings
fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.max_retries < 1 || settings.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be between 1 and 10, got {}",
            settings.max_retries
        )));
    }

    if settings.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-consecutive-failures must be >= 1, got {}",
            settings.max_consecutive_failures
        )));
    }

    if settings.checkpoint_every < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint-every must be >= 1, got {}",
            settings.checkpoint_every
        )));
    }

    Ok(())
}

/// Validates output settings
fn validate_output_settings(settings: &OutputSettings) -> Result<(), ConfigError> {
    if settings.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates category override entries
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    for entry in categories {
        if entry.label.is_empty() {
            return Err(ConfigError::Validation(
                "category label cannot be empty".to_string(),
            ));
        }

        let parsed = Url::parse(&entry.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", entry.url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "category URL must be http(s): {}",
                entry.url
            )));
        }
    }

    Ok(())
}
