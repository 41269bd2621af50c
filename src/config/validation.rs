use crate::config::types::{Config, CrawlerConfig, EventsConfig, OutputConfig, UserAgentConfig};
use crate::url::parse_crawl_url;
use crate::ConfigError;

/// Upper bound on worker slots
pub const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_events_config(&config.events)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seed_urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seed_urls {
        parse_crawl_url(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }

    if config.max_workers < 1 || config.max_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_workers
        )));
    }

    if config.fetch_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.robots_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "robots_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if !config.contact_url.is_empty() {
        url::Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
///
/// This is all that modes reading the result collections without crawling need.
pub fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.sites_path.is_empty() {
        return Err(ConfigError::Validation(
            "sites_path cannot be empty".to_string(),
        ));
    }

    if config.images_path.is_empty() {
        return Err(ConfigError::Validation(
            "images_path cannot be empty".to_string(),
        ));
    }

    if config.sites_path == config.images_path {
        return Err(ConfigError::Validation(format!(
            "sites_path and images_path must differ, both are '{}'",
            config.sites_path
        )));
    }

    Ok(())
}

fn validate_events_config(config: &EventsConfig) -> Result<(), ConfigError> {
    if config.capacity == 0 {
        return Err(ConfigError::Validation(
            "events capacity must be >= 1".to_string(),
        ));
    }
    Ok(())
}
