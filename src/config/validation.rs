use crate::config::types::{
    Config, CrawlerConfig, GenerationConfig, RendererConfig, RetryConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Hard ceiling on the page budget of a single crawl session
pub const MAX_PAGE_BUDGET: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_renderer_config(&config.renderer)?;
    validate_generation_config(&config.generation)?;
    Ok(())
}

/// Validates a per-run page budget against the allowed range
pub fn validate_page_budget(max_pages: usize) -> Result<(), ConfigError> {
    if max_pages < 1 || max_pages > MAX_PAGE_BUDGET {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGE_BUDGET, max_pages
        )));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_page_budget(config.max_pages)?;

    for prefix in &config.path_prefixes {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "path prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    if config.exclude_paths.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "exclude_paths cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates rendering backend configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "navigation_timeout_secs must be >= 1".to_string(),
        ));
    }

    if let Some(endpoint) = &config.remote_endpoint {
        let url = Url::parse(endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid remote_endpoint '{}': {}", endpoint, e))
        })?;

        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ConfigError::Validation(format!(
                "remote_endpoint '{}' must use ws or wss scheme",
                endpoint
            )));
        }
    }

    if config.credential_param.is_empty() {
        return Err(ConfigError::Validation(
            "credential_param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates generation backend configuration
fn validate_generation_config(config: &GenerationConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid generation base_url: {}", e)))?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if !(0.0..=1.0).contains(&config.min_confidence) {
        return Err(ConfigError::Validation(format!(
            "min_confidence must be between 0.0 and 1.0, got {}",
            config.min_confidence
        )));
    }

    if config.chars_per_token == 0 {
        return Err(ConfigError::Validation(
            "chars_per_token must be >= 1".to_string(),
        ));
    }

    if config.max_faqs == 0 || config.max_output_tokens == 0 {
        return Err(ConfigError::Validation(
            "max_faqs and max_output_tokens must be >= 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page_budget() {
        assert!(validate_page_budget(1).is_ok());
        assert!(validate_page_budget(MAX_PAGE_BUDGET).is_ok());
        assert!(validate_page_budget(0).is_err());
        assert!(validate_page_budget(MAX_PAGE_BUDGET + 1).is_err());
    }

    #[test]
    fn test_path_prefix_must_be_absolute() {
        let mut config = CrawlerConfig::default();
        config.path_prefixes = vec!["docs".to_string()];
        assert!(validate_crawler_config(&config).is_err());

        config.path_prefixes = vec!["/docs".to_string()];
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_remote_endpoint_scheme() {
        let mut config = RendererConfig::default();
        config.remote_endpoint = Some("https://broker.example.com".to_string());
        assert!(validate_renderer_config(&config).is_err());

        config.remote_endpoint = Some("wss://broker.example.com".to_string());
        assert!(validate_renderer_config(&config).is_ok());
    }

    #[test]
    fn test_min_confidence_bounds() {
        let mut config = GenerationConfig::default();
        config.min_confidence = 1.5;
        assert!(validate_generation_config(&config).is_err());

        config.min_confidence = 0.3;
        assert!(validate_generation_config(&config).is_ok());
    }

    #[test]
    fn test_crawler_name_characters() {
        let config = UserAgentConfig {
            crawler_name: "faq smith".to_string(),
            crawler_version: "0.1".to_string(),
            contact_url: "https://example.com/bot".to_string(),
        };
        assert!(validate_user_agent_config(&config).is_err());
    }
}
