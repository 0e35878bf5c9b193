use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, OracleConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_oracle_config(&config.oracle)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler budget defaults against the request ranges
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth > 3 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be between 0 and 3, got {}",
            config.max_depth
        )));
    }

    if config.max_pages < 1 || config.max_pages > 50 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 50, got {}",
            config.max_pages
        )));
    }

    if config.max_links_per_page < 1 {
        return Err(ConfigError::Validation(
            "max-links-per-page must be >= 1".to_string(),
        ));
    }

    if config.max_text_chars < 1 {
        return Err(ConfigError::Validation(
            "max-text-chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetcher timeout-secs must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_oracle_config(config: &OracleConfig) -> Result<(), ConfigError> {
    let api_url = Url::parse(&config.api_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid oracle api-url: {}", e)))?;

    if api_url.scheme() != "http" && api_url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Oracle api-url must use HTTP or HTTPS, got '{}'",
            config.api_url
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "oracle model cannot be empty".to_string(),
        ));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "oracle max-tokens must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "oracle timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "oracle api-key-env cannot be empty".to_string(),
        ));
    }

    if matches!(&config.system_prompt, Some(prompt) if prompt.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "oracle system-prompt cannot be blank".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if matches!(&config.database_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
