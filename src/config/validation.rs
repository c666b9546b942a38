use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, HARD_LIMIT_CEILING,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_breadth_limit < 1 || config.max_breadth_limit > HARD_LIMIT_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_breadth_limit must be between 1 and {}, got {}",
            HARD_LIMIT_CEILING, config.max_breadth_limit
        )));
    }

    if config.max_depth_limit < 1 || config.max_depth_limit > HARD_LIMIT_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_depth_limit must be between 1 and {}, got {}",
            HARD_LIMIT_CEILING, config.max_depth_limit
        )));
    }

    if config.max_total_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_total_pages must be >= 1, got {}",
            config.max_total_pages
        )));
    }

    if config.max_in_flight < 1 || config.max_in_flight > 64 {
        return Err(ConfigError::Validation(format!(
            "max_in_flight must be between 1 and 64, got {}",
            config.max_in_flight
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    Ok(())
}

/// Validates the identity pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if let Some(position) = config.pool.iter().position(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user-agent pool entry {} is blank",
            position
        )));
    }

    if let Some(bad) = config
        .pool
        .iter()
        .find(|ua| ua.chars().any(|c| c.is_control()))
    {
        return Err(ConfigError::Validation(format!(
            "user-agent '{}' contains control characters",
            bad.escape_default()
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(dir) = &config.log_directory {
        if dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log_directory cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
