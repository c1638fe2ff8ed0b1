use crate::config::types::{Config, CrawlConfig, FilterConfig, GuardConfig, ScraperEntry};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_guard_config(&config.guard)?;
    validate_filter_config(&config.filter)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    validate_scrapers(&config.scrapers)?;
    Ok(())
}

/// Validates pagination guard thresholds
fn validate_guard_config(config: &GuardConfig) -> Result<(), ConfigError> {
    if config.max_empty_pages < 1 {
        return Err(ConfigError::Validation(
            "max_empty_pages must be >= 1".to_string(),
        ));
    }

    if config.max_duplicate_pages < 1 {
        return Err(ConfigError::Validation(
            "max_duplicate_pages must be >= 1".to_string(),
        ));
    }

    if config.max_no_new_items_pages < 1 {
        return Err(ConfigError::Validation(
            "max_no_new_items_pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the exclusion filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    for tag in config.required_tags.iter().chain(&config.excluded_tags) {
        if tag.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter tags cannot be empty strings".to_string(),
            ));
        }
    }

    for keyword in &config.excluded_keywords {
        if keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "excluded_keywords cannot contain empty strings".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawl loop configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scraper entries
///
/// Scraper names namespace persisted watermark keys, so they must be
/// non-empty and unique across the config.
fn validate_scrapers(scrapers: &[ScraperEntry]) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for entry in scrapers {
        validate_scraper_name(&entry.name)?;

        if !seen_names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate scraper name '{}'",
                entry.name
            )));
        }

        let url = Url::parse(&entry.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}' for scraper '{}': {}",
                entry.base_url, entry.name, e
            ))
        })?;

        if url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "base-url '{}' for scraper '{}' must use HTTPS scheme",
                entry.base_url, entry.name
            )));
        }
    }

    Ok(())
}

/// Validates a scraper name: non-empty, alphanumeric + hyphens only
fn validate_scraper_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "scraper name cannot be empty".to_string(),
        ));
    }

    if !name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "scraper name must contain only alphanumeric characters and hyphens, got '{}'",
            name
        )));
    }

    Ok(())
}
