//! Configuration validation.

use crate::schema::{Config, ProviderKind};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_hub(config, &mut result);
        Self::validate_history(config, &mut result);
        Self::validate_analysis(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_extensions(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }
        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_hub(config: &Config, result: &mut ValidationResult) {
        if config.hub.outbound_buffer == 0 {
            result.add_error(ValidationError::new(
                "hub.outbound_buffer",
                "outbound_buffer must be greater than 0",
            ));
        }
    }

    fn validate_history(config: &Config, result: &mut ValidationResult) {
        if config.history.retain >= config.history.high_water {
            result.add_error(ValidationError::new(
                "history.retain",
                format!(
                    "retain ({}) must be lower than high_water ({})",
                    config.history.retain, config.history.high_water
                ),
            ));
        }
    }

    fn validate_analysis(config: &Config, result: &mut ValidationResult) {
        let analysis = &config.analysis;
        let Some(kind) = ProviderKind::parse(&analysis.provider) else {
            result.add_error(ValidationError::new(
                "analysis.provider",
                format!(
                    "Unknown provider '{}', valid values: {:?}",
                    analysis.provider,
                    ProviderKind::NAMES
                ),
            ));
            return;
        };

        if !kind.is_remote() {
            return;
        }

        match &analysis.endpoint {
            None => result.add_error(ValidationError::new(
                "analysis.endpoint",
                format!("Provider '{}' requires an endpoint", analysis.provider),
            )),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                result.add_error(ValidationError::new(
                    "analysis.endpoint",
                    "endpoint must start with http:// or https://",
                ))
            }
            Some(_) => {}
        }

        if analysis.api_key.is_none() {
            result.add_warning(ValidationWarning::new(
                "analysis.api_key",
                "API key is not set, requests will be sent unauthenticated",
            ));
        }

        if analysis.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "analysis.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        match config.storage.backend.as_str() {
            "memory" => {}
            "file" => {
                if config.storage.path.is_none() {
                    result.add_warning(ValidationWarning::new(
                        "storage.path",
                        "File storage path not set, will use default location",
                    ));
                }
            }
            other => result.add_error(ValidationError::new(
                "storage.backend",
                format!(
                    "Unknown storage backend '{}', valid values: [\"memory\", \"file\"]",
                    other
                ),
            )),
        }
    }

    fn validate_extensions(config: &Config, result: &mut ValidationResult) {
        for ext in &config.extensions.enabled {
            if config.extensions.disabled.contains(ext) {
                result.add_error(ValidationError::new(
                    "extensions",
                    format!("Extension '{}' is both enabled and disabled", ext),
                ));
            }
        }

        for (name, value) in &config.extensions.config {
            if !value.is_object() {
                result.add_error(ValidationError::new(
                    format!("extensions.config.{}", name),
                    "Extension config must be a table",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
