//! Error types and handling for the itinerary planner

use thiserror::Error;

/// Main error type for the itinerary planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Bad form input, surfaced inline next to the offending field
    #[error("Invalid input: {message}")]
    Validation { field: String, message: String },

    /// LLM or places API failure, surfaced as a top-level notice
    #[error("{service} API error: {message}")]
    Upstream { service: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Prompt or page template errors
    #[error("Template error: {message}")]
    Template { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Create a new validation error for a form field
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new upstream API error
    pub fn upstream<N: Into<String>, S: Into<String>>(service: N, message: S) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(message: S) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Form field this error belongs to, if any
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            PlannerError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, PlannerError::Validation { .. })
    }

    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, PlannerError::Upstream { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Validation { message, .. } => message.clone(),
            PlannerError::Upstream { service, .. } => {
                format!("The {service} service could not complete the request. Please try again.")
            }
            PlannerError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            PlannerError::Template { .. } => {
                "Failed to render the planner output. Please check your prompt templates.".to_string()
            }
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
