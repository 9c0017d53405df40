//! Core error types for the device inventory
//!
//! Every layer keeps its own error enum; they all fold into [`InvError`] at the
//! service boundary, where [`InvError::error_code`] classifies them.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all inventory operations
#[derive(Error, Debug)]
pub enum InvError {
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Already exists: {message}")]
    Duplicate { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InvError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Stable machine-readable classification
    pub fn error_code(&self) -> &'static str {
        match self {
            InvError::NotFound { .. } => "not_found",
            InvError::Duplicate { .. } => "duplicate",
            InvError::InvalidInput { .. } => "invalid_input",
            InvError::Validation(_) => "validation_failed",
            InvError::Database(_) => "database_error",
            InvError::Config(_) => "configuration_error",
        }
    }

    /// Whether the caller caused the failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InvError::NotFound { .. }
                | InvError::Duplicate { .. }
                | InvError::InvalidInput { .. }
                | InvError::Validation(_)
        )
    }
}

/// Validation errors collection, keyed by field name
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in errs.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}
