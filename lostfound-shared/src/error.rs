/// Errors raised by the claim/listing lifecycle
///
/// Every lifecycle operation either succeeds completely or returns one of
/// these without changing stored state.

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::{models::item::ItemStatus, store::StoreError};

/// One invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Lifecycle error kinds
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Input failed schema validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Requester is not the owner of the item
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Owner tried to claim their own item
    #[error("You cannot claim your own item")]
    SelfClaim,

    /// The item no longer accepts claims or changes
    #[error("Item is not active (status: {0})")]
    InactiveItem(ItemStatus),

    /// The claimant already has a claim on this item
    #[error("A claim for this item was already submitted")]
    DuplicateClaim,

    /// The requested transition conflicts with the current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Named entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected failure outside the store (e.g. password hashing)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LifecycleError {
    /// Single-field validation failure
    pub fn invalid(field: &str, message: &str) -> Self {
        LifecycleError::Validation(vec![FieldError::new(field, message)])
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl From<ValidationErrors> for LifecycleError {
    fn from(errors: ValidationErrors) -> Self {
        LifecycleError::Validation(field_errors(&errors))
    }
}

/// Flattens validator output into field errors, sorted by field name
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field)),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Runs derive-based validation and converts failures
pub fn validate<T: Validate>(input: &T) -> LifecycleResult<()> {
    input.validate().map_err(LifecycleError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,

        #[validate(length(max = 3))]
        code: String,
    }

    #[test]
    fn test_field_errors_sorted_with_messages() {
        let sample = Sample {
            name: String::new(),
            code: "toolong".to_string(),
        };

        let LifecycleError::Validation(errors) = validate(&sample).unwrap_err() else {
            panic!("expected validation error");
        };

        assert_eq!(
            errors,
            vec![
                FieldError::new("code", "Invalid code"),
                FieldError::new("name", "Name is required"),
            ]
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LifecycleError::InactiveItem(ItemStatus::Claimed).to_string(),
            "Item is not active (status: claimed)"
        );
        assert_eq!(LifecycleError::NotFound("Item").to_string(), "Item not found");
    }
}
