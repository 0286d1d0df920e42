/// Database models for the lost-and-found portal
///
/// This module contains the persistent entities and their PostgreSQL operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `item`: Lost/found listings and their lifecycle status
/// - `claim`: Claim requests reviewed by item owners
///
/// Ownership: an item belongs to exactly one user; a claim belongs to its item
/// and references its claimant. Deleting a user or an item cascades to the
/// dependent rows.

pub mod claim;
pub mod item;
pub mod user;

/// Error returned when parsing an unknown enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    /// What was being parsed (e.g. "category")
    pub kind: &'static str,

    /// The rejected input
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
