/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and token refresh
/// - `home`: Dashboard
/// - `items`: Search and item lifecycle
/// - `claims`: Claim submission and review
/// - `profile`: The authenticated user's page
/// - `views`: Response shapes with display labels

pub mod auth;
pub mod claims;
pub mod health;
pub mod home;
pub mod items;
pub mod profile;
pub mod views;
