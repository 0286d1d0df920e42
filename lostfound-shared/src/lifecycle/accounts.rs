/// Account registration and credential checks
///
/// Token issuing happens at the HTTP boundary; this module only deals with
/// stored users and password hashes.

use serde::Deserialize;
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use crate::{
    auth::password::{hash_password, validate_password_strength, verify_password},
    error::{validate, LifecycleError, LifecycleResult},
    models::user::{CreateUser, User, USERNAME_CONSTRAINT},
    store::Store,
};

/// Registration input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(
        length(min = 3, max = 150, message = "Username must be 3-150 characters"),
        custom(function = "validate_username_chars")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: String,
}

/// Letters, digits and `@ . + - _` only
fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("username_chars");
        error.message =
            Some("Username may only contain letters, digits and @/./+/-/_ characters".into());
        Err(error)
    }
}

/// Creates a new account
///
/// # Errors
///
/// - `Validation` for a malformed username/email, a weak password or a taken username
pub async fn register(store: &dyn Store, input: RegisterInput) -> LifecycleResult<User> {
    let input = RegisterInput {
        username: input.username.trim().to_string(),
        email: input
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
        password: input.password,
    };
    validate(&input)?;

    validate_password_strength(&input.password, &input.username)
        .map_err(|msg| LifecycleError::invalid("password", &msg))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| LifecycleError::Internal(format!("Could not hash password: {}", e)))?;

    let user = store
        .create_user(CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation_of(USERNAME_CONSTRAINT) {
                LifecycleError::invalid("username", "A user with that username already exists")
            } else {
                e.into()
            }
        })?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Checks a username/password pair
///
/// Returns None for an unknown user or a wrong password so callers cannot
/// tell the two apart.
pub async fn authenticate(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> LifecycleResult<Option<User>> {
    let Some(user) = store.find_user_by_username(username.trim()).await? else {
        debug!("Login attempt for unknown username");
        return Ok(None);
    };

    let matches = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
        debug!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
        false
    });

    if !matches {
        debug!(user_id = %user.id, "Login attempt with wrong password");
        return Ok(None);
    }

    store.record_login(user.id).await?;
    Ok(Some(user))
}
