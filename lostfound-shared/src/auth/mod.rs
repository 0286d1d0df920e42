/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: Axum middleware attaching an [`middleware::AuthContext`]
///
/// # Example
///
/// ```no_run
/// use lostfound_shared::auth::password::{hash_password, verify_password};
/// use lostfound_shared::auth::jwt::issue_token_pair;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (access, refresh) = issue_token_pair(Uuid::new_v4(), "alice", "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
