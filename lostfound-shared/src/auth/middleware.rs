/// Authentication middleware for Axum
///
/// Validates `Authorization: Bearer <token>` headers and adds an
/// [`AuthContext`] to the request extensions.
///
/// # Middleware Types
///
/// - **Required**: rejects the request with 401 when the token is missing or invalid
/// - **Optional**: lets anonymous requests through; a valid token still attaches
///   the context so handlers can personalise the response
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware, Extension};
/// use lostfound_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{future::Future, pin::Pin};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};

/// Authentication context added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username carried in the token
    pub username: String,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let error = if status == StatusCode::BAD_REQUEST {
            "bad_request"
        } else {
            "unauthorized"
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Extracts and validates the bearer token from request headers
///
/// Returns `Ok(None)` when no Authorization header is present.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Option<AuthContext>, AuthError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_header = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Invalid authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(Some(AuthContext::from_claims(claims)))
}

/// JWT authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing, the token is invalid
/// or it has expired, and 400 if the header is not a Bearer token.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context =
        authenticate(req.headers(), &secret)?.ok_or(AuthError::MissingCredentials)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Optional JWT authentication middleware
///
/// Never rejects. An unusable token is treated like no token at all.
pub async fn optional_jwt_auth_middleware(secret: String, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), &secret) {
        Ok(Some(auth_context)) => {
            req.extensions_mut().insert(auth_context);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::debug!(error = ?e, "Ignoring unusable token on public route");
        }
    }

    next.run(req).await
}

type MiddlewareFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Creates a required JWT authentication middleware closure
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use lostfound_shared::auth::middleware::create_jwt_middleware;
///
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```
pub fn create_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> MiddlewareFuture<Result<Response, AuthError>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}

/// Creates an optional JWT authentication middleware closure
pub fn create_optional_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> MiddlewareFuture<Response> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(optional_jwt_auth_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::from_claims(Claims::new(user_id, "alice", TokenType::Access));

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.username, "alice");
    }

    #[test]
    fn test_authenticate_without_header() {
        assert!(matches!(authenticate(&HeaderMap::new(), SECRET), Ok(None)));
    }

    #[test]
    fn test_authenticate_valid_access_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id, "alice", TokenType::Access), SECRET).unwrap();

        let context = authenticate(&bearer(&token), SECRET).unwrap().unwrap();
        assert_eq!(context.user_id, user_id);
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let token =
            create_token(&Claims::new(Uuid::new_v4(), "alice", TokenType::Refresh), SECRET).unwrap();

        assert!(matches!(
            authenticate(&bearer(&token), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_authenticate_rejects_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        assert!(matches!(
            authenticate(&headers, SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidFormat("test".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidToken("test".to_string()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
