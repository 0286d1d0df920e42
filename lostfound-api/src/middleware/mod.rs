/// Middleware modules for the API server
///
/// Authentication middleware lives in `lostfound_shared::auth::middleware`;
/// this module holds the response-level layers.

pub mod security;
