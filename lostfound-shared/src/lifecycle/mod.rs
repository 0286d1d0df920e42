/// Claim and listing lifecycle
///
/// The operations here own every state change of users, items and claims.
/// Each takes the requesting user's id and a `&dyn Store`, enforces ownership
/// and state rules, and leaves stored state untouched when it fails.
///
/// - [`accounts`]: registration and credential checks
/// - [`items`]: create, edit, close and delete listings
/// - [`claims`]: submit, approve and reject claim requests

pub mod accounts;
pub mod claims;
pub mod items;
