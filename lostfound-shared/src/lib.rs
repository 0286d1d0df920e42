//! # Lost & Found Shared Library
//!
//! Domain types, persistence and lifecycle rules used by the Lost & Found
//! portal API server.
//!
//! ## Module Organization
//!
//! - `models`: users, items and claim requests with their PostgreSQL queries
//! - `store`: the `Store` trait with PostgreSQL and in-memory backends
//! - `lifecycle`: state-changing operations (accounts, items, claims)
//! - `listing`: read models (search, home, item detail, profile)
//! - `auth`: password hashing, JWT tokens and Axum middleware
//! - `db`: connection pool and migrations
//! - `error`: lifecycle error kinds

pub mod auth;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
