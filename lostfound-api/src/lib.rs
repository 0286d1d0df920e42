//! # Lost & Found API Server Library
//!
//! HTTP surface of the lost-and-found portal.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors with API-shaped rejections
//! - `middleware`: Response-level middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
