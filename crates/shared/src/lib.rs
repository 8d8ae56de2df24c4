//! Shared types, errors, and configuration for Cambio.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error taxonomy
//! - Request context carrying the acting identity
//! - Configuration management

pub mod config;
pub mod context;
pub mod error;

pub use config::AppConfig;
pub use context::RequestContext;
pub use error::{AppError, AppResult};
