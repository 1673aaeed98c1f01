//! # FiscalGuard Common Library
//!
//! Shared code for the FiscalGuard services:
//! - Error types
//! - Configuration loading (TOML file + environment overrides)
//! - Admin session-token helpers

pub mod auth;
pub mod config;
pub mod error;

pub use error::{Error, Result};
