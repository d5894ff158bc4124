//! # API Shared
//!
//! Shared utilities and definitions for the MedVault APIs.
//!
//! Contains:
//! - Identity token issuing and validation (`auth`)
//! - Shared services like `HealthService`
//! - Request and response bodies (`dto`)
//!
//! Used by `api-rest` and the root server binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{bearer_token, Claims, TokenError, TokenService};
pub use health::{HealthRes, HealthService};
