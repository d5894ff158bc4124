//! Constants used throughout the MedVault core crate.
//!
//! Defaults for configuration values and fixed windows used by record queries live here so
//! binaries, services and tests agree on them.

/// Default SQLite database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://medvault.db?mode=rwc";

/// Default size of the database connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default identity token lifetime in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Longest accepted identity token lifetime in hours (one year).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Signing secret used only when running in the development environment.
pub const DEVELOPMENT_JWT_SECRET: &str = "change-me-in-production";

/// Relative URL prefix under which share tokens are resolved.
pub const SHARE_URL_PREFIX: &str = "/share/";

/// Number of random bytes behind each share token.
pub const SHARE_TOKEN_BYTES: usize = 32;

/// Fixed look-ahead for medications needing a refill.
pub const REFILL_WINDOW_DAYS: i64 = 7;

/// Default look-ahead for upcoming reminders.
pub const DEFAULT_UPCOMING_REMINDER_DAYS: i64 = 30;

/// Default page size for list operations.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound on page size for list operations.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 8;
