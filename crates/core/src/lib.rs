//! # MedVault Core
//!
//! Core business logic for the MedVault personal medical record system.
//!
//! This crate contains pure data operations over the relational store:
//! - Users and credential checks (`repositories::users`, `credentials`)
//! - Owner-scoped CRUD for prescriptions, appointments, lab reports, insurance,
//!   medications and reminders
//! - The share-link lifecycle: issuance, resolution guards, access auditing and revocation
//!
//! **No API concerns**: identity tokens, HTTP routing and request parsing belong in
//! `api-shared` and `api-rest`.

pub mod config;
pub mod constants;
pub mod credentials;
pub mod dates;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use config::{AppEnvironment, CoreConfig};
pub use constants::*;
pub use db::Database;
pub use error::{RecordError, RecordResult};
pub use medvault_types::{EmailAddress, NonEmptyText, TextError};
pub use repositories::{
    medications::MedicationService,
    records::RecordService,
    reminders::ReminderService,
    shared::Pagination,
    sharing::{IssueShareLink, OpenedShare, SharingService, Visitor},
    users::UserService,
};
pub use sqlx;
