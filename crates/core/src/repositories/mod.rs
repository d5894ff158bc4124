//! Repository services.
//!
//! Each service wraps a cloned [`crate::Database`] handle and exposes the operations for one
//! area of the store: accounts, clinical documents, medications, reminders and share grants.
//! Every non-public query is filtered by the owning user.

pub mod medications;
pub mod records;
pub mod reminders;
pub mod shared;
pub mod sharing;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
