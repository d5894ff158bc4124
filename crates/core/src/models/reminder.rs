use crate::dates::{deserialize_datetime, deserialize_optional_datetime};
use chrono::{DateTime, Utc};
use medvault_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub reminder_date: DateTime<Utc>,
    pub reminder_type: String,
    pub is_completed: bool,
    pub is_recurring: bool,
    pub recurrence_interval: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewReminder {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub title: NonEmptyText,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub reminder_date: DateTime<Utc>,
    #[serde(default)]
    pub reminder_type: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_interval: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct ReminderPatch {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub title: Option<NonEmptyText>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub reminder_date: Option<DateTime<Utc>>,
    pub reminder_type: Option<String>,
    pub is_completed: Option<bool>,
    pub is_recurring: Option<bool>,
    pub recurrence_interval: Option<String>,
}
