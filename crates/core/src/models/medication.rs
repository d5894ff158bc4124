use super::default_true;
use crate::dates::deserialize_optional_date;
use chrono::{DateTime, NaiveDate, Utc};
use medvault_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub pharmacy_name: String,
    pub pharmacy_phone: String,
    pub pharmacy_address: String,
    pub last_refill_date: Option<NaiveDate>,
    pub next_refill_date: Option<NaiveDate>,
    /// Stored for clients; the refill query uses a fixed window instead.
    pub refill_reminder_days: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

fn default_refill_reminder_days() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewMedication {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub medicine_name: NonEmptyText,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub pharmacy_name: String,
    #[serde(default)]
    pub pharmacy_phone: String,
    #[serde(default)]
    pub pharmacy_address: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub last_refill_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub next_refill_date: Option<NaiveDate>,
    #[serde(default = "default_refill_reminder_days")]
    pub refill_reminder_days: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct MedicationPatch {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub medicine_name: Option<NonEmptyText>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub pharmacy_name: Option<String>,
    pub pharmacy_phone: Option<String>,
    pub pharmacy_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub last_refill_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub next_refill_date: Option<NaiveDate>,
    pub refill_reminder_days: Option<i64>,
    pub is_active: Option<bool>,
}
