//! Clinical documents: prescriptions, appointments, lab reports and insurance policies.

use super::default_true;
use crate::dates::{
    deserialize_date, deserialize_datetime, deserialize_optional_date,
    deserialize_optional_datetime,
};
use chrono::{DateTime, NaiveDate, Utc};
use medvault_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Prescription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medicine_name: String,
    pub dosage: String,
    pub instructions: String,
    pub prescribing_doctor: String,
    pub doctor_specialty: String,
    pub hospital: String,
    pub prescription_date: NaiveDate,
    pub attachment_url: String,
    pub attachment_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewPrescription {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub medicine_name: NonEmptyText,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub prescribing_doctor: String,
    #[serde(default)]
    pub doctor_specialty: String,
    #[serde(default)]
    pub hospital: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub prescription_date: NaiveDate,
    #[serde(default)]
    pub attachment_url: String,
    #[serde(default)]
    pub attachment_type: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct PrescriptionPatch {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub medicine_name: Option<NonEmptyText>,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
    pub prescribing_doctor: Option<String>,
    pub doctor_specialty: Option<String>,
    pub hospital: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub prescription_date: Option<NaiveDate>,
    pub attachment_url: Option<String>,
    pub attachment_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doctor_name: String,
    pub specialty: String,
    pub hospital: String,
    pub location: String,
    pub appointment_date: DateTime<Utc>,
    pub notes: String,
    pub is_completed: bool,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewAppointment {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub doctor_name: NonEmptyText,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub hospital: String,
    #[serde(default)]
    pub location: String,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct AppointmentPatch {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub doctor_name: Option<NonEmptyText>,
    pub specialty: Option<String>,
    pub hospital: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub appointment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_completed: Option<bool>,
    pub reminder_sent: Option<bool>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LabReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_type: String,
    pub lab_name: String,
    pub test_date: NaiveDate,
    pub report_url: String,
    pub report_type: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewLabReport {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub test_type: NonEmptyText,
    #[serde(default)]
    pub lab_name: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub test_date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub report_url: NonEmptyText,
    #[serde(default)]
    pub report_type: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct LabReportPatch {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub test_type: Option<NonEmptyText>,
    pub lab_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub test_date: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub report_url: Option<NonEmptyText>,
    pub report_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthInsurance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub insurance_provider: String,
    pub policy_number: String,
    pub group_number: String,
    pub member_id: String,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewHealthInsurance {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub insurance_provider: NonEmptyText,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub policy_number: NonEmptyText,
    #[serde(default)]
    pub group_number: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct HealthInsurancePatch {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub insurance_provider: Option<NonEmptyText>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub policy_number: Option<NonEmptyText>,
    pub group_number: Option<String>,
    pub member_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub expiration_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prescription_defaults() {
        let input: NewPrescription = serde_json::from_str(
            r#"{"medicine_name": "Amoxicillin", "prescription_date": "2024-02-01"}"#,
        )
        .expect("minimal prescription should parse");

        assert_eq!(input.medicine_name.as_str(), "Amoxicillin");
        assert!(input.is_active);
        assert!(input.dosage.is_empty());
    }

    #[test]
    fn test_new_prescription_requires_medicine_name() {
        let result = serde_json::from_str::<NewPrescription>(
            r#"{"medicine_name": "  ", "prescription_date": "2024-02-01"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_appointment_accepts_datetime_local() {
        let input: NewAppointment = serde_json::from_str(
            r#"{"doctor_name": "Dr Patel", "appointment_date": "2030-06-01T14:15"}"#,
        )
        .expect("datetime-local value should parse");
        assert_eq!(input.appointment_date.to_rfc3339(), "2030-06-01T14:15:00+00:00");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<PrescriptionPatch>(r#"{"user_id": "x"}"#)
            .expect_err("owner cannot be patched");
        assert!(err.to_string().contains("unknown field"));

        let err = serde_json::from_str::<LabReportPatch>(r#"{"created_at": "2024-01-01"}"#)
            .expect_err("timestamps cannot be patched");
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_serialised_row_omits_deleted_at() {
        let now = Utc::now();
        let report = LabReport {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            test_type: "CBC".into(),
            lab_name: String::new(),
            test_date: now.date_naive(),
            report_url: "https://example.com/r.pdf".into(),
            report_type: "pdf".into(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let json = serde_json::to_value(&report).expect("serialise");
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["test_type"], "CBC");
    }
}
