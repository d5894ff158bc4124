//! Request and response bodies for the REST API.
//!
//! Record payloads (`NewPrescription`, `PrescriptionPatch`, ...) are reused directly from
//! `medvault_core::models`; this module holds the envelopes around them.

use medvault_core::models::{
    Appointment, LabReport, Medication, NewUser, Prescription, Reminder, ShareLinkSummary,
    ShareMethod, SharedRecord, SharedRecords, User, UserRole,
};
use medvault_core::{EmailAddress, IssueShareLink, NonEmptyText, TextError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

impl RegisterReq {
    /// Validate the text fields into a registration request for the user service.
    pub fn into_new_user(self) -> Result<NewUser, TextError> {
        Ok(NewUser {
            email: EmailAddress::parse(&self.email)?,
            password: self.password,
            first_name: NonEmptyText::new(&self.first_name)?,
            last_name: NonEmptyText::new(&self.last_name)?,
            phone: self.phone,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// Public subset of a user returned alongside a fresh token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthRes {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileRes {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateShareReq {
    /// One of `prescription`, `appointment`, `lab_report` or `bundle`.
    pub record_type: String,
    #[serde(default)]
    pub record_ids: Vec<Uuid>,
    pub expires_in_hours: i64,
    /// Zero means unlimited.
    #[serde(default)]
    pub max_access_count: i64,
    #[serde(default)]
    pub allow_download: bool,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_phone: String,
    #[serde(default)]
    pub share_method: ShareMethod,
}

impl CreateShareReq {
    pub fn into_issue(self, owner_id: Uuid) -> IssueShareLink {
        IssueShareLink {
            owner_id,
            record_type: self.record_type,
            record_ids: self.record_ids,
            expires_in_hours: self.expires_in_hours,
            max_access_count: self.max_access_count,
            allow_download: self.allow_download,
            recipient_email: self.recipient_email,
            recipient_phone: self.recipient_phone,
            share_method: self.share_method,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateShareRes {
    pub shared_record: SharedRecord,
    /// Relative URL that resolves the link.
    pub share_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SharedAccessRes {
    pub shared_record: SharedRecord,
    pub records: SharedRecords,
    pub allow_download: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MySharesRes {
    pub data: Vec<ShareLinkSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MedicationListRes {
    pub data: Vec<Medication>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReminderListRes {
    pub data: Vec<Reminder>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardRes {
    pub prescriptions: Vec<Prescription>,
    pub appointments: Vec<Appointment>,
    pub lab_reports: Vec<LabReport>,
    pub medications: Vec<Medication>,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_req_validates_fields() {
        let req: RegisterReq = serde_json::from_str(
            r#"{"email": "Ada@Example.com", "password": "password123",
                "first_name": "Ada", "last_name": "Lovelace"}"#,
        )
        .expect("parse");
        let new_user = req.into_new_user().expect("valid registration");
        assert_eq!(new_user.email.as_str(), "ada@example.com");
        assert!(new_user.phone.is_empty());

        let req: RegisterReq = serde_json::from_str(
            r#"{"email": "not-an-email", "password": "password123",
                "first_name": "Ada", "last_name": "Lovelace"}"#,
        )
        .expect("parse");
        assert!(matches!(
            req.into_new_user(),
            Err(TextError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_create_share_req_defaults() {
        let req: CreateShareReq =
            serde_json::from_str(r#"{"record_type": "bundle", "expires_in_hours": 48}"#)
                .expect("parse");
        assert_eq!(req.max_access_count, 0);
        assert!(!req.allow_download);
        assert_eq!(req.share_method, ShareMethod::Link);

        let owner = Uuid::new_v4();
        let issue = req.into_issue(owner);
        assert_eq!(issue.owner_id, owner);
        assert_eq!(issue.expires_in_hours, 48);
        assert!(issue.record_ids.is_empty());
    }
}
