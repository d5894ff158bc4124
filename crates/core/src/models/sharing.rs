//! Share grants, their access trail, and the record sets a grant resolves to.

use super::{Appointment, LabReport, Prescription};
use crate::{RecordError, RecordResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kind of records a share grant covers.
///
/// Stored as a text tag. A bundle spans prescriptions, appointments and lab reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ShareScope {
    Prescription,
    Appointment,
    LabReport,
    Bundle,
}

impl ShareScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareScope::Prescription => "prescription",
            ShareScope::Appointment => "appointment",
            ShareScope::LabReport => "lab_report",
            ShareScope::Bundle => "bundle",
        }
    }
}

impl FromStr for ShareScope {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prescription" => Ok(ShareScope::Prescription),
            "appointment" => Ok(ShareScope::Appointment),
            "lab_report" => Ok(ShareScope::LabReport),
            "bundle" => Ok(ShareScope::Bundle),
            other => Err(RecordError::InvalidScope(other.to_owned())),
        }
    }
}

impl fmt::Display for ShareScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the owner intends to hand the link over. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ShareMethod {
    Email,
    Sms,
    #[default]
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccessAction {
    Viewed,
    Downloaded,
}

/// An issued share grant.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SharedRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub share_token: String,
    /// Kept as the stored text so an unknown tag surfaces as an error on resolution rather
    /// than failing the row decode.
    pub record_type: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub record_ids: Json<Vec<Uuid>>,
    pub expires_at: DateTime<Utc>,
    /// Zero means unlimited.
    pub max_access_count: i64,
    pub current_access_count: i64,
    pub allow_download: bool,
    pub recipient_email: String,
    pub recipient_phone: String,
    pub share_method: ShareMethod,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SharedRecord {
    pub fn scope(&self) -> RecordResult<ShareScope> {
        self.record_type.parse()
    }

    pub fn record_ids(&self) -> &[Uuid] {
        &self.record_ids.0
    }

    /// Check every resolution guard against `now`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NotFound`] if the grant has been revoked.
    /// - [`RecordError::Expired`] if `now` is at or past `expires_at`.
    /// - [`RecordError::AccessExhausted`] if a ceiling is set and has been reached.
    pub fn check_resolvable(&self, now: DateTime<Utc>) -> RecordResult<()> {
        if !self.is_active {
            return Err(RecordError::NotFound("share link"));
        }
        if now >= self.expires_at {
            return Err(RecordError::Expired);
        }
        if self.max_access_count > 0 && self.current_access_count >= self.max_access_count {
            return Err(RecordError::AccessExhausted);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditLog {
    pub id: Uuid,
    pub shared_record_id: Uuid,
    pub ip_address: String,
    pub user_agent: String,
    pub accessed_at: DateTime<Utc>,
    pub action: AccessAction,
}

/// A grant together with its access trail, as listed to the owner.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShareLinkSummary {
    #[serde(flatten)]
    pub shared_record: SharedRecord,
    pub access_logs: Vec<AuditLog>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordBundle {
    pub prescriptions: Vec<Prescription>,
    pub appointments: Vec<Appointment>,
    pub lab_reports: Vec<LabReport>,
}

/// The records a grant resolves to, shaped by its scope.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum SharedRecords {
    Prescriptions(Vec<Prescription>),
    Appointments(Vec<Appointment>),
    LabReports(Vec<LabReport>),
    Bundle(RecordBundle),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(is_active: bool, expires_in: Duration, max: i64, count: i64) -> SharedRecord {
        let now = Utc::now();
        SharedRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            share_token: "token".into(),
            record_type: "bundle".into(),
            record_ids: Json(vec![]),
            expires_at: now + expires_in,
            max_access_count: max,
            current_access_count: count,
            allow_download: false,
            recipient_email: String::new(),
            recipient_phone: String::new(),
            share_method: ShareMethod::Link,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_scope_round_trips_through_tag() {
        for scope in [
            ShareScope::Prescription,
            ShareScope::Appointment,
            ShareScope::LabReport,
            ShareScope::Bundle,
        ] {
            assert_eq!(scope.as_str().parse::<ShareScope>().unwrap(), scope);
        }
    }

    #[test]
    fn test_unknown_scope_is_invalid() {
        let err = "insurance".parse::<ShareScope>().expect_err("not shareable");
        assert!(matches!(err, RecordError::InvalidScope(tag) if tag == "insurance"));
    }

    #[test]
    fn test_resolvable_matches_guard_formula() {
        let now = Utc::now();
        for is_active in [true, false] {
            for expired in [true, false] {
                for (max, count) in [(0, 0), (0, 50), (3, 2), (3, 3), (3, 4), (1, 0)] {
                    let ttl = if expired {
                        Duration::hours(-1)
                    } else {
                        Duration::hours(1)
                    };
                    let record = grant(is_active, ttl, max, count);
                    let expected = is_active && !expired && (max == 0 || count < max);
                    assert_eq!(
                        record.check_resolvable(now).is_ok(),
                        expected,
                        "active={is_active} expired={expired} max={max} count={count}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_guard_order_reports_revocation_first() {
        let now = Utc::now();
        let revoked = grant(false, Duration::hours(-1), 1, 1);
        assert!(matches!(
            revoked.check_resolvable(now),
            Err(RecordError::NotFound(_))
        ));

        let expired = grant(true, Duration::hours(-1), 1, 1);
        assert!(matches!(
            expired.check_resolvable(now),
            Err(RecordError::Expired)
        ));

        let exhausted = grant(true, Duration::hours(1), 1, 1);
        assert!(matches!(
            exhausted.check_resolvable(now),
            Err(RecordError::AccessExhausted)
        ));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let record = grant(true, Duration::hours(1), 0, 0);
        assert!(matches!(
            record.check_resolvable(record.expires_at),
            Err(RecordError::Expired)
        ));
    }

    #[test]
    fn test_summary_flattens_shared_record() {
        let record = grant(true, Duration::hours(1), 0, 0);
        let summary = ShareLinkSummary {
            shared_record: record,
            access_logs: vec![],
        };
        let json = serde_json::to_value(&summary).expect("serialise");
        assert_eq!(json["record_type"], "bundle");
        assert!(json["access_logs"].as_array().unwrap().is_empty());
    }
}
