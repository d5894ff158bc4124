//! Share-link lifecycle.
//!
//! A share link grants unauthenticated, read-only access to a scoped set of an owner's
//! records through an opaque token. This module issues links, checks them on every access,
//! records each access in the audit trail, and lets owners list and revoke their links.
//!
//! ## Resolution guards
//!
//! A link resolves only while it is active, unexpired, and under its access ceiling (zero
//! means no ceiling). All three guards are re-checked on every access; see
//! [`SharedRecord::check_resolvable`].
//!
//! ## Known gaps
//!
//! - Issuance does not check that the shared record ids belong to the issuer.
//! - Resolution fetches records by id without filtering on the issuer.

use super::records::RecordService;
use crate::constants::SHARE_TOKEN_BYTES;
use crate::models::{
    AccessAction, AuditLog, RecordBundle, ShareLinkSummary, ShareMethod, ShareScope,
    SharedRecord, SharedRecords,
};
use crate::{Database, RecordError, RecordResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

/// Parameters for a new share link.
#[derive(Debug, Clone)]
pub struct IssueShareLink {
    pub owner_id: Uuid,
    /// Raw scope tag; validated on issue.
    pub record_type: String,
    pub record_ids: Vec<Uuid>,
    pub expires_in_hours: i64,
    /// Zero means unlimited.
    pub max_access_count: i64,
    pub allow_download: bool,
    pub recipient_email: String,
    pub recipient_phone: String,
    pub share_method: ShareMethod,
}

/// Who opened a share link, as recorded in the audit trail.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub ip_address: String,
    pub user_agent: String,
}

/// A resolved link together with the records it grants.
#[derive(Debug, Clone)]
pub struct OpenedShare {
    pub shared_record: SharedRecord,
    pub records: SharedRecords,
}

#[derive(Clone, Debug)]
pub struct SharingService {
    db: Database,
    records: RecordService,
}

fn generate_share_token() -> String {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl SharingService {
    pub fn new(db: Database) -> Self {
        Self {
            records: RecordService::new(db.clone()),
            db,
        }
    }

    /// Issue a new share link.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidInput`] if the lifetime is not positive, the access ceiling is
    ///   negative, or a single-type scope has no record ids.
    /// - [`RecordError::InvalidScope`] if `record_type` is not a shareable type.
    /// - [`RecordError::Conflict`] if the generated token collides with an existing one.
    pub async fn issue(&self, request: IssueShareLink) -> RecordResult<SharedRecord> {
        if request.expires_in_hours <= 0 {
            return Err(RecordError::InvalidInput(
                "expires_in_hours must be greater than zero".into(),
            ));
        }
        let scope: ShareScope = request.record_type.parse()?;
        if scope != ShareScope::Bundle && request.record_ids.is_empty() {
            return Err(RecordError::InvalidInput(
                "record_ids cannot be empty".into(),
            ));
        }
        if request.max_access_count < 0 {
            return Err(RecordError::InvalidInput(
                "max_access_count cannot be negative".into(),
            ));
        }

        let now = Utc::now();
        let expires_at = Duration::try_hours(request.expires_in_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| RecordError::InvalidInput("expires_in_hours is too large".into()))?;

        let shared_record = SharedRecord {
            id: Uuid::new_v4(),
            user_id: request.owner_id,
            share_token: generate_share_token(),
            record_type: scope.as_str().to_owned(),
            record_ids: Json(request.record_ids),
            expires_at,
            max_access_count: request.max_access_count,
            current_access_count: 0,
            allow_download: request.allow_download,
            recipient_email: request.recipient_email.trim().to_owned(),
            recipient_phone: request.recipient_phone.trim().to_owned(),
            share_method: request.share_method,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO shared_records (id, user_id, share_token, record_type, record_ids, \
             expires_at, max_access_count, current_access_count, allow_download, \
             recipient_email, recipient_phone, share_method, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(shared_record.id)
        .bind(shared_record.user_id)
        .bind(&shared_record.share_token)
        .bind(&shared_record.record_type)
        .bind(&shared_record.record_ids)
        .bind(shared_record.expires_at)
        .bind(shared_record.max_access_count)
        .bind(shared_record.current_access_count)
        .bind(shared_record.allow_download)
        .bind(&shared_record.recipient_email)
        .bind(&shared_record.recipient_phone)
        .bind(shared_record.share_method)
        .bind(shared_record.is_active)
        .bind(shared_record.created_at)
        .bind(shared_record.updated_at)
        .execute(self.db.pool())
        .await
        .map_err(|e| RecordError::conflict_on_unique(e, "share token"))?;

        tracing::info!(
            "issued share link {} ({}) for user {}",
            shared_record.id,
            scope,
            shared_record.user_id
        );
        if shared_record.share_method != ShareMethod::Link {
            tracing::debug!(
                "skipping {:?} delivery for share link {}",
                shared_record.share_method,
                shared_record.id
            );
        }

        Ok(shared_record)
    }

    /// Look up a link by token and check every resolution guard.
    ///
    /// Does not count as an access.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NotFound`] if no active link has this token.
    /// - [`RecordError::Expired`] if the link's lifetime has passed.
    /// - [`RecordError::AccessExhausted`] if the access ceiling has been reached.
    pub async fn resolve(&self, token: &str) -> RecordResult<SharedRecord> {
        self.resolve_at(token, Utc::now()).await
    }

    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> RecordResult<SharedRecord> {
        let shared_record = sqlx::query_as::<_, SharedRecord>(
            "SELECT * FROM shared_records WHERE share_token = ? AND is_active = 1",
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(RecordError::NotFound("share link"))?;

        shared_record.check_resolvable(now)?;
        Ok(shared_record)
    }

    /// Append an audit entry and count one access, atomically.
    ///
    /// The increment only applies while the link is active, unexpired and under its ceiling,
    /// so concurrent callers racing for the last access cannot overshoot it.
    ///
    /// Returns the access count after this access.
    ///
    /// # Errors
    ///
    /// - [`RecordError::AccessExhausted`] if another access took the last slot first.
    /// - [`RecordError::Expired`] if the link expired since it was resolved.
    /// - [`RecordError::NotFound`] if the link does not exist or has been revoked.
    pub async fn record_access(
        &self,
        shared_record_id: Uuid,
        visitor: &Visitor,
        action: AccessAction,
    ) -> RecordResult<i64> {
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE shared_records \
             SET current_access_count = current_access_count + 1, updated_at = ? \
             WHERE id = ? AND is_active = 1 AND expires_at > ? \
             AND (max_access_count = 0 OR current_access_count < max_access_count) \
             RETURNING current_access_count",
        )
        .bind(now)
        .bind(shared_record_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(count) = count else {
            let state: Option<(bool, DateTime<Utc>)> = sqlx::query_as(
                "SELECT is_active, expires_at FROM shared_records WHERE id = ?",
            )
            .bind(shared_record_id)
            .fetch_optional(&mut *tx)
            .await?;
            return Err(match state {
                Some((true, expires_at)) if now >= expires_at => RecordError::Expired,
                Some((true, _)) => RecordError::AccessExhausted,
                _ => RecordError::NotFound("share link"),
            });
        };

        sqlx::query(
            "INSERT INTO audit_logs (id, shared_record_id, ip_address, user_agent, \
             accessed_at, action) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(shared_record_id)
        .bind(&visitor.ip_address)
        .bind(&visitor.user_agent)
        .bind(now)
        .bind(action)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(count)
    }

    /// Fetch the live records a scope grants.
    ///
    /// A bundle looks the same ids up in prescriptions, appointments and lab reports.
    pub async fn records_for_scope(
        &self,
        scope: ShareScope,
        ids: &[Uuid],
    ) -> RecordResult<SharedRecords> {
        Ok(match scope {
            ShareScope::Prescription => {
                SharedRecords::Prescriptions(self.records.prescriptions_by_ids(ids).await?)
            }
            ShareScope::Appointment => {
                SharedRecords::Appointments(self.records.appointments_by_ids(ids).await?)
            }
            ShareScope::LabReport => {
                SharedRecords::LabReports(self.records.lab_reports_by_ids(ids).await?)
            }
            ShareScope::Bundle => SharedRecords::Bundle(RecordBundle {
                prescriptions: self.records.prescriptions_by_ids(ids).await?,
                appointments: self.records.appointments_by_ids(ids).await?,
                lab_reports: self.records.lab_reports_by_ids(ids).await?,
            }),
        })
    }

    /// Resolve a token, fetch its records and count the access.
    ///
    /// Records are fetched before the access is counted, so a failed lookup does not consume
    /// an access.
    ///
    /// # Errors
    ///
    /// Any error from [`SharingService::resolve`] or [`SharingService::record_access`], plus
    /// [`RecordError::DownloadNotAllowed`] for a download of a view-only link and
    /// [`RecordError::InvalidScope`] if the stored scope tag is unknown.
    pub async fn open(
        &self,
        token: &str,
        visitor: &Visitor,
        action: AccessAction,
    ) -> RecordResult<OpenedShare> {
        let mut shared_record = self.resolve(token).await?;
        if action == AccessAction::Downloaded && !shared_record.allow_download {
            return Err(RecordError::DownloadNotAllowed);
        }

        let scope = shared_record.scope()?;
        let records = self
            .records_for_scope(scope, shared_record.record_ids())
            .await?;

        shared_record.current_access_count = self
            .record_access(shared_record.id, visitor, action)
            .await?;

        Ok(OpenedShare {
            shared_record,
            records,
        })
    }

    /// Deactivate one of the owner's links.
    ///
    /// Returns the number of rows changed. Zero covers both an unknown id and a link owned by
    /// someone else, and is not an error.
    pub async fn revoke(&self, owner_id: Uuid, share_id: Uuid) -> RecordResult<u64> {
        let result = sqlx::query(
            "UPDATE shared_records SET is_active = 0, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(Utc::now())
        .bind(share_id)
        .bind(owner_id)
        .execute(self.db.pool())
        .await?;

        let affected = result.rows_affected();
        if affected > 0 {
            tracing::info!("revoked share link {} for user {}", share_id, owner_id);
        }
        Ok(affected)
    }

    /// The owner's links, newest first, each with its audit trail (newest access first).
    pub async fn list_for_owner(&self, owner_id: Uuid) -> RecordResult<Vec<ShareLinkSummary>> {
        let shared_records = sqlx::query_as::<_, SharedRecord>(
            "SELECT * FROM shared_records WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        let logs = sqlx::query_as::<_, AuditLog>(
            "SELECT a.* FROM audit_logs a \
             JOIN shared_records s ON s.id = a.shared_record_id \
             WHERE s.user_id = ? ORDER BY a.accessed_at DESC",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut by_share: HashMap<Uuid, Vec<AuditLog>> = HashMap::new();
        for log in logs {
            by_share.entry(log.shared_record_id).or_default().push(log);
        }

        Ok(shared_records
            .into_iter()
            .map(|shared_record| ShareLinkSummary {
                access_logs: by_share.remove(&shared_record.id).unwrap_or_default(),
                shared_record,
            })
            .collect())
    }
}
