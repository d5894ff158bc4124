//! Medication tracking and refill lookups.

use super::shared::{
    fetch_owned, list_owned, select_owned, soft_delete, update_owned, Assignments, OwnedRecord,
    Pagination, RecordPatch,
};
use crate::constants::REFILL_WINDOW_DAYS;
use crate::models::{Medication, MedicationPatch, NewMedication, Page};
use crate::{Database, RecordResult};
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

impl OwnedRecord for Medication {
    const TABLE: &'static str = "medications";
    const LABEL: &'static str = "medication";
    const DEFAULT_ORDER: &'static str = "created_at DESC";
}

impl RecordPatch for MedicationPatch {
    fn apply(self, assignments: &mut Assignments<'_>) {
        assignments
            .set("medicine_name", self.medicine_name.map(String::from))
            .set("dosage", self.dosage)
            .set("frequency", self.frequency)
            .set("pharmacy_name", self.pharmacy_name)
            .set("pharmacy_phone", self.pharmacy_phone)
            .set("pharmacy_address", self.pharmacy_address)
            .set("last_refill_date", self.last_refill_date)
            .set("next_refill_date", self.next_refill_date)
            .set("refill_reminder_days", self.refill_reminder_days)
            .set("is_active", self.is_active);
    }
}

#[derive(Clone, Debug)]
pub struct MedicationService {
    db: Database,
}

impl MedicationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, input: NewMedication) -> RecordResult<Medication> {
        let now = Utc::now();
        let record = Medication {
            id: Uuid::new_v4(),
            user_id,
            medicine_name: input.medicine_name.into_inner(),
            dosage: input.dosage,
            frequency: input.frequency,
            pharmacy_name: input.pharmacy_name,
            pharmacy_phone: input.pharmacy_phone,
            pharmacy_address: input.pharmacy_address,
            last_refill_date: input.last_refill_date,
            next_refill_date: input.next_refill_date,
            refill_reminder_days: input.refill_reminder_days,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO medications (id, user_id, medicine_name, dosage, frequency, \
             pharmacy_name, pharmacy_phone, pharmacy_address, last_refill_date, \
             next_refill_date, refill_reminder_days, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.medicine_name)
        .bind(&record.dosage)
        .bind(&record.frequency)
        .bind(&record.pharmacy_name)
        .bind(&record.pharmacy_phone)
        .bind(&record.pharmacy_address)
        .bind(record.last_refill_date)
        .bind(record.next_refill_date)
        .bind(record.refill_reminder_days)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(record)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        page: Pagination,
        active_only: bool,
    ) -> RecordResult<Page<Medication>> {
        list_owned(&self.db, user_id, page, Medication::DEFAULT_ORDER, |query| {
            if active_only {
                query.push(" AND is_active = 1");
            }
        })
        .await
    }

    /// Every active medication, newest first.
    pub async fn active(&self, user_id: Uuid) -> RecordResult<Vec<Medication>> {
        select_owned(&self.db, user_id, Medication::DEFAULT_ORDER, |query| {
            query.push(" AND is_active = 1");
        })
        .await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> RecordResult<Medication> {
        fetch_owned(&self.db, user_id, id).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: MedicationPatch,
    ) -> RecordResult<Medication> {
        update_owned(&self.db, user_id, id, patch).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> RecordResult<()> {
        soft_delete::<Medication>(&self.db, user_id, id).await
    }

    /// Active medications due for a refill within the fixed window from today.
    ///
    /// Overdue refills are included. Each medication's own `refill_reminder_days` is not
    /// consulted.
    pub async fn needing_refill(&self, user_id: Uuid) -> RecordResult<Vec<Medication>> {
        self.needing_refill_on(user_id, Utc::now().date_naive())
            .await
    }

    pub(crate) async fn needing_refill_on(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> RecordResult<Vec<Medication>> {
        let cutoff = today + Duration::days(REFILL_WINDOW_DAYS);
        select_owned(&self.db, user_id, "next_refill_date ASC", |query| {
            query
                .push(" AND is_active = 1 AND next_refill_date IS NOT NULL AND next_refill_date <= ")
                .push_bind(cutoff);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support;
    use crate::RecordError;

    fn medication(name: &str, next_refill: Option<NaiveDate>, reminder_days: i64) -> NewMedication {
        serde_json::from_value(serde_json::json!({
            "medicine_name": name,
            "next_refill_date": next_refill.map(|d| d.to_string()),
            "refill_reminder_days": reminder_days,
        }))
        .expect("valid medication input")
    }

    #[tokio::test]
    async fn test_refill_window_is_fixed_at_seven_days() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = MedicationService::new(db);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        for (name, offset, reminder_days) in [
            ("overdue", -3, 7),
            ("edge", 7, 1),
            ("outside", 8, 30),
            ("soon", 2, 0),
        ] {
            service
                .create(
                    owner.id,
                    medication(name, Some(today + Duration::days(offset)), reminder_days),
                )
                .await
                .expect("create");
        }
        service
            .create(owner.id, medication("no-date", None, 7))
            .await
            .expect("create");

        let due = service
            .needing_refill_on(owner.id, today)
            .await
            .expect("refill query");
        let names: Vec<_> = due.iter().map(|m| m.medicine_name.as_str()).collect();
        assert_eq!(names, ["overdue", "soon", "edge"]);
    }

    #[tokio::test]
    async fn test_inactive_medications_never_need_refill() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = MedicationService::new(db);
        let today = Utc::now().date_naive();

        let med = service
            .create(owner.id, medication("paused", Some(today), 7))
            .await
            .expect("create");
        let patch: MedicationPatch =
            serde_json::from_str(r#"{"is_active": false}"#).expect("patch");
        service
            .update(owner.id, med.id, patch)
            .await
            .expect("deactivate");

        assert!(service
            .needing_refill(owner.id)
            .await
            .expect("refill query")
            .is_empty());
        assert!(service.active(owner.id).await.expect("active").is_empty());

        let active_page = service
            .list(owner.id, Pagination::default(), true)
            .await
            .expect("list active");
        assert_eq!(active_page.total, 0);
        let all = service
            .list(owner.id, Pagination::default(), false)
            .await
            .expect("list all");
        assert_eq!(all.total, 1);
    }

    #[tokio::test]
    async fn test_default_refill_reminder_days() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = MedicationService::new(db);

        let input: NewMedication =
            serde_json::from_str(r#"{"medicine_name": "Metformin"}"#).expect("input");
        let med = service.create(owner.id, input).await.expect("create");
        assert_eq!(med.refill_reminder_days, 7);
        assert!(med.is_active);

        service.delete(owner.id, med.id).await.expect("delete");
        assert!(matches!(
            service.get(owner.id, med.id).await,
            Err(RecordError::NotFound("medication"))
        ));
    }
}
