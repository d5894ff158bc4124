//! Reminders.

use super::shared::{
    fetch_owned, list_owned, select_owned, soft_delete, update_owned, Assignments, OwnedRecord,
    Pagination, RecordPatch,
};
use crate::models::{NewReminder, Page, Reminder, ReminderPatch};
use crate::{Database, RecordError, RecordResult};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

impl OwnedRecord for Reminder {
    const TABLE: &'static str = "reminders";
    const LABEL: &'static str = "reminder";
    const DEFAULT_ORDER: &'static str = "reminder_date ASC";
}

impl RecordPatch for ReminderPatch {
    fn apply(self, assignments: &mut Assignments<'_>) {
        assignments
            .set("title", self.title.map(String::from))
            .set("description", self.description)
            .set("reminder_date", self.reminder_date)
            .set("reminder_type", self.reminder_type)
            .set("is_completed", self.is_completed)
            .set("is_recurring", self.is_recurring)
            .set("recurrence_interval", self.recurrence_interval);
    }
}

#[derive(Clone, Debug)]
pub struct ReminderService {
    db: Database,
}

impl ReminderService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, input: NewReminder) -> RecordResult<Reminder> {
        let now = Utc::now();
        let record = Reminder {
            id: Uuid::new_v4(),
            user_id,
            title: input.title.into_inner(),
            description: input.description,
            reminder_date: input.reminder_date,
            reminder_type: input.reminder_type,
            is_completed: false,
            is_recurring: input.is_recurring,
            recurrence_interval: input.recurrence_interval,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO reminders (id, user_id, title, description, reminder_date, \
             reminder_type, is_completed, is_recurring, recurrence_interval, created_at, \
             updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.reminder_date)
        .bind(&record.reminder_type)
        .bind(record.is_completed)
        .bind(record.is_recurring)
        .bind(&record.recurrence_interval)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(record)
    }

    /// List reminders, earliest first. With `upcoming_only`, pending reminders from now on.
    pub async fn list(
        &self,
        user_id: Uuid,
        page: Pagination,
        upcoming_only: bool,
    ) -> RecordResult<Page<Reminder>> {
        let now = Utc::now();
        list_owned(&self.db, user_id, page, Reminder::DEFAULT_ORDER, |query| {
            if upcoming_only {
                query
                    .push(" AND is_completed = 0 AND reminder_date >= ")
                    .push_bind(now);
            }
        })
        .await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> RecordResult<Reminder> {
        fetch_owned(&self.db, user_id, id).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: ReminderPatch,
    ) -> RecordResult<Reminder> {
        update_owned(&self.db, user_id, id, patch).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> RecordResult<()> {
        soft_delete::<Reminder>(&self.db, user_id, id).await
    }

    /// Pending reminders falling between now and `days` days ahead.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] if `days` is negative or out of range.
    pub async fn upcoming(&self, user_id: Uuid, days: i64) -> RecordResult<Vec<Reminder>> {
        self.upcoming_from(user_id, Utc::now(), days).await
    }

    pub(crate) async fn upcoming_from(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        days: i64,
    ) -> RecordResult<Vec<Reminder>> {
        if days < 0 {
            return Err(RecordError::InvalidInput("days cannot be negative".into()));
        }
        let cutoff = Duration::try_days(days)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| RecordError::InvalidInput("days is too large".into()))?;
        select_owned(&self.db, user_id, Reminder::DEFAULT_ORDER, |query| {
            query
                .push(" AND is_completed = 0 AND reminder_date >= ")
                .push_bind(now)
                .push(" AND reminder_date <= ")
                .push_bind(cutoff);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support;

    fn reminder(title: &str, at: DateTime<Utc>) -> NewReminder {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "reminder_date": at.to_rfc3339(),
            "reminder_type": "medication",
        }))
        .expect("valid reminder input")
    }

    #[tokio::test]
    async fn test_upcoming_window() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = ReminderService::new(db);
        let now = Utc::now();

        for (title, offset) in [("past", -1), ("week", 7), ("month", 29), ("later", 45)] {
            service
                .create(owner.id, reminder(title, now + Duration::days(offset)))
                .await
                .expect("create");
        }
        let done = service
            .create(owner.id, reminder("done", now + Duration::days(2)))
            .await
            .expect("create");
        let patch: ReminderPatch =
            serde_json::from_str(r#"{"is_completed": true}"#).expect("patch");
        service
            .update(owner.id, done.id, patch)
            .await
            .expect("complete");

        let due = service
            .upcoming_from(owner.id, now, 30)
            .await
            .expect("upcoming");
        let titles: Vec<_> = due.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["week", "month"]);

        let err = service
            .upcoming(owner.id, -1)
            .await
            .expect_err("negative window");
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_list_upcoming_flag() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = ReminderService::new(db);
        let now = Utc::now();

        service
            .create(owner.id, reminder("yesterday", now - Duration::days(1)))
            .await
            .expect("create");
        service
            .create(owner.id, reminder("tomorrow", now + Duration::days(1)))
            .await
            .expect("create");

        let upcoming = service
            .list(owner.id, Pagination::default(), true)
            .await
            .expect("list upcoming");
        assert_eq!(upcoming.total, 1);
        assert_eq!(upcoming.data[0].title, "tomorrow");

        let all = service
            .list(owner.id, Pagination::default(), false)
            .await
            .expect("list all");
        assert_eq!(all.total, 2);
        assert_eq!(all.data[0].title, "yesterday");
    }
}
