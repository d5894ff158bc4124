//! Clinical document service.
//!
//! Prescriptions, appointments, lab reports and insurance policies share one service since
//! they follow the same owner-scoped contract and are read together by share resolution.

use super::shared::{
    fetch_by_ids, fetch_owned, list_owned, soft_delete, update_owned, Assignments, OwnedRecord,
    Pagination, RecordPatch,
};
use crate::models::{
    Appointment, AppointmentPatch, HealthInsurance, HealthInsurancePatch, LabReport,
    LabReportPatch, NewAppointment, NewHealthInsurance, NewLabReport, NewPrescription, Page,
    Prescription, PrescriptionPatch,
};
use crate::{Database, RecordResult};
use chrono::Utc;
use uuid::Uuid;

impl OwnedRecord for Prescription {
    const TABLE: &'static str = "prescriptions";
    const LABEL: &'static str = "prescription";
    const DEFAULT_ORDER: &'static str = "prescription_date DESC, created_at DESC";
}

impl OwnedRecord for Appointment {
    const TABLE: &'static str = "appointments";
    const LABEL: &'static str = "appointment";
    const DEFAULT_ORDER: &'static str = "appointment_date ASC";
}

impl OwnedRecord for LabReport {
    const TABLE: &'static str = "lab_reports";
    const LABEL: &'static str = "lab report";
    const DEFAULT_ORDER: &'static str = "test_date DESC, created_at DESC";
}

impl OwnedRecord for HealthInsurance {
    const TABLE: &'static str = "health_insurances";
    const LABEL: &'static str = "insurance";
    const DEFAULT_ORDER: &'static str = "created_at DESC";
}

impl RecordPatch for PrescriptionPatch {
    fn apply(self, assignments: &mut Assignments<'_>) {
        assignments
            .set("medicine_name", self.medicine_name.map(String::from))
            .set("dosage", self.dosage)
            .set("instructions", self.instructions)
            .set("prescribing_doctor", self.prescribing_doctor)
            .set("doctor_specialty", self.doctor_specialty)
            .set("hospital", self.hospital)
            .set("prescription_date", self.prescription_date)
            .set("attachment_url", self.attachment_url)
            .set("attachment_type", self.attachment_type)
            .set("is_active", self.is_active);
    }
}

impl RecordPatch for AppointmentPatch {
    fn apply(self, assignments: &mut Assignments<'_>) {
        assignments
            .set("doctor_name", self.doctor_name.map(String::from))
            .set("specialty", self.specialty)
            .set("hospital", self.hospital)
            .set("location", self.location)
            .set("appointment_date", self.appointment_date)
            .set("notes", self.notes)
            .set("is_completed", self.is_completed)
            .set("reminder_sent", self.reminder_sent);
    }
}

impl RecordPatch for LabReportPatch {
    fn apply(self, assignments: &mut Assignments<'_>) {
        assignments
            .set("test_type", self.test_type.map(String::from))
            .set("lab_name", self.lab_name)
            .set("test_date", self.test_date)
            .set("report_url", self.report_url.map(String::from))
            .set("report_type", self.report_type)
            .set("notes", self.notes);
    }
}

impl RecordPatch for HealthInsurancePatch {
    fn apply(self, assignments: &mut Assignments<'_>) {
        assignments
            .set("insurance_provider", self.insurance_provider.map(String::from))
            .set("policy_number", self.policy_number.map(String::from))
            .set("group_number", self.group_number)
            .set("member_id", self.member_id)
            .set("effective_date", self.effective_date)
            .set("expiration_date", self.expiration_date)
            .set("notes", self.notes);
    }
}

/// Owner-scoped CRUD over clinical documents.
#[derive(Clone, Debug)]
pub struct RecordService {
    db: Database,
}

impl RecordService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // Prescriptions

    pub async fn create_prescription(
        &self,
        user_id: Uuid,
        input: NewPrescription,
    ) -> RecordResult<Prescription> {
        let now = Utc::now();
        let record = Prescription {
            id: Uuid::new_v4(),
            user_id,
            medicine_name: input.medicine_name.into_inner(),
            dosage: input.dosage,
            instructions: input.instructions,
            prescribing_doctor: input.prescribing_doctor,
            doctor_specialty: input.doctor_specialty,
            hospital: input.hospital,
            prescription_date: input.prescription_date,
            attachment_url: input.attachment_url,
            attachment_type: input.attachment_type,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO prescriptions (id, user_id, medicine_name, dosage, instructions, \
             prescribing_doctor, doctor_specialty, hospital, prescription_date, attachment_url, \
             attachment_type, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.medicine_name)
        .bind(&record.dosage)
        .bind(&record.instructions)
        .bind(&record.prescribing_doctor)
        .bind(&record.doctor_specialty)
        .bind(&record.hospital)
        .bind(record.prescription_date)
        .bind(&record.attachment_url)
        .bind(&record.attachment_type)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(record)
    }

    pub async fn list_prescriptions(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> RecordResult<Page<Prescription>> {
        list_owned(&self.db, user_id, page, Prescription::DEFAULT_ORDER, |_| {}).await
    }

    pub async fn get_prescription(&self, user_id: Uuid, id: Uuid) -> RecordResult<Prescription> {
        fetch_owned(&self.db, user_id, id).await
    }

    pub async fn update_prescription(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: PrescriptionPatch,
    ) -> RecordResult<Prescription> {
        update_owned(&self.db, user_id, id, patch).await
    }

    pub async fn delete_prescription(&self, user_id: Uuid, id: Uuid) -> RecordResult<()> {
        soft_delete::<Prescription>(&self.db, user_id, id).await
    }

    // Appointments

    pub async fn create_appointment(
        &self,
        user_id: Uuid,
        input: NewAppointment,
    ) -> RecordResult<Appointment> {
        let now = Utc::now();
        let record = Appointment {
            id: Uuid::new_v4(),
            user_id,
            doctor_name: input.doctor_name.into_inner(),
            specialty: input.specialty,
            hospital: input.hospital,
            location: input.location,
            appointment_date: input.appointment_date,
            notes: input.notes,
            is_completed: input.is_completed,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO appointments (id, user_id, doctor_name, specialty, hospital, location, \
             appointment_date, notes, is_completed, reminder_sent, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.doctor_name)
        .bind(&record.specialty)
        .bind(&record.hospital)
        .bind(&record.location)
        .bind(record.appointment_date)
        .bind(&record.notes)
        .bind(record.is_completed)
        .bind(record.reminder_sent)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(record)
    }

    /// List appointments, soonest first.
    ///
    /// With `upcoming_only`, only appointments at or after now that are not completed.
    pub async fn list_appointments(
        &self,
        user_id: Uuid,
        page: Pagination,
        upcoming_only: bool,
    ) -> RecordResult<Page<Appointment>> {
        let now = Utc::now();
        list_owned(
            &self.db,
            user_id,
            page,
            Appointment::DEFAULT_ORDER,
            |query| {
                if upcoming_only {
                    query
                        .push(" AND is_completed = 0 AND appointment_date >= ")
                        .push_bind(now);
                }
            },
        )
        .await
    }

    pub async fn get_appointment(&self, user_id: Uuid, id: Uuid) -> RecordResult<Appointment> {
        fetch_owned(&self.db, user_id, id).await
    }

    pub async fn update_appointment(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> RecordResult<Appointment> {
        update_owned(&self.db, user_id, id, patch).await
    }

    pub async fn delete_appointment(&self, user_id: Uuid, id: Uuid) -> RecordResult<()> {
        soft_delete::<Appointment>(&self.db, user_id, id).await
    }

    // Lab reports

    pub async fn create_lab_report(
        &self,
        user_id: Uuid,
        input: NewLabReport,
    ) -> RecordResult<LabReport> {
        let now = Utc::now();
        let record = LabReport {
            id: Uuid::new_v4(),
            user_id,
            test_type: input.test_type.into_inner(),
            lab_name: input.lab_name,
            test_date: input.test_date,
            report_url: input.report_url.into_inner(),
            report_type: input.report_type,
            notes: input.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO lab_reports (id, user_id, test_type, lab_name, test_date, report_url, \
             report_type, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.test_type)
        .bind(&record.lab_name)
        .bind(record.test_date)
        .bind(&record.report_url)
        .bind(&record.report_type)
        .bind(&record.notes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(record)
    }

    pub async fn list_lab_reports(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> RecordResult<Page<LabReport>> {
        list_owned(&self.db, user_id, page, LabReport::DEFAULT_ORDER, |_| {}).await
    }

    pub async fn get_lab_report(&self, user_id: Uuid, id: Uuid) -> RecordResult<LabReport> {
        fetch_owned(&self.db, user_id, id).await
    }

    pub async fn update_lab_report(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: LabReportPatch,
    ) -> RecordResult<LabReport> {
        update_owned(&self.db, user_id, id, patch).await
    }

    pub async fn delete_lab_report(&self, user_id: Uuid, id: Uuid) -> RecordResult<()> {
        soft_delete::<LabReport>(&self.db, user_id, id).await
    }

    // Insurance

    pub async fn create_insurance(
        &self,
        user_id: Uuid,
        input: NewHealthInsurance,
    ) -> RecordResult<HealthInsurance> {
        let now = Utc::now();
        let record = HealthInsurance {
            id: Uuid::new_v4(),
            user_id,
            insurance_provider: input.insurance_provider.into_inner(),
            policy_number: input.policy_number.into_inner(),
            group_number: input.group_number,
            member_id: input.member_id,
            effective_date: input.effective_date,
            expiration_date: input.expiration_date,
            notes: input.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO health_insurances (id, user_id, insurance_provider, policy_number, \
             group_number, member_id, effective_date, expiration_date, notes, created_at, \
             updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.insurance_provider)
        .bind(&record.policy_number)
        .bind(&record.group_number)
        .bind(&record.member_id)
        .bind(record.effective_date)
        .bind(record.expiration_date)
        .bind(&record.notes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(record)
    }

    pub async fn list_insurance(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> RecordResult<Page<HealthInsurance>> {
        list_owned(&self.db, user_id, page, HealthInsurance::DEFAULT_ORDER, |_| {}).await
    }

    pub async fn get_insurance(&self, user_id: Uuid, id: Uuid) -> RecordResult<HealthInsurance> {
        fetch_owned(&self.db, user_id, id).await
    }

    pub async fn update_insurance(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: HealthInsurancePatch,
    ) -> RecordResult<HealthInsurance> {
        update_owned(&self.db, user_id, id, patch).await
    }

    pub async fn delete_insurance(&self, user_id: Uuid, id: Uuid) -> RecordResult<()> {
        soft_delete::<HealthInsurance>(&self.db, user_id, id).await
    }

    // Lookups by id without an owner filter, used by share resolution.

    pub(crate) async fn prescriptions_by_ids(&self, ids: &[Uuid]) -> RecordResult<Vec<Prescription>> {
        fetch_by_ids(&self.db, ids).await
    }

    pub(crate) async fn appointments_by_ids(&self, ids: &[Uuid]) -> RecordResult<Vec<Appointment>> {
        fetch_by_ids(&self.db, ids).await
    }

    pub(crate) async fn lab_reports_by_ids(&self, ids: &[Uuid]) -> RecordResult<Vec<LabReport>> {
        fetch_by_ids(&self.db, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support;
    use crate::RecordError;
    use chrono::{Duration, NaiveDate};

    fn prescription(name: &str, date: &str) -> NewPrescription {
        serde_json::from_value(serde_json::json!({
            "medicine_name": name,
            "dosage": "500mg",
            "prescription_date": date,
        }))
        .expect("valid prescription input")
    }

    fn appointment(doctor: &str, at: chrono::DateTime<Utc>, completed: bool) -> NewAppointment {
        serde_json::from_value(serde_json::json!({
            "doctor_name": doctor,
            "appointment_date": at.to_rfc3339(),
            "is_completed": completed,
        }))
        .expect("valid appointment input")
    }

    #[tokio::test]
    async fn test_prescription_crud() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = RecordService::new(db);

        let created = service
            .create_prescription(owner.id, prescription("Amoxicillin", "2024-02-01"))
            .await
            .expect("create");
        assert!(created.is_active);

        let fetched = service
            .get_prescription(owner.id, created.id)
            .await
            .expect("get");
        assert_eq!(fetched.medicine_name, "Amoxicillin");
        assert_eq!(
            fetched.prescription_date,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );

        let patch: PrescriptionPatch =
            serde_json::from_str(r#"{"dosage": "250mg", "is_active": false}"#).expect("patch");
        let updated = service
            .update_prescription(owner.id, created.id, patch)
            .await
            .expect("update");
        assert_eq!(updated.dosage, "250mg");
        assert!(!updated.is_active);
        assert_eq!(updated.medicine_name, "Amoxicillin");
        assert!(updated.updated_at >= created.updated_at);

        service
            .delete_prescription(owner.id, created.id)
            .await
            .expect("delete");
        let err = service
            .get_prescription(owner.id, created.id)
            .await
            .expect_err("deleted rows are invisible");
        assert!(matches!(err, RecordError::NotFound("prescription")));

        let err = service
            .delete_prescription(owner.id, created.id)
            .await
            .expect_err("second delete finds nothing");
        assert!(matches!(err, RecordError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_records_are_owner_scoped() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let other = test_support::user(&db, "other@example.com").await;
        let service = RecordService::new(db);

        let created = service
            .create_prescription(owner.id, prescription("Ibuprofen", "2024-01-10"))
            .await
            .expect("create");

        assert!(matches!(
            service.get_prescription(other.id, created.id).await,
            Err(RecordError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update_prescription(other.id, created.id, PrescriptionPatch::default())
                .await,
            Err(RecordError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_prescription(other.id, created.id).await,
            Err(RecordError::NotFound(_))
        ));

        let page = service
            .list_prescriptions(other.id, Pagination::default())
            .await
            .expect("list");
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_prescriptions_list_newest_first_with_paging() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = RecordService::new(db);

        for (name, date) in [("A", "2024-01-01"), ("B", "2024-03-01"), ("C", "2024-02-01")] {
            service
                .create_prescription(owner.id, prescription(name, date))
                .await
                .expect("create");
        }

        let page = service
            .list_prescriptions(owner.id, Pagination::new(Some(2), Some(0)))
            .await
            .expect("first page");
        assert_eq!(page.total, 3);
        assert_eq!(page.limit, 2);
        let names: Vec<_> = page.data.iter().map(|p| p.medicine_name.as_str()).collect();
        assert_eq!(names, ["B", "C"]);

        let page = service
            .list_prescriptions(owner.id, Pagination::new(Some(2), Some(2)))
            .await
            .expect("second page");
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].medicine_name, "A");
    }

    #[tokio::test]
    async fn test_upcoming_appointments_filter() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = RecordService::new(db);
        let now = Utc::now();

        for (doctor, at, completed) in [
            ("Past", now - Duration::days(2), false),
            ("Later", now + Duration::days(10), false),
            ("Soon", now + Duration::days(1), false),
            ("Done", now + Duration::days(3), true),
        ] {
            service
                .create_appointment(owner.id, appointment(doctor, at, completed))
                .await
                .expect("create");
        }

        let upcoming = service
            .list_appointments(owner.id, Pagination::default(), true)
            .await
            .expect("upcoming");
        assert_eq!(upcoming.total, 2);
        let doctors: Vec<_> = upcoming.data.iter().map(|a| a.doctor_name.as_str()).collect();
        assert_eq!(doctors, ["Soon", "Later"]);

        let all = service
            .list_appointments(owner.id, Pagination::default(), false)
            .await
            .expect("all");
        assert_eq!(all.total, 4);
        assert_eq!(all.data[0].doctor_name, "Past");
    }

    #[tokio::test]
    async fn test_lab_report_and_insurance_round_trip() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = RecordService::new(db);

        let report: NewLabReport = serde_json::from_value(serde_json::json!({
            "test_type": "Lipid panel",
            "test_date": "2024-04-02",
            "report_url": "https://files.example.com/lipids.pdf",
        }))
        .expect("lab report input");
        let report = service
            .create_lab_report(owner.id, report)
            .await
            .expect("create report");
        let patch: LabReportPatch =
            serde_json::from_str(r#"{"notes": "fasting"}"#).expect("patch");
        let report = service
            .update_lab_report(owner.id, report.id, patch)
            .await
            .expect("update report");
        assert_eq!(report.notes, "fasting");

        let policy: NewHealthInsurance = serde_json::from_value(serde_json::json!({
            "insurance_provider": "Acme Health",
            "policy_number": "P-1234",
            "expiration_date": "2026-12-31",
        }))
        .expect("insurance input");
        let policy = service
            .create_insurance(owner.id, policy)
            .await
            .expect("create insurance");
        assert_eq!(policy.effective_date, None);

        let page = service
            .list_insurance(owner.id, Pagination::default())
            .await
            .expect("list insurance");
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].policy_number, "P-1234");
    }

    #[tokio::test]
    async fn test_by_ids_lookup_skips_deleted_rows() {
        let db = test_support::database().await;
        let owner = test_support::user(&db, "owner@example.com").await;
        let service = RecordService::new(db);

        let kept = service
            .create_prescription(owner.id, prescription("Kept", "2024-01-01"))
            .await
            .expect("create");
        let gone = service
            .create_prescription(owner.id, prescription("Gone", "2024-01-02"))
            .await
            .expect("create");
        service
            .delete_prescription(owner.id, gone.id)
            .await
            .expect("delete");

        let found = service
            .prescriptions_by_ids(&[kept.id, gone.id, Uuid::new_v4()])
            .await
            .expect("lookup");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, kept.id);

        assert!(service
            .prescriptions_by_ids(&[])
            .await
            .expect("empty lookup")
            .is_empty());
    }
}
