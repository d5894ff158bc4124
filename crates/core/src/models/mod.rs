//! Persistent record types and their input shapes.
//!
//! Each stored entity has three forms:
//! - the row itself (`Prescription`, `Medication`, ...), serialised to clients;
//! - a `New*` struct accepted on create, with required fields validated on deserialisation;
//! - a `*Patch` struct accepted on update, listing only mutable fields and rejecting anything
//!   else.

mod medication;
mod records;
mod reminder;
mod sharing;
mod user;

pub use medication::{Medication, MedicationPatch, NewMedication};
pub use records::{
    Appointment, AppointmentPatch, HealthInsurance, HealthInsurancePatch, LabReport,
    LabReportPatch, NewAppointment, NewHealthInsurance, NewLabReport, NewPrescription,
    Prescription, PrescriptionPatch,
};
pub use reminder::{NewReminder, Reminder, ReminderPatch};
pub use sharing::{
    AccessAction, AuditLog, RecordBundle, ShareLinkSummary, ShareMethod, ShareScope,
    SharedRecord, SharedRecords,
};
pub use user::{NewUser, User, UserRole};

use serde::Serialize;

/// One page of an owner-scoped listing.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(
    feature = "openapi",
    derive(utoipa::ToSchema),
    aliases(
        PrescriptionPage = Page<Prescription>,
        AppointmentPage = Page<Appointment>,
        LabReportPage = Page<LabReport>,
        HealthInsurancePage = Page<HealthInsurance>,
        MedicationPage = Page<Medication>,
        ReminderPage = Page<Reminder>
    )
)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

pub(crate) fn default_true() -> bool {
    true
}
