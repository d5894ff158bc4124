use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::AppState;
use api_shared::dto::{DashboardRes, ErrorRes};
use axum::extract::State;
use axum::Json;
use medvault_core::{Pagination, DEFAULT_UPCOMING_REMINDER_DAYS};

const DASHBOARD_SECTION_LEN: i64 = 5;

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Summary of the caller's records", body = DashboardRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Five most recent prescriptions and lab reports, the next five appointments, active
/// medications and reminders due within 30 days.
#[axum::debug_handler(state = AppState)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardRes>, ApiError> {
    let user_id = user.id();
    let first = Pagination::first(DASHBOARD_SECTION_LEN);

    let prescriptions = state.records.list_prescriptions(user_id, first).await?;
    let appointments = state
        .records
        .list_appointments(user_id, first, true)
        .await?;
    let lab_reports = state.records.list_lab_reports(user_id, first).await?;
    let medications = state.medications.active(user_id).await?;
    let reminders = state
        .reminders
        .upcoming(user_id, DEFAULT_UPCOMING_REMINDER_DAYS)
        .await?;

    Ok(Json(DashboardRes {
        prescriptions: prescriptions.data,
        appointments: appointments.data,
        lab_reports: lab_reports.data,
        medications,
        reminders,
    }))
}
