//! CRUD handlers for prescriptions, appointments, lab reports and insurance policies.
//!
//! Every route acts on the caller's own records. A record owned by someone else, or one that
//! has been deleted, is reported as not found.

use super::{PageParams, UpcomingPageParams};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::AppState;
use api_shared::dto::{ErrorRes, MessageRes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use medvault_core::models::{
    Appointment, AppointmentPage, AppointmentPatch, HealthInsurance, HealthInsurancePage,
    HealthInsurancePatch, LabReport, LabReportPage, LabReportPatch, NewAppointment,
    NewHealthInsurance, NewLabReport, NewPrescription, Page, Prescription, PrescriptionPage,
    PrescriptionPatch,
};
use uuid::Uuid;

// Prescriptions

#[utoipa::path(
    post,
    path = "/api/v1/prescriptions",
    tag = "prescriptions",
    security(("bearer_auth" = [])),
    request_body = NewPrescription,
    responses(
        (status = 201, description = "Prescription created", body = Prescription),
        (status = 400, description = "Invalid prescription", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewPrescription>,
) -> Result<(StatusCode, Json<Prescription>), ApiError> {
    let record = state.records.create_prescription(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    tag = "prescriptions",
    security(("bearer_auth" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "Prescriptions, newest first", body = PrescriptionPage)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<Prescription>>, ApiError> {
    let page = state
        .records
        .list_prescriptions(user.id(), params.pagination())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{id}",
    tag = "prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Prescription", body = Prescription),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Prescription>, ApiError> {
    Ok(Json(state.records.get_prescription(user.id(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/prescriptions/{id}",
    tag = "prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Prescription id")),
    request_body = PrescriptionPatch,
    responses(
        (status = 200, description = "Updated prescription", body = Prescription),
        (status = 400, description = "Invalid patch", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<PrescriptionPatch>,
) -> Result<Json<Prescription>, ApiError> {
    let record = state
        .records
        .update_prescription(user.id(), id, patch)
        .await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v1/prescriptions/{id}",
    tag = "prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Prescription deleted", body = MessageRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    state.records.delete_prescription(user.id(), id).await?;
    Ok(Json(MessageRes::new("Prescription deleted successfully")))
}

// Appointments

#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = NewAppointment,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid appointment", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let record = state.records.create_appointment(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(UpcomingPageParams),
    responses(
        (status = 200, description = "Appointments, earliest first", body = AppointmentPage)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<UpcomingPageParams>,
) -> Result<Json<Page<Appointment>>, ApiError> {
    let page = state
        .records
        .list_appointments(user.id(), params.pagination(), params.upcoming)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(state.records.get_appointment(user.id(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = AppointmentPatch,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Invalid patch", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AppointmentPatch>,
) -> Result<Json<Appointment>, ApiError> {
    let record = state
        .records
        .update_appointment(user.id(), id, patch)
        .await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment deleted", body = MessageRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    state.records.delete_appointment(user.id(), id).await?;
    Ok(Json(MessageRes::new("Appointment deleted successfully")))
}

// Lab reports

#[utoipa::path(
    post,
    path = "/api/v1/lab-reports",
    tag = "lab-reports",
    security(("bearer_auth" = [])),
    request_body = NewLabReport,
    responses(
        (status = 201, description = "Lab report created", body = LabReport),
        (status = 400, description = "Invalid lab report", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_lab_report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewLabReport>,
) -> Result<(StatusCode, Json<LabReport>), ApiError> {
    let record = state.records.create_lab_report(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lab-reports",
    tag = "lab-reports",
    security(("bearer_auth" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "Lab reports, most recent test first", body = LabReportPage)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_lab_reports(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<LabReport>>, ApiError> {
    let page = state
        .records
        .list_lab_reports(user.id(), params.pagination())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/lab-reports/{id}",
    tag = "lab-reports",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lab report id")),
    responses(
        (status = 200, description = "Lab report", body = LabReport),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_lab_report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LabReport>, ApiError> {
    Ok(Json(state.records.get_lab_report(user.id(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/lab-reports/{id}",
    tag = "lab-reports",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lab report id")),
    request_body = LabReportPatch,
    responses(
        (status = 200, description = "Updated lab report", body = LabReport),
        (status = 400, description = "Invalid patch", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_lab_report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<LabReportPatch>,
) -> Result<Json<LabReport>, ApiError> {
    let record = state
        .records
        .update_lab_report(user.id(), id, patch)
        .await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lab-reports/{id}",
    tag = "lab-reports",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lab report id")),
    responses(
        (status = 200, description = "Lab report deleted", body = MessageRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_lab_report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    state.records.delete_lab_report(user.id(), id).await?;
    Ok(Json(MessageRes::new("Lab report deleted successfully")))
}

// Insurance

#[utoipa::path(
    post,
    path = "/api/v1/insurance",
    tag = "insurance",
    security(("bearer_auth" = [])),
    request_body = NewHealthInsurance,
    responses(
        (status = 201, description = "Insurance policy created", body = HealthInsurance),
        (status = 400, description = "Invalid insurance policy", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_insurance(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewHealthInsurance>,
) -> Result<(StatusCode, Json<HealthInsurance>), ApiError> {
    let record = state.records.create_insurance(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/insurance",
    tag = "insurance",
    security(("bearer_auth" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "Insurance policies, newest first", body = HealthInsurancePage)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_insurance(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<HealthInsurance>>, ApiError> {
    let page = state
        .records
        .list_insurance(user.id(), params.pagination())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/insurance/{id}",
    tag = "insurance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Insurance policy id")),
    responses(
        (status = 200, description = "Insurance policy", body = HealthInsurance),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_insurance(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<HealthInsurance>, ApiError> {
    Ok(Json(state.records.get_insurance(user.id(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/insurance/{id}",
    tag = "insurance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Insurance policy id")),
    request_body = HealthInsurancePatch,
    responses(
        (status = 200, description = "Updated insurance policy", body = HealthInsurance),
        (status = 400, description = "Invalid patch", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_insurance(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<HealthInsurancePatch>,
) -> Result<Json<HealthInsurance>, ApiError> {
    let record = state.records.update_insurance(user.id(), id, patch).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v1/insurance/{id}",
    tag = "insurance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Insurance policy id")),
    responses(
        (status = 200, description = "Insurance policy deleted", body = MessageRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_insurance(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    state.records.delete_insurance(user.id(), id).await?;
    Ok(Json(MessageRes::new("Insurance policy deleted successfully")))
}
