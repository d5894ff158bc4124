use super::ActivePageParams;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::AppState;
use api_shared::dto::{ErrorRes, MedicationListRes, MessageRes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use medvault_core::models::{Medication, MedicationPage, MedicationPatch, NewMedication, Page};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/medications",
    tag = "medications",
    security(("bearer_auth" = [])),
    request_body = NewMedication,
    responses(
        (status = 201, description = "Medication created", body = Medication),
        (status = 400, description = "Invalid medication", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_medication(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewMedication>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    let record = state.medications.create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/medications",
    tag = "medications",
    security(("bearer_auth" = [])),
    params(ActivePageParams),
    responses(
        (status = 200, description = "Medications, newest first", body = MedicationPage)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_medications(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<ActivePageParams>,
) -> Result<Json<Page<Medication>>, ApiError> {
    let page = state
        .medications
        .list(user.id(), params.pagination(), params.active)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/medications/refill-needed",
    tag = "medications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active medications due for a refill within seven days", body = MedicationListRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn refill_needed(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MedicationListRes>, ApiError> {
    let data = state.medications.needing_refill(user.id()).await?;
    Ok(Json(MedicationListRes { data }))
}

#[utoipa::path(
    get,
    path = "/api/v1/medications/{id}",
    tag = "medications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Medication id")),
    responses(
        (status = 200, description = "Medication", body = Medication),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_medication(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Medication>, ApiError> {
    Ok(Json(state.medications.get(user.id(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/medications/{id}",
    tag = "medications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Medication id")),
    request_body = MedicationPatch,
    responses(
        (status = 200, description = "Updated medication", body = Medication),
        (status = 400, description = "Invalid patch", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_medication(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<MedicationPatch>,
) -> Result<Json<Medication>, ApiError> {
    Ok(Json(state.medications.update(user.id(), id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/medications/{id}",
    tag = "medications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Medication id")),
    responses(
        (status = 200, description = "Medication deleted", body = MessageRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_medication(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    state.medications.delete(user.id(), id).await?;
    Ok(Json(MessageRes::new("Medication deleted successfully")))
}
