use super::{DaysParams, UpcomingPageParams};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::AppState;
use api_shared::dto::{ErrorRes, MessageRes, ReminderListRes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use medvault_core::models::{NewReminder, Page, Reminder, ReminderPage, ReminderPatch};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/reminders",
    tag = "reminders",
    security(("bearer_auth" = [])),
    request_body = NewReminder,
    responses(
        (status = 201, description = "Reminder created", body = Reminder),
        (status = 400, description = "Invalid reminder", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let record = state.reminders.create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reminders",
    tag = "reminders",
    security(("bearer_auth" = [])),
    params(UpcomingPageParams),
    responses(
        (status = 200, description = "Reminders, earliest first", body = ReminderPage)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_reminders(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<UpcomingPageParams>,
) -> Result<Json<Page<Reminder>>, ApiError> {
    let page = state
        .reminders
        .list(user.id(), params.pagination(), params.upcoming)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/reminders/upcoming",
    tag = "reminders",
    security(("bearer_auth" = [])),
    params(DaysParams),
    responses(
        (status = 200, description = "Pending reminders within the look-ahead", body = ReminderListRes),
        (status = 400, description = "Invalid look-ahead", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn upcoming_reminders(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<DaysParams>,
) -> Result<Json<ReminderListRes>, ApiError> {
    let data = state.reminders.upcoming(user.id(), params.days).await?;
    Ok(Json(ReminderListRes { data }))
}

#[utoipa::path(
    get,
    path = "/api/v1/reminders/{id}",
    tag = "reminders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reminder id")),
    responses(
        (status = 200, description = "Reminder", body = Reminder),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Reminder>, ApiError> {
    Ok(Json(state.reminders.get(user.id(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/reminders/{id}",
    tag = "reminders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reminder id")),
    request_body = ReminderPatch,
    responses(
        (status = 200, description = "Updated reminder", body = Reminder),
        (status = 400, description = "Invalid patch", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ReminderPatch>,
) -> Result<Json<Reminder>, ApiError> {
    Ok(Json(state.reminders.update(user.id(), id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reminders/{id}",
    tag = "reminders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reminder id")),
    responses(
        (status = 200, description = "Reminder deleted", body = MessageRes),
        (status = 404, description = "Not found", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    state.reminders.delete(user.id(), id).await?;
    Ok(Json(MessageRes::new("Reminder deleted successfully")))
}
