//! Share link issuance, public resolution and owner management.

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser, ClientVisitor};
use crate::AppState;
use api_shared::dto::{
    CreateShareReq, CreateShareRes, ErrorRes, MessageRes, MySharesRes, SharedAccessRes,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use medvault_core::models::AccessAction;
use medvault_core::{OpenedShare, SHARE_URL_PREFIX};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/sharing/create",
    tag = "sharing",
    security(("bearer_auth" = [])),
    request_body = CreateShareReq,
    responses(
        (status = 201, description = "Share link issued", body = CreateShareRes),
        (status = 400, description = "Invalid share request", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_share(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateShareReq>,
) -> Result<(StatusCode, Json<CreateShareRes>), ApiError> {
    let shared_record = state.sharing.issue(req.into_issue(user.id())).await?;
    let share_url = format!("{SHARE_URL_PREFIX}{}", shared_record.share_token);

    Ok((
        StatusCode::CREATED,
        Json(CreateShareRes {
            shared_record,
            share_url,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/share/{token}",
    tag = "sharing",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Shared records", body = SharedAccessRes),
        (status = 404, description = "Unknown or revoked link", body = ErrorRes),
        (status = 410, description = "Link expired or access limit reached", body = ErrorRes)
    )
)]
/// Resolve a share link without authentication and record the view.
#[axum::debug_handler(state = AppState)]
pub async fn view_shared(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    ClientVisitor(visitor): ClientVisitor,
) -> Result<Json<SharedAccessRes>, ApiError> {
    let opened = state
        .sharing
        .open(&token, &visitor, AccessAction::Viewed)
        .await?;
    Ok(Json(access_res(opened)))
}

#[utoipa::path(
    get,
    path = "/api/v1/share/{token}/download",
    tag = "sharing",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Shared records", body = SharedAccessRes),
        (status = 403, description = "Downloads not allowed for this link", body = ErrorRes),
        (status = 404, description = "Unknown or revoked link", body = ErrorRes),
        (status = 410, description = "Link expired or access limit reached", body = ErrorRes)
    )
)]
/// Same payload as a view, only for links issued with `allow_download`.
#[axum::debug_handler(state = AppState)]
pub async fn download_shared(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    ClientVisitor(visitor): ClientVisitor,
) -> Result<Json<SharedAccessRes>, ApiError> {
    let opened = state
        .sharing
        .open(&token, &visitor, AccessAction::Downloaded)
        .await?;
    Ok(Json(access_res(opened)))
}

fn access_res(opened: OpenedShare) -> SharedAccessRes {
    let allow_download = opened.shared_record.allow_download;
    SharedAccessRes {
        shared_record: opened.shared_record,
        records: opened.records,
        allow_download,
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/sharing/my-shares",
    tag = "sharing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's share links with access logs", body = MySharesRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn my_shares(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MySharesRes>, ApiError> {
    let data = state.sharing.list_for_owner(user.id()).await?;
    Ok(Json(MySharesRes { data }))
}

#[utoipa::path(
    post,
    path = "/api/v1/sharing/{id}/revoke",
    tag = "sharing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Share link id")),
    responses(
        (status = 200, description = "Revocation processed", body = MessageRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Deactivate one of the caller's links.
///
/// Answers success even when nothing matched, so an unknown id and someone else's link look
/// the same.
#[axum::debug_handler(state = AppState)]
pub async fn revoke_share(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    let changed = state.sharing.revoke(user.id(), id).await?;
    if changed == 0 {
        tracing::debug!("revoke of share {} by {} matched no link", id, user.id());
    }
    Ok(Json(MessageRes::new("Share link revoked successfully")))
}
