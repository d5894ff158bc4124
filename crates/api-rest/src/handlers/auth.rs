use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser};
use crate::AppState;
use api_shared::dto::{AuthRes, ErrorRes, LoginReq, ProfileRes, RegisterReq, UserSummary};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use medvault_core::{EmailAddress, RecordError};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = AuthRes),
        (status = 400, description = "Invalid registration details", body = ErrorRes),
        (status = 409, description = "Email already registered", body = ErrorRes)
    )
)]
/// Register a new patient account and return an identity token.
#[axum::debug_handler(state = AppState)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterReq>,
) -> Result<(StatusCode, Json<AuthRes>), ApiError> {
    let new_user = req.into_new_user()?;
    let user = state.users.register(new_user).await?;
    let token = state.tokens.issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthRes {
            message: "User registered successfully".into(),
            user: UserSummary::from(&user),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = AuthRes),
        (status = 401, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Exchange an email and password for an identity token.
///
/// An unparseable email is reported exactly like a wrong password.
#[axum::debug_handler(state = AppState)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginReq>,
) -> Result<Json<AuthRes>, ApiError> {
    let email = EmailAddress::parse(&req.email).map_err(|_| RecordError::InvalidCredentials)?;
    let user = state.users.login(&email, &req.password).await?;
    let token = state.tokens.issue(&user)?;

    Ok(Json(AuthRes {
        message: "Login successful".into(),
        user: UserSummary::from(&user),
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ProfileRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes),
        (status = 404, description = "User no longer exists", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileRes>, ApiError> {
    let user = state.users.get(user.id()).await?;
    Ok(Json(ProfileRes { user }))
}
