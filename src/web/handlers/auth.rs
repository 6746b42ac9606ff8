//! Admin authentication handlers.

use std::sync::Arc;

use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::SessionError;
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, ValidatedJson};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::middleware::{removal_cookie, session_cookie, session_token, LOGIN_PAGE};

use super::AppState;

/// POST /api/admin/login - Operator login.
///
/// On success the session token is set as an HttpOnly cookie.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, wrapped in `data`; session cookie set", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 429, description = "Too many attempts", body = ErrorBody),
        (status = 500, description = "Session could not be stored", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let issued = state
        .sessions
        .login(&req.email, &req.password)
        .await
        .map_err(|e| match e {
            SessionError::InvalidCredentials => {
                ApiError::unauthorized(state.i18n.t("error.invalid_credentials"))
            }
            SessionError::Storage(msg) => {
                tracing::error!("Failed to open session: {}", msg);
                ApiError::internal(state.i18n.t("error.session_failed"))
            }
        })?;

    let jar = jar.add(session_cookie(&state.config.session, issued.token));
    Ok((jar, Json(ApiResponse::new(LoginResponse { ok: true }))))
}

/// POST /api/admin/logout - End the current session.
///
/// Always succeeds and redirects to the login page.
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    tag = "admin",
    responses(
        (status = 303, description = "Session cleared, redirect to the login page")
    )
)]
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(token) = session_token(&jar, &state.config.session) {
        if let Err(e) = state.sessions.revoke(&token).await {
            tracing::warn!("Failed to revoke session: {}", e);
        }
    }

    let jar = jar.remove(removal_cookie(&state.config.session));
    (jar, Redirect::to(LOGIN_PAGE))
}
