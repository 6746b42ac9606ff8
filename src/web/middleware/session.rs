//! Admin session cookie handling and extractors.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::AuthenticatedOperator;
use crate::config::SessionConfig;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Login page path, the target of unauthenticated page requests.
pub const LOGIN_PAGE: &str = "/admin/login";

/// Review page path.
pub const REVIEW_PAGE: &str = "/admin";

/// Build the session cookie: HttpOnly, SameSite=Lax, Path=/, Max-Age = TTL.
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    let max_age = i64::try_from(config.ttl_secs).unwrap_or(i64::MAX);
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Cookie shape to hand to `CookieJar::remove`.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build()
}

/// Session token carried by the request, if any.
pub fn session_token(jar: &CookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

async fn resolve(parts: &Parts, state: &AppState) -> Option<AuthenticatedOperator> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = session_token(&jar, &state.config.session)?;
    state.sessions.resolve(&token).await
}

/// Operator behind the session cookie, for JSON endpoints.
///
/// Rejects with a `401` API error.
#[derive(Debug, Clone)]
pub struct CurrentOperator(pub AuthenticatedOperator);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentOperator {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await
            .map(CurrentOperator)
            .ok_or_else(|| ApiError::unauthorized(state.i18n.t("error.unauthorized")))
    }
}

/// Operator behind the session cookie, for HTML pages.
///
/// Rejects with a `303` redirect to the login page.
#[derive(Debug, Clone)]
pub struct PageOperator(pub AuthenticatedOperator);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for PageOperator {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await
            .map(PageOperator)
            .ok_or_else(|| Redirect::to(LOGIN_PAGE))
    }
}
