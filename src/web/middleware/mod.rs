//! Middleware for the web surface.

pub mod cors;
pub mod rate_limit;
pub mod security;
pub mod session;

pub use cors::create_cors_layer;
pub use rate_limit::{login_rate_limit, LoginRateLimiter};
pub use security::{no_store_private, security_header_layers};
pub use session::{
    removal_cookie, session_cookie, session_token, CurrentOperator, PageOperator, LOGIN_PAGE,
    REVIEW_PAGE,
};
