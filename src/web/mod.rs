//! Web surface: public intake API, admin console and signed downloads.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::{AppState, Stores};
pub use router::{create_router, ApiDoc};
pub use server::WebServer;
