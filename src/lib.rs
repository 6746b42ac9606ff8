//! intake - recruitment intake and review service.
//!
//! A public multipart form records applications and stores the attached
//! documents; staff sign in to an admin console to review them and track
//! their status.

pub mod application;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod i18n;
pub mod logging;
pub mod template;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{IntakeError, Result};
