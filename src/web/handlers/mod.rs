//! HTTP handlers and the state they share.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod files;

pub use admin::*;
pub use applications::*;
pub use auth::*;
pub use files::*;

use std::sync::Arc;
use std::time::Duration;

use crate::application::{IntakeService, ReviewService, SqliteApplicationStore};
use crate::auth::SessionManager;
use crate::config::Config;
use crate::db::{
    ApplicationStore, OperatorStore, SessionStore, SqliteOperatorStore, SqliteSessionStore,
};
use crate::file::{FileStorage, ObjectStore, UrlSigner};
use crate::i18n::I18n;
use crate::template::{embedded_engine, TemplateContext, TemplateEngine};
use crate::web::middleware::LoginRateLimiter;
use crate::{Database, IntakeError, Result};

/// Storage backends behind the web surface.
#[derive(Clone)]
pub struct Stores {
    /// Admin accounts.
    pub operators: Arc<dyn OperatorStore>,
    /// Admin sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Application records.
    pub applications: Arc<dyn ApplicationStore>,
    /// Uploaded documents.
    pub files: Arc<dyn ObjectStore>,
}

impl Stores {
    /// SQLite records and filesystem documents.
    pub fn persistent(db: &Database, config: &Config, signer: UrlSigner) -> Result<Self> {
        let pool = db.pool().clone();
        Ok(Self {
            operators: Arc::new(SqliteOperatorStore::new(pool.clone())),
            sessions: Arc::new(SqliteSessionStore::new(pool.clone())),
            applications: Arc::new(SqliteApplicationStore::new(pool)),
            files: Arc::new(FileStorage::new(&config.storage.path, signer)?),
        })
    }
}

/// Application state shared across handlers.
pub struct AppState {
    /// Loaded configuration.
    pub config: Config,
    /// Messages in the configured language.
    pub i18n: Arc<I18n>,
    /// Parsed page templates.
    pub templates: Arc<TemplateEngine>,
    /// Admin login and session lookup.
    pub sessions: SessionManager,
    /// Public submissions.
    pub intake: IntakeService,
    /// Operator review.
    pub review: ReviewService,
    /// Document storage, read by the download route.
    pub files: Arc<dyn ObjectStore>,
    /// Download link verification.
    pub signer: UrlSigner,
    /// Login attempt limiter.
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Wire services over the given stores.
    pub fn new(config: Config, stores: Stores) -> Result<Self> {
        let signer = UrlSigner::new(config.storage.signing_secret.as_bytes())?;
        let i18n = I18n::embedded(&config.locale.language)
            .map_err(|e| IntakeError::Config(e.to_string()))?;
        let templates = embedded_engine()?;

        let sessions = SessionManager::new(
            stores.sessions,
            stores.operators,
            Duration::from_secs(config.session.ttl_secs),
        );
        let intake = IntakeService::new(stores.applications.clone(), stores.files.clone());
        let review = ReviewService::new(
            stores.applications,
            stores.files.clone(),
            Duration::from_secs(config.storage.signed_url_ttl_secs),
        );
        let login_limiter = Arc::new(LoginRateLimiter::new(
            config.web.login_rate_limit,
            config.web.trust_proxy_headers,
        ));

        Ok(Self {
            config,
            i18n: Arc::new(i18n),
            templates: Arc::new(templates),
            sessions,
            intake,
            review,
            files: stores.files,
            signer,
            login_limiter,
        })
    }

    /// State over the SQLite database and filesystem storage.
    pub fn from_database(config: Config, db: &Database) -> Result<Self> {
        let signer = UrlSigner::new(config.storage.signing_secret.as_bytes())?;
        let stores = Stores::persistent(db, &config, signer)?;
        Self::new(config, stores)
    }

    /// Fresh template context with the page language set.
    pub fn page_context(&self) -> TemplateContext {
        let mut context = TemplateContext::new(self.i18n.clone());
        context.set("lang", self.i18n.locale());
        context
    }
}
