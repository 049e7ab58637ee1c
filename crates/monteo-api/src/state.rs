//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API.
//! Services are generic over repository/collaborator traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use monteo_core::board::BoardSession;
use monteo_core::checklist::TemplateService;
use monteo_core::service::job::JobService;
use monteo_infra::blob::LocalBlobStore;
use monteo_infra::config::ServerConfig;
use monteo_infra::notify::WebhookNotifier;
use monteo_infra::sqlite::job::SqliteJobRepository;
use monteo_infra::sqlite::pool::DatabasePool;
use monteo_infra::sqlite::settings::SqliteSettingsRepository;
use monteo_infra::sqlite::template::SqliteTemplateRepository;

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteJobService = JobService<
    SqliteJobRepository,
    SqliteTemplateRepository,
    SqliteSettingsRepository,
    WebhookNotifier,
    LocalBlobStore,
>;

pub type ConcreteTemplateService = TemplateService<SqliteTemplateRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub job_service: Arc<ConcreteJobService>,
    pub template_service: Arc<ConcreteTemplateService>,
    pub settings_repo: Arc<SqliteSettingsRepository>,
    /// Per-UI-client optimistic board sessions, keyed by session id.
    pub board_sessions: Arc<DashMap<Uuid, BoardSession>>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire
    /// services to the infra implementations.
    pub async fn init(data_dir: PathBuf, config: &ServerConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("monteo.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let job_service = JobService::new(
            SqliteJobRepository::new(db_pool.clone()),
            TemplateService::new(SqliteTemplateRepository::new(db_pool.clone())),
            SqliteSettingsRepository::new(db_pool.clone()),
            WebhookNotifier::new(config.notification_url.clone()),
            LocalBlobStore::new(data_dir.clone()),
        );

        // Separate template service for the admin endpoints (job_service
        // owns one internally for instantiation).
        let template_service = TemplateService::new(SqliteTemplateRepository::new(db_pool.clone()));

        Ok(Self {
            job_service: Arc::new(job_service),
            template_service: Arc::new(template_service),
            settings_repo: Arc::new(SqliteSettingsRepository::new(db_pool.clone())),
            board_sessions: Arc::new(DashMap::new()),
            data_dir,
            db_pool,
        })
    }
}
