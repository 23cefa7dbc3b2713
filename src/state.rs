use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    session::SessionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let orm = crate::db::orm_from_pool(&pool);
        let sessions = SessionStore::new(std::time::Duration::from_secs(config.session_ttl_secs));
        Self {
            pool,
            orm,
            sessions,
            config: Arc::new(config),
        }
    }
}
