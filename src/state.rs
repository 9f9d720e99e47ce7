use std::sync::Arc;

use batchwise_config::{CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, init_db_pool};

use crate::store::Store;
use crate::store::postgres::PgStore;
use crate::utils::email::{EmailService, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
}

pub async fn init_app_state() -> AppState {
    AppState {
        store: Arc::new(PgStore::new(init_db_pool().await)),
        mailer: Arc::new(EmailService::new(EmailConfig::from_env())),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
    }
}
