pub mod api;
pub mod calendar;
pub mod config;
pub mod db;
pub mod notifications;
pub mod utils;

pub use db::DbPool;

use config::Config;
use notifications::Mailer;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let mailer = Arc::new(Mailer::new(config.email.clone()));
        Self { config, db, mailer }
    }
}
