use super::auth::CredentialVerifier;
use crate::config::Config;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            db,
            config,
            verifier,
        }
    }
}
