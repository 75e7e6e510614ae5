use anyhow::{anyhow, Context};
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::models::Entity;
use crate::database::{DocumentStore, ReferencePolicies, Repository};
use crate::services::Populator;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: TokenService,
    pub policies: Arc<ReferencePolicies>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.security.jwt_secret).context("JWT_SECRET must be set")?;
        let policies = ReferencePolicies::parse(&config.database.delete_policies)
            .map_err(|e| anyhow!("invalid DATABASE_DELETE_POLICIES: {}", e))?;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            policies: Arc::new(policies),
        })
    }

    pub fn with_policies(mut self, policies: ReferencePolicies) -> Self {
        self.policies = Arc::new(policies);
        self
    }

    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    pub fn populator(&self) -> Populator {
        Populator::new(self.store.clone())
    }
}
