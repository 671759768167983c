use crate::auth::{AuthService, IdentityProvider};
use crate::cart::CartStore;
use crate::config::Config;
use crate::error::Result;
use crate::storage::CatalogStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn CatalogStore>,
    pub auth: AuthService,
    pub carts: CartStore,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn CatalogStore>) -> Result<Arc<Self>> {
        let auth = AuthService::from_config(&config.auth)?;
        Ok(Self::assemble(config, catalog, auth))
    }

    /// State with a caller-supplied identity provider.
    pub fn with_provider(
        config: Config,
        catalog: Arc<dyn CatalogStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Arc<Self>> {
        let auth = AuthService::new(provider, &config.auth)?;
        Ok(Self::assemble(config, catalog, auth))
    }

    fn assemble(config: Config, catalog: Arc<dyn CatalogStore>, auth: AuthService) -> Arc<Self> {
        Arc::new(Self {
            config,
            catalog,
            auth,
            carts: CartStore::new(),
        })
    }
}
