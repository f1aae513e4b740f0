//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::services::auth::TokenService;
use crate::services::gateway::PaymentGateway;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources: configuration, storage, the payment gateway, and the token
/// service. Storage and gateway sit behind trait objects so tests (and local
/// development) can run the full stack over the in-memory backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Storage backend (`PgStore` in production)
    /// * `gateway` - Payment gateway (`SyntheticGateway` in the demo model)
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn Store>, gateway: Arc<dyn PaymentGateway>) -> Self {
        let tokens = TokenService::new(
            &config.jwt_user_secret,
            &config.jwt_admin_secret,
            config.token_ttl_secs,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                gateway,
                tokens,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
