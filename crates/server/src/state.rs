//! Application state shared across handlers.

use crate::auth::UserDirectory;
use fragments_core::TypePolicy;
use fragments_core::config::AppConfig;
use fragments_model::Stores;
use std::sync::Arc;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata and data stores.
    pub stores: Stores,
    /// Accepted fragment types.
    pub policy: TypePolicy,
    /// Users allowed to authenticate.
    pub users: Arc<UserDirectory>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let policy = config.types.policy();
        let users = Arc::new(UserDirectory::from_config(&config.auth));
        Self {
            config: Arc::new(config),
            stores,
            policy,
            users,
        }
    }
}
