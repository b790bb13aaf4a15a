use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::store::Store;

/// Everything a request handler needs, shared through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    /// bcrypt work factor for new password hashes.
    pub password_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, password_cost: u32) -> Self {
        Self {
            store,
            tokens,
            password_cost,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.jwt_expires_in,
            &config.jwt_issuer,
            &config.jwt_audience,
        );
        Self::new(store, tokens, config.bcrypt_cost)
    }
}
