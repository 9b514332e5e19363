use crate::core::config::AppConfig;
use crate::core::pool::{ChainModel, TokenModel};
use crate::core::resolver::Resolver;
use std::sync::Arc;

/// Resolves tokens and chains against the `tokens` and `chains` config sections.
pub struct ConfigResolver {
    config: Arc<AppConfig>,
}

impl ConfigResolver {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl Resolver for ConfigResolver {
    fn resolve_chain(&self, slug: &str) -> Option<ChainModel> {
        self.config.chain(slug)
    }

    fn resolve_token(&self, symbol: &str) -> Option<TokenModel> {
        self.config.token(symbol)
    }
}
