use crate::core::pool::{ChainModel, TokenModel};

/// Maps catalog identifiers onto display models. `None` means the pair is
/// not applicable and is left out of the catalog.
pub trait Resolver: Send + Sync {
    fn resolve_chain(&self, slug: &str) -> Option<ChainModel>;
    fn resolve_token(&self, symbol: &str) -> Option<TokenModel>;
}
