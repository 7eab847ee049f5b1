//! Balance lookups are a boundary contract: the engine only ever asks "how
//! much of token X does owner Y hold on chain Z" and treats the call as
//! opaque and blocking.

use crate::config::chains::Chain;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance_of(&self, chain: Chain, owner: Address, token: Address)
        -> anyhow::Result<U256>;
}

/// In-memory balance book. Backs dry runs and tests; a production deployment
/// substitutes an RPC-backed implementation.
#[derive(Default)]
pub struct StaticBalances {
    entries: Mutex<HashMap<(Chain, Address, Address), U256>>,
}

impl StaticBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, chain: Chain, owner: Address, token: Address, amount: U256) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert((chain, owner, token), amount);
    }
}

#[async_trait]
impl BalanceSource for StaticBalances {
    async fn balance_of(
        &self,
        chain: Chain,
        owner: Address,
        token: Address,
    ) -> anyhow::Result<U256> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries
            .get(&(chain, owner, token))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}
