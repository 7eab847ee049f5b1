//! Managed wallet identities and their per-run memory.

use crate::config::chains::Chain;
use crate::config::settings::{
    WalletConfig, DEFAULT_ACTION_NUM_MAX, DEFAULT_ACTION_NUM_MIN, DEFAULT_ACTION_TIME_MAX_MINUTES,
    DEFAULT_ACTION_TIME_MIN_MINUTES,
};
use crate::error::{ConfigError, Result};
use alloy::primitives::Address;
use rand::Rng;

pub const SWAP_HISTORY_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPair {
    pub from: Address,
    pub to: Address,
}

/// One managed wallet. The mutable tail (`last_*` fields) is run-time memory
/// owned exclusively by the account's own worker; it is never shared.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: u32,
    pub address: Address,
    pub base_name: String,
    pub name_used: bool,
    pub used_range: u8,
    pub pool_used_range: u8,
    pub bridge: Option<Chain>,
    pub bridge_token: String,
    pub action_num_min: u32,
    pub action_num_max: u32,
    pub action_time_min: u64,
    pub action_time_max: u64,

    pub last_swaps: Vec<SwapPair>,
    pub last_refuel: Option<Chain>,
    pub last_pool_action: Vec<crate::actions::ActionKind>,
}

impl Account {
    pub fn from_wallet(account_id: u32, wallet: &WalletConfig) -> Result<Self> {
        let address = wallet.parsed_address()?;

        let mut rng = rand::thread_rng();
        let used_range = if wallet.used_range == 0 {
            rng.gen_range(70..=100)
        } else {
            wallet.used_range
        };
        let pool_used_range = if wallet.pool_used_range == 0 {
            rng.gen_range(20..=50)
        } else {
            wallet.pool_used_range
        };

        let (action_num_min, action_num_max) =
            match (wallet.action_num_min, wallet.action_num_max) {
                (None, None) => (DEFAULT_ACTION_NUM_MIN, DEFAULT_ACTION_NUM_MAX),
                (min, max) => (
                    min.unwrap_or(DEFAULT_ACTION_NUM_MIN),
                    max.unwrap_or(DEFAULT_ACTION_NUM_MAX),
                ),
            };
        let (action_time_min, action_time_max) =
            match (wallet.action_time_min, wallet.action_time_max) {
                (None, None) => (
                    DEFAULT_ACTION_TIME_MIN_MINUTES,
                    DEFAULT_ACTION_TIME_MAX_MINUTES,
                ),
                (min, max) => (
                    min.unwrap_or(DEFAULT_ACTION_TIME_MIN_MINUTES),
                    max.unwrap_or(DEFAULT_ACTION_TIME_MAX_MINUTES),
                ),
            };

        Ok(Self {
            account_id,
            address,
            base_name: wallet.base_name.trim().to_string(),
            name_used: wallet.name_used,
            used_range,
            pool_used_range,
            bridge: wallet.bridge_chain(),
            bridge_token: wallet.bridge_token.trim().to_string(),
            action_num_min,
            action_num_max,
            action_time_min,
            action_time_max,
            last_swaps: Vec::new(),
            last_refuel: None,
            last_pool_action: Vec::new(),
        })
    }

    /// Remember an accepted swap pair, evicting the oldest past the cap.
    pub fn push_swap(&mut self, pair: SwapPair) {
        self.last_swaps.push(pair);
        if self.last_swaps.len() > SWAP_HISTORY_CAP {
            self.last_swaps.remove(0);
        }
    }

    pub fn last_swap_to(&self) -> Option<Address> {
        self.last_swaps.last().map(|pair| pair.to)
    }

    /// Pool history only retains the most recent action.
    pub fn record_pool_action(&mut self, kind: crate::actions::ActionKind) {
        if !self.last_pool_action.is_empty() {
            self.last_pool_action.remove(0);
        }
        self.last_pool_action.push(kind);
    }

    pub fn last_pool_action_was_deposit(&self) -> bool {
        self.last_pool_action
            .last()
            .is_some_and(|kind| kind.is_deposit())
    }
}

/// Build the account roster, 1-based ids in wallet order. Unparseable wallets
/// are skipped with a warning; an empty roster is fatal.
pub fn build_accounts(wallets: &[WalletConfig]) -> Result<Vec<Account>> {
    let mut accounts = Vec::with_capacity(wallets.len());
    for (idx, wallet) in wallets.iter().enumerate() {
        let account_id = idx as u32 + 1;
        match Account::from_wallet(account_id, wallet) {
            Ok(account) => accounts.push(account),
            Err(err) => {
                tracing::warn!("[CONFIG] skipping wallet {account_id}: {err}");
            }
        }
    }
    if accounts.is_empty() {
        return Err(ConfigError::NoUsableWallets.into());
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use crate::config::tokens::{USDC, USDBC, WETH};

    fn wallet(address: &str) -> WalletConfig {
        serde_json::from_value(serde_json::json!({ "address": address })).expect("wallet parse")
    }

    #[test]
    fn test_defaults_fill_unset_ranges() {
        let account = Account::from_wallet(
            1,
            &wallet("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        )
        .expect("account");
        assert!((70..=100).contains(&account.used_range));
        assert!((20..=50).contains(&account.pool_used_range));
        assert_eq!(account.action_num_min, DEFAULT_ACTION_NUM_MIN);
        assert_eq!(account.action_num_max, DEFAULT_ACTION_NUM_MAX);
        assert_eq!(account.action_time_min, DEFAULT_ACTION_TIME_MIN_MINUTES);
        assert_eq!(account.action_time_max, DEFAULT_ACTION_TIME_MAX_MINUTES);
    }

    #[test]
    fn test_swap_history_is_bounded() {
        let mut account = Account::from_wallet(
            1,
            &wallet("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        )
        .expect("account");
        for _ in 0..SWAP_HISTORY_CAP + 5 {
            account.push_swap(SwapPair {
                from: WETH,
                to: USDC,
            });
        }
        account.push_swap(SwapPair {
            from: USDC,
            to: USDBC,
        });
        assert_eq!(account.last_swaps.len(), SWAP_HISTORY_CAP);
        assert_eq!(account.last_swap_to(), Some(USDBC));
    }

    #[test]
    fn test_pool_history_keeps_only_last_action() {
        let mut account = Account::from_wallet(
            1,
            &wallet("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        )
        .expect("account");
        account.record_pool_action(ActionKind::AaveEthDeposit);
        account.record_pool_action(ActionKind::MoonwellWithdraw);
        assert_eq!(account.last_pool_action, vec![ActionKind::MoonwellWithdraw]);
        assert!(!account.last_pool_action_was_deposit());
    }

    #[test]
    fn test_build_accounts_skips_bad_wallets_but_needs_one() {
        let wallets = vec![wallet("not-an-address")];
        assert!(build_accounts(&wallets).is_err());

        let wallets = vec![
            wallet("not-an-address"),
            wallet("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        ];
        let accounts = build_accounts(&wallets).expect("one usable wallet");
        assert_eq!(accounts.len(), 1);
        // Ids follow wallet positions even when earlier entries are skipped.
        assert_eq!(accounts[0].account_id, 2);
    }
}
