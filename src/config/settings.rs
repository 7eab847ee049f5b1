use crate::config::chains::Chain;
use crate::error::{ConfigError, Result};
use alloy::primitives::{Address, U256};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_ACTION_NUM_MIN: u32 = 15;
pub const DEFAULT_ACTION_NUM_MAX: u32 = 25;
pub const DEFAULT_ACTION_TIME_MIN_MINUTES: u64 = 20;
pub const DEFAULT_ACTION_TIME_MAX_MINUTES: u64 = 40;

/// Operator config file: wallet list, module switches, mintable NFT inventory.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub wallets: Vec<WalletConfig>,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default, rename = "nft_ca")]
    pub nft_contracts: NftCategories,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub address: String,
    #[serde(default)]
    pub base_name: String,
    /// True when the wallet already holds its name registration, so the
    /// one-shot kind must not be planned again.
    #[serde(default)]
    pub name_used: bool,
    #[serde(default)]
    pub used_range: u8,
    #[serde(default, rename = "used_range_in_pools")]
    pub pool_used_range: u8,
    /// Funding source chain for the one-time preflight bridge; empty disables it.
    #[serde(default)]
    pub bridge: String,
    #[serde(default, rename = "token")]
    pub bridge_token: String,
    pub action_num_min: Option<u32>,
    pub action_num_max: Option<u32>,
    #[serde(rename = "action_time_window_min")]
    pub action_time_min: Option<u64>,
    #[serde(rename = "action_time_window_max")]
    pub action_time_max: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    pub uniswap: bool,
    pub pancake: bool,
    pub woofi: bool,
    pub openocean: bool,
    pub odos: bool,
    pub refuel: bool,
    pub zora: bool,
    pub nft2me: bool,
    pub basenames: bool,
    pub stargate: bool,
    pub dmail: bool,
    pub aave: bool,
    pub moonwell: bool,
    #[serde(rename = "collector_mod")]
    pub collector: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NftCategories {
    pub nft2me: HashMap<String, String>,
    pub zora: HashMap<String, String>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::MissingConfig(format!(
                "cannot read config file `{}`: {e}",
                path.as_ref().display()
            ))
        })?;
        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::InvalidConfig(format!("config file is malformed: {e}")))?;
        if settings.wallets.is_empty() {
            return Err(ConfigError::NoUsableWallets.into());
        }
        Ok(settings)
    }
}

impl WalletConfig {
    pub fn parsed_address(&self) -> Result<Address> {
        Address::from_str(self.address.trim()).map_err(|e| {
            ConfigError::InvalidConfig(format!("wallet address `{}` is invalid: {e}", self.address))
                .into()
        })
    }

    pub fn bridge_chain(&self) -> Option<Chain> {
        let raw = self.bridge.trim();
        if raw.is_empty() || self.bridge_token.trim().is_empty() {
            return None;
        }
        Chain::parse(raw)
    }
}

/// Mint venue prices arrive as human-entered strings; Zora lists prices in
/// "sparks" (1e-6 ETH each), nfts2me in plain ETH.
pub fn build_nft_inventory(settings: &Settings) -> HashMap<String, HashMap<Address, U256>> {
    let mut inventory = HashMap::new();
    if settings.modules.nft2me {
        inventory.insert(
            "nft2me".to_string(),
            parse_nft_category(&settings.nft_contracts.nft2me, false),
        );
    }
    if settings.modules.zora {
        inventory.insert(
            "zora".to_string(),
            parse_nft_category(&settings.nft_contracts.zora, true),
        );
    }
    inventory
}

fn parse_nft_category(
    contracts: &HashMap<String, String>,
    sparks_priced: bool,
) -> HashMap<Address, U256> {
    let mut out = HashMap::new();
    for (addr_raw, price_raw) in contracts {
        let Ok(contract) = Address::from_str(addr_raw.trim()) else {
            tracing::warn!("[CONFIG] skipping NFT entry with bad address `{addr_raw}`");
            continue;
        };
        let Ok(price) = price_raw.trim().parse::<f64>() else {
            tracing::warn!("[CONFIG] skipping NFT entry with bad price `{price_raw}`");
            continue;
        };
        let wei = if sparks_priced {
            // sparks -> ETH at 1e-6, then ETH -> wei.
            price * 1e12
        } else {
            price * 1e18
        };
        if !wei.is_finite() || wei < 0.0 {
            tracing::warn!("[CONFIG] skipping NFT entry with unusable price `{price_raw}`");
            continue;
        }
        out.insert(contract, U256::from(wei as u128));
    }
    out
}
