//! Action taxonomy: every on-chain operation category the engine can plan,
//! plus the parameter payload each category carries once materialized.

use crate::config::chains::Chain;
use crate::config::tokens;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Uniswap,
    Pancake,
    Woofi,
    Odos,
    OpenOcean,
    Stargate,
    Refuel,
    Zora,
    Nft2Me,
    BaseName,
    Dmail,
    AaveEthDeposit,
    AaveEthWithdraw,
    AaveUsdcSupply,
    AaveUsdcWithdraw,
    MoonwellDeposit,
    MoonwellWithdraw,
    Collector,
}

/// Pool identity for the deposit/withdraw alternation rule. Derived from the
/// kind pairing (protocol + asset), never from the token chosen later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolId {
    AaveEth,
    AaveUsdc,
    Moonwell,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uniswap => "uniswap",
            Self::Pancake => "pancake",
            Self::Woofi => "woofi",
            Self::Odos => "odos",
            Self::OpenOcean => "openocean",
            Self::Stargate => "stargate",
            Self::Refuel => "refuel",
            Self::Zora => "zora",
            Self::Nft2Me => "nft2me",
            Self::BaseName => "basenames",
            Self::Dmail => "dmail",
            Self::AaveEthDeposit => "aave_deposit",
            Self::AaveEthWithdraw => "aave_withdraw",
            Self::AaveUsdcSupply => "aave_supply",
            Self::AaveUsdcWithdraw => "aave_withdraw_usdc",
            Self::MoonwellDeposit => "moonwell_deposit",
            Self::MoonwellWithdraw => "moonwell_withdraw",
            Self::Collector => "collector_mod",
        }
    }

    pub fn is_swap(self) -> bool {
        matches!(
            self,
            Self::Uniswap | Self::Pancake | Self::Woofi | Self::Odos | Self::OpenOcean
        )
    }

    pub fn is_mint(self) -> bool {
        matches!(self, Self::Zora | Self::Nft2Me)
    }

    pub fn is_deposit(self) -> bool {
        matches!(
            self,
            Self::AaveEthDeposit | Self::AaveUsdcSupply | Self::MoonwellDeposit
        )
    }

    pub fn is_withdraw(self) -> bool {
        matches!(
            self,
            Self::AaveEthWithdraw | Self::AaveUsdcWithdraw | Self::MoonwellWithdraw
        )
    }

    /// Kinds that may appear at most once per plan.
    pub fn is_one_shot(self) -> bool {
        matches!(self, Self::BaseName)
    }

    pub fn pool_id(self) -> Option<PoolId> {
        match self {
            Self::AaveEthDeposit | Self::AaveEthWithdraw => Some(PoolId::AaveEth),
            Self::AaveUsdcSupply | Self::AaveUsdcWithdraw => Some(PoolId::AaveUsdc),
            Self::MoonwellDeposit | Self::MoonwellWithdraw => Some(PoolId::Moonwell),
            _ => None,
        }
    }

    /// The deposit kind a withdraw must be preceded by.
    pub fn matching_deposit(self) -> Option<ActionKind> {
        match self {
            Self::AaveEthWithdraw => Some(Self::AaveEthDeposit),
            Self::AaveUsdcWithdraw => Some(Self::AaveUsdcSupply),
            Self::MoonwellWithdraw => Some(Self::MoonwellDeposit),
            _ => None,
        }
    }

    /// Each pool kind moves exactly one token.
    pub fn required_pool_token(self) -> Option<Address> {
        match self {
            Self::AaveEthDeposit | Self::AaveEthWithdraw => Some(tokens::WETH),
            Self::AaveUsdcSupply | Self::AaveUsdcWithdraw => Some(tokens::USDC),
            Self::MoonwellDeposit | Self::MoonwellWithdraw => Some(tokens::WETH),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positions the portfolio collector sweeps, dispatched by exhaustive match
/// on the executor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "position")]
pub enum SweepTarget {
    Erc20 { token: Address },
    AavePool { token: Address },
    MoonwellPool { token: Address },
}

/// Default sweep set: loose stables plus every pool position the planner can
/// have opened.
pub fn default_sweep_targets() -> Vec<SweepTarget> {
    vec![
        SweepTarget::Erc20 {
            token: tokens::USDC,
        },
        SweepTarget::Erc20 {
            token: tokens::USDBC,
        },
        SweepTarget::AavePool {
            token: tokens::AAVE_USDC,
        },
        SweepTarget::AavePool {
            token: tokens::AAVE_WETH,
        },
        SweepTarget::MoonwellPool {
            token: tokens::MOONWELL_WETH,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionParams {
    None,
    Swap {
        from_token: Address,
        to_token: Address,
    },
    Mint {
        contract: Address,
        price_wei: U256,
    },
    Refuel {
        src_chain: Chain,
        dst_chain: Chain,
    },
    Pool {
        token: Address,
    },
    Name {
        name: String,
    },
    Bridge {
        from_chain: Chain,
        amount: U256,
    },
    Sweep {
        targets: Vec<SweepTarget>,
    },
}

/// One materialized plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(rename = "type")]
    pub action_kind: ActionKind,
    pub params: ActionParams,
}

impl ActionPlan {
    pub fn bare(action_kind: ActionKind) -> Self {
        Self {
            action_kind,
            params: ActionParams::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_pairing_is_symmetric() {
        for kind in [
            ActionKind::AaveEthWithdraw,
            ActionKind::AaveUsdcWithdraw,
            ActionKind::MoonwellWithdraw,
        ] {
            let deposit = kind.matching_deposit().expect("withdraw has a deposit");
            assert_eq!(deposit.pool_id(), kind.pool_id());
            assert!(deposit.is_deposit());
        }
    }

    #[test]
    fn test_pool_kinds_move_one_token() {
        assert_eq!(
            ActionKind::AaveUsdcSupply.required_pool_token(),
            Some(tokens::USDC)
        );
        assert_eq!(
            ActionKind::MoonwellDeposit.required_pool_token(),
            Some(tokens::WETH)
        );
        assert_eq!(ActionKind::Uniswap.required_pool_token(), None);
    }

    #[test]
    fn test_action_plan_serde_round_trip() {
        let plan = ActionPlan {
            action_kind: ActionKind::Woofi,
            params: ActionParams::Swap {
                from_token: tokens::WETH,
                to_token: tokens::USDC,
            },
        };
        let encoded = serde_json::to_string(&plan).expect("encode");
        let decoded: ActionPlan = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, plan);
    }
}
