//! Preflight funding and gas recovery. Both paths are best-effort wrappers
//! around the executor boundary; the engine only decides when they run.

use crate::account::Account;
use crate::actions::{ActionKind, ActionParams, ActionPlan};
use crate::config::chains::{Chain, REFUEL_CANDIDATES};
use crate::config::tokens::{self, MIN_GAS_WEI};
use crate::runner::RunContext;
use alloy::primitives::{Address, U256};
use anyhow::{anyhow, Context};

/// Share of the source balance left behind to cover fees on the way out.
const BRIDGE_HAIRCUT_PERCENT: u128 = 5;

/// One-time funding bridge from the wallet's configured source chain into
/// Base. Runs before the plan; its failure never blocks the run.
pub(super) async fn bridge_in(ctx: &RunContext, account: &mut Account) -> anyhow::Result<()> {
    let from_chain = account
        .bridge
        .ok_or_else(|| anyhow!("no bridge source configured"))?;

    // Make sure the wallet can pay gas on Base before funds start moving.
    if let Err(err) = top_up_gas(ctx, account).await {
        tracing::warn!(
            "[FUND] account {} gas top-up before bridge failed: {err}",
            account.account_id
        );
    }

    let token = bridge_token_address(from_chain, &account.bridge_token).ok_or_else(|| {
        anyhow!(
            "bridge token `{}` is not known on {from_chain}",
            account.bridge_token
        )
    })?;

    let balance = ctx
        .balances
        .balance_of(from_chain, account.address, token)
        .await
        .context("bridge source balance check")?;
    if balance == U256::ZERO {
        return Err(anyhow!("nothing to bridge from {from_chain}"));
    }
    let haircut = balance * U256::from(BRIDGE_HAIRCUT_PERCENT) / U256::from(100u64);
    let amount = balance - haircut;

    let action = ActionPlan {
        action_kind: ActionKind::Stargate,
        params: ActionParams::Bridge { from_chain, amount },
    };
    ctx.executor
        .execute(&action, account)
        .await
        .with_context(|| format!("bridge from {from_chain} failed"))?;

    let settle = from_chain.bridge_settle_wait();
    tracing::info!(
        "[FUND] account {} bridged {amount} from {from_chain}; waiting {settle:?} for settlement",
        account.account_id
    );
    tokio::time::sleep(settle).await;
    Ok(())
}

/// Gas recovery: if the Base native balance sits below the floor, refuel it
/// from whichever chain holds the most. This is also the recovery step for
/// an `InsufficientFunds` execution failure mid-plan.
pub(super) async fn top_up_gas(ctx: &RunContext, account: &mut Account) -> anyhow::Result<()> {
    let base_balance = ctx
        .balances
        .balance_of(Chain::Base, account.address, tokens::WETH)
        .await
        .context("base gas balance check")?;
    if base_balance >= U256::from(MIN_GAS_WEI) {
        tracing::debug!(
            "[FUND] account {} gas balance {base_balance} is above the floor",
            account.account_id
        );
        return Ok(());
    }

    let (src_chain, src_balance) = richest_source_chain(ctx, account).await;
    if src_balance == U256::ZERO {
        return Err(anyhow!("no gas available on any source chain"));
    }

    let action = ActionPlan {
        action_kind: ActionKind::Refuel,
        params: ActionParams::Refuel {
            src_chain,
            dst_chain: Chain::Base,
        },
    };
    ctx.executor
        .execute(&action, account)
        .await
        .with_context(|| format!("refuel from {src_chain} failed"))?;
    tracing::info!(
        "[FUND] account {} refueled Base gas from {src_chain}",
        account.account_id
    );
    Ok(())
}

async fn richest_source_chain(ctx: &RunContext, account: &Account) -> (Chain, U256) {
    let mut best = (Chain::Arbitrum, U256::ZERO);
    for &chain in REFUEL_CANDIDATES {
        let balance = match ctx
            .balances
            .balance_of(chain, account.address, tokens::WETH)
            .await
        {
            Ok(balance) => balance,
            Err(err) => {
                tracing::warn!("[FUND] balance check on {chain} failed: {err}");
                continue;
            }
        };
        if balance > best.1 {
            best = (chain, balance);
        }
    }
    best
}

/// Canonical token addresses on the funding source chains.
fn bridge_token_address(chain: Chain, symbol: &str) -> Option<Address> {
    use alloy::primitives::address;
    match (chain, symbol.trim().to_ascii_lowercase().as_str()) {
        (Chain::Arbitrum, "usdc") => Some(address!("af88d065e77c8cC2239327C5EDb3A432268e5831")),
        (Chain::Arbitrum, "eth") => Some(address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1")),
        (Chain::Optimism, "usdc") => Some(address!("0b2C639c533813f4Aa9D7837CAf62653d097Ff85")),
        (Chain::Optimism, "eth") => Some(address!("4200000000000000000000000000000000000006")),
        (Chain::Polygon, "usdc") => Some(address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359")),
        (Chain::Avalanche, "usdc") => Some(address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_token_lookup_is_case_insensitive() {
        assert!(bridge_token_address(Chain::Arbitrum, " USDC ").is_some());
        assert!(bridge_token_address(Chain::Avalanche, "eth").is_none());
        assert!(bridge_token_address(Chain::Base, "usdc").is_none());
    }
}
