//! Swap pair selection: balance-weighted entry, chained from-tokens, and
//! anti-repeat on the to-token.

use crate::account::{Account, SwapPair};
use crate::actions::{ActionKind, ActionParams, ActionPlan};
use crate::config::chains::Chain;
use crate::config::tokens;
use crate::error::{DrawError, Result};
use crate::planner::Planner;
use alloy::primitives::{Address, U256};
use rand::Rng;

pub(super) async fn generate_swap(
    planner: &Planner,
    kind: ActionKind,
    account: &mut Account,
) -> Result<ActionPlan> {
    let candidates = venue_tokens(kind, &planner.swap_tokens);
    let from_token = select_from_token(planner, kind, account, &candidates).await?;
    let to_token = select_to_token(account, from_token, &candidates)?;

    Ok(ActionPlan {
        action_kind: kind,
        params: ActionParams::Swap {
            from_token,
            to_token,
        },
    })
}

/// WooFi cannot route USDbC; every other venue takes the full list.
fn venue_tokens(kind: ActionKind, all: &[Address]) -> Vec<Address> {
    all.iter()
        .copied()
        .filter(|&token| !(kind == ActionKind::Woofi && token == tokens::USDBC))
        .collect()
}

/// First swap enters from the wallet's most valuable holding; later swaps
/// chain from wherever the previous swap left the funds.
async fn select_from_token(
    planner: &Planner,
    kind: ActionKind,
    account: &Account,
    candidates: &[Address],
) -> Result<Address> {
    let Some(chained) = account.last_swap_to() else {
        return highest_value_token(planner, account, candidates).await;
    };

    if kind == ActionKind::Woofi && chained == tokens::USDBC {
        return Err(DrawError::UnsupportedToken {
            venue: kind.as_str().to_string(),
            token: chained.to_string(),
        }
        .into());
    }
    Ok(chained)
}

/// Uniform draw with bounded retries, rejecting the from-token and the
/// previous swap's to-token. The accepted pair lands in the account's swap
/// history.
fn select_to_token(
    account: &mut Account,
    from_token: Address,
    candidates: &[Address],
) -> Result<Address> {
    let previous_to = account.last_swap_to();

    for _ in 0..=candidates.len() {
        let Ok(to_token) = random_token(candidates, from_token) else {
            continue;
        };
        if to_token == from_token {
            continue;
        }
        if previous_to == Some(to_token) {
            continue;
        }

        account.push_swap(SwapPair {
            from: from_token,
            to: to_token,
        });
        return Ok(to_token);
    }

    Err(DrawError::NoSwapCandidate.into())
}

fn random_token(candidates: &[Address], exclude: Address) -> Result<Address> {
    let filtered: Vec<Address> = candidates
        .iter()
        .copied()
        .filter(|&token| token != exclude)
        .collect();
    if filtered.is_empty() {
        return Err(DrawError::NoSwapCandidate.into());
    }
    let idx = rand::thread_rng().gen_range(0..filtered.len());
    Ok(filtered[idx])
}

/// Highest USD-normalized balance across the allowed tokens; all-zero is a
/// draw error.
async fn highest_value_token(
    planner: &Planner,
    account: &Account,
    candidates: &[Address],
) -> Result<Address> {
    let mut selected: Option<Address> = None;
    let mut highest = 0f64;

    for &token in candidates {
        let balance = match planner
            .balances
            .balance_of(Chain::Base, account.address, token)
            .await
        {
            Ok(balance) => balance,
            Err(err) => {
                tracing::warn!("[PLAN] balance check failed for {token}: {err}");
                continue;
            }
        };
        if balance == U256::ZERO {
            continue;
        }
        let value = tokens::normalized_usd(balance, token);
        if value > highest {
            highest = value;
            selected = Some(token);
        }
    }

    selected.ok_or_else(|| DrawError::NoFundedToken(account.account_id).into())
}
