//! Deposit/withdraw alternation rules for the lending-pool kinds.

use crate::account::Account;
use crate::actions::{ActionKind, ActionParams, ActionPlan};
use crate::config::chains::Chain;
use crate::error::{DrawError, Result};
use crate::planner::Planner;
use alloy::primitives::{Address, U256};

/// Plan-level gate: within the accepted sequence, the same pool never sees
/// two deposits or two withdrawals in a row, and a withdrawal needs a prior
/// deposit for that pool.
pub(super) fn is_valid_pool_action(kind: ActionKind, accepted: &[ActionKind]) -> bool {
    let Some(pool) = kind.pool_id() else {
        return false;
    };

    let last_for_pool = accepted
        .iter()
        .rev()
        .find(|prior| prior.pool_id() == Some(pool));

    if kind.is_deposit() && last_for_pool.is_some_and(|prior| prior.is_deposit()) {
        tracing::debug!("[PLAN] {kind} rejected: previous action for its pool was a deposit");
        return false;
    }
    if kind.is_withdraw() {
        if last_for_pool.is_some_and(|prior| prior.is_withdraw()) {
            tracing::debug!("[PLAN] {kind} rejected: previous action for its pool was a withdraw");
            return false;
        }
        let deposit = kind.matching_deposit();
        if !accepted.iter().any(|prior| Some(*prior) == deposit) {
            tracing::debug!("[PLAN] {kind} rejected: no matching deposit earlier in the plan");
            return false;
        }
    }
    true
}

pub(super) async fn generate_pool_action(
    planner: &Planner,
    kind: ActionKind,
    account: &mut Account,
) -> Result<ActionPlan> {
    // Account-level memory gate, on top of the plan-level one: the retained
    // last pool action must alternate with this draw.
    let last_was_deposit = account.last_pool_action_was_deposit();
    if (kind.is_deposit() && last_was_deposit) || (kind.is_withdraw() && !last_was_deposit) {
        return Err(DrawError::OutOfSequence(kind.as_str().to_string()).into());
    }

    let token = find_eligible_token(planner, kind, account).await?;
    if kind.required_pool_token() != Some(token) {
        return Err(DrawError::NoEligiblePoolToken(kind.as_str().to_string()).into());
    }

    account.record_pool_action(kind);

    Ok(ActionPlan {
        action_kind: kind,
        params: ActionParams::Pool { token },
    })
}

/// Greedy highest raw balance over the shared token list, restricted to the
/// single token the kind can move. Balance-check failures skip the token.
async fn find_eligible_token(
    planner: &Planner,
    kind: ActionKind,
    account: &Account,
) -> Result<Address> {
    let mut selected: Option<Address> = None;
    let mut highest = U256::ZERO;

    for &token in &planner.swap_tokens {
        if kind.required_pool_token() != Some(token) {
            continue;
        }
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
        if balance > U256::ZERO && balance > highest {
            highest = balance;
            selected = Some(token);
        }
    }

    selected.ok_or_else(|| DrawError::NoEligiblePoolToken(kind.as_str().to_string()).into())
}
