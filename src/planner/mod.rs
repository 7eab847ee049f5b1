//! Constrained random plan generation: turns a wallet's eligible action
//! kinds into an ordered sequence of materialized steps.

pub mod capabilities;
mod pools;
mod swaps;

use crate::account::Account;
use crate::actions::{default_sweep_targets, ActionKind, ActionParams, ActionPlan};
use crate::balances::BalanceSource;
use crate::config::chains::{Chain, REFUEL_CANDIDATES};
use crate::config::settings::ModulesConfig;
use crate::error::{ConfigError, DrawError, Result};
use alloy::primitives::{Address, U256};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use capabilities::resolve_capabilities;

/// Plan length used when an account's configured bounds are unusable.
pub const FALLBACK_PLAN_LENGTH: u32 = 10;

/// Shared across all account workers. The NFT inventory is consumed under a
/// mutex so no two accounts ever mint the same contract; the token list is
/// read-only and needs no lock.
pub struct Planner {
    pub(crate) swap_tokens: Vec<Address>,
    nft_inventory: Mutex<HashMap<String, HashMap<Address, U256>>>,
    pub(crate) balances: Arc<dyn BalanceSource>,
}

impl Planner {
    pub fn new(
        swap_tokens: Vec<Address>,
        nft_inventory: HashMap<String, HashMap<Address, U256>>,
        balances: Arc<dyn BalanceSource>,
    ) -> Self {
        Self {
            swap_tokens,
            nft_inventory: Mutex::new(nft_inventory),
            balances,
        }
    }

    /// Generate one account's plan. Draw-level failures skip the iteration;
    /// only an empty eligible set fails generation outright.
    pub async fn generate_sequence(
        &self,
        modules: &ModulesConfig,
        account: &mut Account,
    ) -> Result<Vec<ActionPlan>> {
        let target_len = match plan_length(account) {
            Ok(n) => n,
            Err(err) => {
                tracing::warn!(
                    "[PLAN] account {} has unusable action bounds ({err}); using fallback length {FALLBACK_PLAN_LENGTH}",
                    account.account_id
                );
                FALLBACK_PLAN_LENGTH
            }
        };

        let eligible = resolve_capabilities(modules, account);
        if eligible.is_empty() {
            return Err(ConfigError::NoEligibleActions.into());
        }

        // The collector sweeps the whole portfolio; anything scheduled next
        // to it would run against a drained wallet. It always stands alone.
        if eligible.contains(&ActionKind::Collector) {
            let action = self.generate_single_action(ActionKind::Collector, account).await?;
            return Ok(vec![action]);
        }

        let mut plan: Vec<ActionPlan> = Vec::with_capacity(target_len as usize);
        let mut accepted_kinds: Vec<ActionKind> = Vec::with_capacity(target_len as usize);
        let mut name_added = account.name_used;

        for _ in 0..target_len {
            let kind = eligible[rand::thread_rng().gen_range(0..eligible.len())];

            if kind.is_one_shot() {
                if name_added {
                    continue;
                }
                name_added = true;
            }

            if (kind.is_deposit() || kind.is_withdraw())
                && !pools::is_valid_pool_action(kind, &accepted_kinds)
            {
                continue;
            }

            let action = match self.generate_single_action(kind, account).await {
                Ok(action) => action,
                Err(err) => {
                    tracing::debug!(
                        "[PLAN] account {} draw {kind} skipped: {err}",
                        account.account_id
                    );
                    continue;
                }
            };

            accepted_kinds.push(kind);
            plan.push(action);
        }

        Ok(plan)
    }

    /// Materialize one drawn kind into a concrete step.
    pub async fn generate_single_action(
        &self,
        kind: ActionKind,
        account: &mut Account,
    ) -> Result<ActionPlan> {
        match kind {
            k if k.is_swap() => swaps::generate_swap(self, k, account).await,
            k if k.is_mint() => self.draw_nft(k),
            k if k.pool_id().is_some() => pools::generate_pool_action(self, k, account).await,
            ActionKind::Refuel => Ok(self.pick_refuel_destination(account)),
            ActionKind::BaseName => Ok(ActionPlan {
                action_kind: kind,
                params: ActionParams::Name {
                    name: account.base_name.clone(),
                },
            }),
            ActionKind::Collector => Ok(ActionPlan {
                action_kind: kind,
                params: ActionParams::Sweep {
                    targets: default_sweep_targets(),
                },
            }),
            // Stargate and Dmail carry no planning-time parameters.
            _ => Ok(ActionPlan::bare(kind)),
        }
    }

    /// Check-and-remove under the inventory mutex: a contract drawn here is
    /// gone for every other account.
    fn draw_nft(&self, kind: ActionKind) -> Result<ActionPlan> {
        let venue = mint_venue(kind);
        let mut inventory = self.nft_inventory.lock().unwrap_or_else(|p| p.into_inner());
        let contracts = inventory
            .get_mut(venue)
            .filter(|contracts| !contracts.is_empty())
            .ok_or_else(|| DrawError::NftInventoryEmpty(venue.to_string()))?;

        let keys: Vec<Address> = contracts.keys().copied().collect();
        let contract = keys[rand::thread_rng().gen_range(0..keys.len())];
        let price_wei = contracts.remove(&contract).expect("key just listed");

        Ok(ActionPlan {
            action_kind: kind,
            params: ActionParams::Mint {
                contract,
                price_wei,
            },
        })
    }

    /// Uniform over the candidate chains, excluding the previous destination
    /// when any alternative exists. The pick is remembered on the account.
    fn pick_refuel_destination(&self, account: &mut Account) -> ActionPlan {
        let candidates: Vec<Chain> = REFUEL_CANDIDATES
            .iter()
            .copied()
            .filter(|&chain| Some(chain) != account.last_refuel)
            .collect();
        let pool = if candidates.is_empty() {
            REFUEL_CANDIDATES.to_vec()
        } else {
            candidates
        };
        let dst_chain = pool[rand::thread_rng().gen_range(0..pool.len())];
        account.last_refuel = Some(dst_chain);

        ActionPlan {
            action_kind: ActionKind::Refuel,
            params: ActionParams::Refuel {
                src_chain: Chain::Base,
                dst_chain,
            },
        }
    }

    /// Remaining unclaimed contracts for a venue.
    pub fn nft_inventory_len(&self, venue: &str) -> usize {
        let inventory = self.nft_inventory.lock().unwrap_or_else(|p| p.into_inner());
        inventory.get(venue).map_or(0, HashMap::len)
    }
}

fn mint_venue(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Zora => "zora",
        _ => "nft2me",
    }
}

/// Uniform plan length within the wallet's bounds; inverted bounds are a
/// configuration error the caller converts into the fallback length.
fn plan_length(account: &Account) -> Result<u32> {
    let (min, max) = (account.action_num_min, account.action_num_max);
    if min > max {
        return Err(ConfigError::InvalidActionBounds { min, max }.into());
    }
    Ok(rand::thread_rng().gen_range(min..=max))
}
