//! The shared NFT inventory hands each contract to at most one account, no
//! matter how many workers draw concurrently.

use alloy::primitives::{Address, U256};
use cadence::account::Account;
use cadence::actions::{ActionKind, ActionParams};
use cadence::balances::StaticBalances;
use cadence::config::settings::WalletConfig;
use cadence::config::tokens::SWAP_TOKENS;
use cadence::planner::Planner;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

fn test_account(id: u32) -> Account {
    let wallet: WalletConfig = serde_json::from_value(serde_json::json!({
        "address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
    }))
    .expect("wallet parse");
    Account::from_wallet(id, &wallet).expect("account")
}

#[tokio::test]
async fn test_concurrent_mint_draws_never_exceed_inventory() {
    const CONTRACTS: u64 = 4;
    const WORKERS: u32 = 8;
    const DRAWS_PER_WORKER: usize = 3;

    let mut zora = HashMap::new();
    for i in 0..CONTRACTS {
        zora.insert(Address::from_slice(&[i as u8 + 1; 20]), U256::from(i));
    }
    let mut inventory = HashMap::new();
    inventory.insert("zora".to_string(), zora);

    let planner = Arc::new(Planner::new(
        SWAP_TOKENS.to_vec(),
        inventory,
        Arc::new(StaticBalances::new()),
    ));

    let mut join_set = JoinSet::new();
    for worker in 0..WORKERS {
        let planner = Arc::clone(&planner);
        join_set.spawn(async move {
            let mut account = test_account(worker + 1);
            let mut drawn = Vec::new();
            for _ in 0..DRAWS_PER_WORKER {
                if let Ok(action) = planner
                    .generate_single_action(ActionKind::Zora, &mut account)
                    .await
                {
                    let ActionParams::Mint { contract, .. } = action.params else {
                        panic!("mint params expected");
                    };
                    drawn.push(contract);
                }
            }
            drawn
        });
    }

    let mut all_drawn = Vec::new();
    while let Some(result) = join_set.join_next().await {
        all_drawn.extend(result.expect("worker completes"));
    }

    assert_eq!(
        all_drawn.len(),
        CONTRACTS as usize,
        "every contract is drawn exactly once across {WORKERS} workers"
    );
    let unique: HashSet<Address> = all_drawn.iter().copied().collect();
    assert_eq!(unique.len(), all_drawn.len(), "no contract drawn twice");
    assert_eq!(planner.nft_inventory_len("zora"), 0);
}

#[tokio::test]
async fn test_empty_venue_fails_the_draw_not_the_worker() {
    let planner = Planner::new(
        SWAP_TOKENS.to_vec(),
        HashMap::new(),
        Arc::new(StaticBalances::new()),
    );
    let mut account = test_account(1);
    let result = planner
        .generate_single_action(ActionKind::Nft2Me, &mut account)
        .await;
    assert!(result.is_err());
}
