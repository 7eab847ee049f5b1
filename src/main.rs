//! Operator binary: loads the wallet roster, offers the resume/discard choice
//! when prior progress exists, then fans out one worker per account.
//!
//! This build is dry-run only: steps are logged through `DryRunExecutor`
//! instead of being sent anywhere.

use alloy::primitives::U256;
use cadence::account::build_accounts;
use cadence::balances::StaticBalances;
use cadence::config::chains::Chain;
use cadence::config::settings::{build_nft_inventory, Settings};
use cadence::config::tokens::{SWAP_TOKENS, USDC, WETH};
use cadence::executor::DryRunExecutor;
use cadence::planner::Planner;
use cadence::runner::{drive_accounts, RunContext};
use cadence::storage::progress_db::ProgressDb;
use std::io::Write;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "cadence_config.json";
const DEFAULT_STATE_PATH: &str = "state.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to `info` when RUST_LOG is unset or invalid to avoid a silent start.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let state_path = std::env::var("STATE_PATH").unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string());

    let settings = Settings::load(&config_path)?;
    tracing::info!("[STARTUP] configuration loaded from {config_path}");

    let accounts = build_accounts(&settings.wallets)?;
    tracing::info!("[STARTUP] {} account(s) ready", accounts.len());

    let db = ProgressDb::open(&state_path);
    offer_resume_choice(&db)?;

    // Dry-run balance book: every wallet gets a plausible Base holding so
    // swap and pool materialization has something to select from.
    let balances = Arc::new(StaticBalances::new());
    for account in &accounts {
        balances.set(
            Chain::Base,
            account.address,
            WETH,
            U256::from(10u128.pow(18)),
        );
        balances.set(
            Chain::Base,
            account.address,
            USDC,
            U256::from(1_000_000_000u64),
        );
    }

    let planner = Planner::new(
        SWAP_TOKENS.to_vec(),
        build_nft_inventory(&settings),
        balances.clone(),
    );
    let ctx = Arc::new(RunContext {
        planner,
        db,
        executor: Arc::new(DryRunExecutor),
        balances,
        modules: settings.modules,
    });

    drive_accounts(accounts, ctx).await;
    tracing::info!("[STARTUP] all account workers finished; exiting");
    Ok(())
}

/// When prior progress exists, let the operator keep it or wipe it.
/// `CADENCE_RESUME=keep|discard` answers non-interactively.
fn offer_resume_choice(db: &ProgressDb) -> anyhow::Result<()> {
    if !db.has_any() {
        tracing::info!("[STARTUP] state file is empty; starting fresh");
        return Ok(());
    }

    let answer = match std::env::var("CADENCE_RESUME") {
        Ok(raw) => raw.trim().to_ascii_lowercase(),
        Err(_) => {
            print!("Prior progress found. Resume it? (y/n): ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            if line.trim().eq_ignore_ascii_case("y") {
                "keep".to_string()
            } else {
                "discard".to_string()
            }
        }
    };

    if answer == "keep" {
        tracing::info!("[STARTUP] resuming prior progress");
    } else {
        db.clear_all()?;
        tracing::info!("[STARTUP] prior progress discarded");
    }
    Ok(())
}
