//! Per-account execution loop and the fan-out that runs every account
//! concurrently. Within one account steps run strictly in plan order; across
//! accounts there is no ordering at all.

mod funding;

use crate::account::Account;
use crate::actions::{ActionParams, ActionPlan};
use crate::balances::BalanceSource;
use crate::config::settings::ModulesConfig;
use crate::error::Result;
use crate::executor::{ActionExecutor, FailureReason};
use crate::planner::Planner;
use crate::storage::progress_db::{AccountProgress, ProgressDb};
use crate::timing;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Everything an account worker needs. Shared read-mostly; the planner's NFT
/// inventory and the progress store carry their own locks.
pub struct RunContext {
    pub planner: Planner,
    pub db: ProgressDb,
    pub executor: Arc<dyn ActionExecutor>,
    pub balances: Arc<dyn BalanceSource>,
    pub modules: ModulesConfig,
}

/// Launch one worker per account and join them all. A failed or panicked
/// worker never takes its siblings down.
pub async fn drive_accounts(accounts: Vec<Account>, ctx: Arc<RunContext>) {
    let mut join_set = JoinSet::new();
    for account in accounts {
        let ctx = Arc::clone(&ctx);
        join_set.spawn(async move {
            let account_id = account.account_id;
            run_account(account, ctx).await;
            account_id
        });
    }

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(account_id) => tracing::info!("[RUN] account {account_id} worker finished"),
            Err(err) => tracing::error!("[RUN] account worker panicked: {err:?}"),
        }
    }
}

/// PREFLIGHT -> (GENERATING | RESUMING) -> RUNNING -> DONE.
pub async fn run_account(mut account: Account, ctx: Arc<RunContext>) {
    // PREFLIGHT: optional one-time funding bridge; best-effort.
    if account.bridge.is_some() {
        if let Err(err) = funding::bridge_in(&ctx, &mut account).await {
            tracing::warn!(
                "[FUND] account {} preflight bridge failed: {err:#}",
                account.account_id
            );
        }
    }

    tracing::info!("[RUN] account {} starting", account.account_id);

    let progress = match prepare_progress(&ctx, &mut account).await {
        Ok(progress) => progress,
        Err(err) => {
            tracing::error!(
                "[RUN] account {} cannot prepare a plan: {err}",
                account.account_id
            );
            return;
        }
    };

    let start = progress.completed_steps();
    let actions = progress.generated_actions;
    let intervals = progress.generated_intervals;
    if start > 0 {
        tracing::info!(
            "[RUN] account {} resuming at step {}",
            account.account_id,
            start + 1
        );
    }
    // A record may carry fewer intervals than actions; never slice past what
    // is actually there.
    tracing::info!(
        "[RUN] account {} plan:\n{}",
        account.account_id,
        format_sequence(
            actions.get(start..).unwrap_or(&[]),
            intervals.get(start..).unwrap_or(&[])
        )
    );

    let mut aborted = false;
    for idx in start..actions.len() {
        let action = &actions[idx];
        let interval = intervals.get(idx).copied().unwrap_or(Duration::ZERO);

        tracing::info!(
            "[RUN] account {} waits {interval:?} before step {}",
            account.account_id,
            idx + 1
        );
        tokio::time::sleep(interval).await;

        match ctx.executor.execute(action, &mut account).await {
            Ok(()) => tracing::info!(
                "[RUN] account {} step {} ({}) done",
                account.account_id,
                idx + 1,
                action.action_kind
            ),
            Err(failure) => {
                tracing::warn!(
                    "[RUN] account {} step {} ({}) failed: {failure}",
                    account.account_id,
                    idx + 1,
                    action.action_kind
                );
                if failure.reason == FailureReason::InsufficientFunds {
                    if let Err(err) = funding::top_up_gas(&ctx, &mut account).await {
                        tracing::error!(
                            "[RUN] account {} recovery top-up failed, abandoning remaining steps: {err:#}",
                            account.account_id
                        );
                        aborted = true;
                    }
                }
            }
        }

        // Progress reflects the highest step attempted, success or not, so a
        // restart never re-issues this step.
        if let Err(err) = ctx
            .db
            .append_completed_step(account.account_id, action, interval)
        {
            tracing::error!(
                "[STORE] account {} progress write failed: {err}",
                account.account_id
            );
        }

        if aborted {
            return;
        }
    }

    // DONE: every step was attempted; drop the record.
    if let Err(err) = ctx.db.clear(account.account_id) {
        tracing::error!(
            "[STORE] account {} completed but state cleanup failed: {err}",
            account.account_id
        );
    }
    tracing::info!("[RUN] account {} finished its plan", account.account_id);
}

/// RESUMING when a prior record still has uncompleted steps; GENERATING when
/// there is no usable prior record or the old plan was fully consumed.
async fn prepare_progress(ctx: &RunContext, account: &mut Account) -> Result<AccountProgress> {
    if let Some(existing) = ctx.db.load(account.account_id) {
        if !existing.generated_actions.is_empty() && !existing.is_fully_consumed() {
            return Ok(existing);
        }
        if existing.is_fully_consumed() {
            tracing::info!(
                "[RUN] account {} already consumed its previous plan; generating a fresh one",
                account.account_id
            );
            if let Err(err) = ctx.db.clear(account.account_id) {
                tracing::warn!("[STORE] stale record cleanup failed: {err}");
            }
        }
    }

    let actions = ctx
        .planner
        .generate_sequence(&ctx.modules, account)
        .await?;
    let window = timing::random_window(account.action_time_min, account.action_time_max);
    let intervals = timing::distribute_intervals(actions.len(), window);

    let mut progress = AccountProgress::new(account.account_id);
    progress.generated_actions = actions;
    progress.generated_intervals = intervals;
    progress.generated_duration = window;
    if let Err(err) = ctx.db.save(&progress) {
        // Best-effort durability: the run proceeds, resume just won't work.
        tracing::error!(
            "[STORE] account {} fresh plan not persisted: {err}",
            account.account_id
        );
    }
    Ok(progress)
}

fn format_sequence(actions: &[ActionPlan], intervals: &[Duration]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for (idx, action) in actions.iter().enumerate() {
        let _ = write!(out, "Step {}: {}", idx + 1, action.action_kind);
        if let ActionParams::Swap {
            from_token,
            to_token,
        } = &action.params
        {
            let _ = write!(out, "\n\tfrom {from_token}\n\tto {to_token}");
        }
        if let Some(interval) = intervals.get(idx) {
            let _ = write!(out, "\n\twait {interval:?}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use crate::config::tokens::{USDC, WETH};

    #[test]
    fn test_format_sequence_lists_steps_and_waits() {
        let actions = vec![
            ActionPlan {
                action_kind: ActionKind::Uniswap,
                params: ActionParams::Swap {
                    from_token: WETH,
                    to_token: USDC,
                },
            },
            ActionPlan::bare(ActionKind::Dmail),
        ];
        let intervals = vec![Duration::from_secs(90), Duration::from_secs(120)];
        let rendered = format_sequence(&actions, &intervals);
        assert!(rendered.contains("Step 1: uniswap"));
        assert!(rendered.contains("Step 2: dmail"));
        assert!(rendered.contains("90s"));
    }
}
