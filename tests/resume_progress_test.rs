//! Restart semantics: a resumed account attempts exactly the uncompleted
//! suffix of its plan, progress is appended after every attempt, and a
//! finished plan clears its record.

use async_trait::async_trait;
use cadence::account::Account;
use cadence::actions::{ActionKind, ActionPlan};
use cadence::balances::StaticBalances;
use cadence::config::chains::Chain;
use cadence::config::settings::{ModulesConfig, WalletConfig};
use cadence::config::tokens::{SWAP_TOKENS, WETH};
use cadence::executor::{ActionExecutor, ExecutionFailure, FailureReason};
use cadence::planner::Planner;
use cadence::runner::{run_account, RunContext};
use cadence::storage::progress_db::{AccountProgress, ProgressDb};
use alloy::primitives::U256;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn temp_state_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("{}_{}.json", prefix, nanos))
}

fn test_account(id: u32) -> Account {
    let wallet: WalletConfig = serde_json::from_value(serde_json::json!({
        "address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        "action_time_window_min": 0,
        "action_time_window_max": 0,
    }))
    .expect("wallet parse");
    Account::from_wallet(id, &wallet).expect("account")
}

/// Records every call; optionally fails a single step with a given reason.
struct ScriptedExecutor {
    calls: Mutex<Vec<ActionKind>>,
    fail_on_call: Option<usize>,
    failure: FailureReason,
}

impl ScriptedExecutor {
    fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: None,
            failure: FailureReason::Other,
        }
    }

    fn failing_once(call: usize, failure: FailureReason) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
            failure,
        }
    }

    fn calls(&self) -> Vec<ActionKind> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ActionExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        action: &ActionPlan,
        _account: &mut Account,
    ) -> Result<(), ExecutionFailure> {
        let mut calls = self.calls.lock().expect("calls lock");
        let call_idx = calls.len();
        calls.push(action.action_kind);
        if self.fail_on_call == Some(call_idx) {
            return Err(ExecutionFailure::new(self.failure, "scripted failure"));
        }
        Ok(())
    }
}

fn context(
    state_path: &PathBuf,
    executor: Arc<ScriptedExecutor>,
    balances: Arc<StaticBalances>,
) -> Arc<RunContext> {
    Arc::new(RunContext {
        planner: Planner::new(
            SWAP_TOKENS.to_vec(),
            Default::default(),
            balances.clone(),
        ),
        db: ProgressDb::open(state_path),
        executor,
        balances,
        modules: ModulesConfig {
            dmail: true,
            ..Default::default()
        },
    })
}

fn seeded_progress(account_id: u32, plan_len: usize, completed: usize) -> AccountProgress {
    let mut progress = AccountProgress::new(account_id);
    progress.generated_actions = vec![ActionPlan::bare(ActionKind::Dmail); plan_len];
    progress.generated_intervals = vec![Duration::ZERO; plan_len];
    progress.completed_actions = vec![ActionPlan::bare(ActionKind::Dmail); completed];
    progress.action_intervals = vec![Duration::ZERO; completed];
    progress
}

#[tokio::test]
async fn test_resume_attempts_only_the_uncompleted_suffix() {
    let state_path = temp_state_path("resume_suffix");
    let executor = Arc::new(ScriptedExecutor::succeeding());
    let ctx = context(&state_path, executor.clone(), Arc::new(StaticBalances::new()));

    // Account 3: 12 generated steps, 5 already attempted in a prior run.
    ctx.db.save(&seeded_progress(3, 12, 5)).expect("seed state");

    run_account(test_account(3), ctx.clone()).await;

    assert_eq!(executor.calls().len(), 7, "exactly the 7 remaining steps");
    assert!(
        ctx.db.load(3).is_none(),
        "record is cleared once every step was attempted"
    );
    let _ = std::fs::remove_file(&state_path);
}

#[tokio::test]
async fn test_ordinary_failure_still_advances_progress() {
    let state_path = temp_state_path("resume_failure_advances");
    let executor = Arc::new(ScriptedExecutor::failing_once(1, FailureReason::Reverted));
    let ctx = context(&state_path, executor.clone(), Arc::new(StaticBalances::new()));

    ctx.db.save(&seeded_progress(1, 4, 0)).expect("seed state");

    run_account(test_account(1), ctx.clone()).await;

    // A reverted step counts as attempted; the whole plan still finishes.
    assert_eq!(executor.calls().len(), 4);
    assert!(ctx.db.load(1).is_none());
    let _ = std::fs::remove_file(&state_path);
}

#[tokio::test]
async fn test_failed_recovery_abandons_remaining_steps() {
    let state_path = temp_state_path("resume_recovery_abort");
    // Step index 1 fails with insufficient funds; the balance book is empty
    // everywhere, so the top-up finds no source chain and recovery fails.
    let executor = Arc::new(ScriptedExecutor::failing_once(
        1,
        FailureReason::InsufficientFunds,
    ));
    let ctx = context(&state_path, executor.clone(), Arc::new(StaticBalances::new()));

    ctx.db.save(&seeded_progress(2, 6, 0)).expect("seed state");

    run_account(test_account(2), ctx.clone()).await;

    // Steps 0 and 1 were attempted, then the account stopped.
    assert_eq!(executor.calls().len(), 2);
    let record = ctx.db.load(2).expect("record survives an abort");
    assert_eq!(record.completed_steps(), 2);
    let _ = std::fs::remove_file(&state_path);
}

#[tokio::test]
async fn test_successful_recovery_continues_the_plan() {
    let state_path = temp_state_path("resume_recovery_continue");
    let executor = Arc::new(ScriptedExecutor::failing_once(
        2,
        FailureReason::InsufficientFunds,
    ));
    let balances = Arc::new(StaticBalances::new());
    let account = test_account(4);
    // Healthy gas balance on Base: the recovery top-up is a no-op success.
    balances.set(
        Chain::Base,
        account.address,
        WETH,
        U256::from(10u128.pow(18)),
    );
    let ctx = context(&state_path, executor.clone(), balances);

    ctx.db.save(&seeded_progress(4, 5, 0)).expect("seed state");

    run_account(account, ctx.clone()).await;

    assert_eq!(executor.calls().len(), 5, "every step was still attempted");
    assert!(ctx.db.load(4).is_none());
    let _ = std::fs::remove_file(&state_path);
}

#[tokio::test]
async fn test_record_with_missing_intervals_still_resumes() {
    // Older or hand-edited records can carry actions without intervals; the
    // worker must treat the absent waits as zero, not die on the gap. The
    // plan rendering only evaluates under an installed subscriber, so set
    // one up before running.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let state_path = temp_state_path("resume_missing_intervals");
    let executor = Arc::new(ScriptedExecutor::succeeding());
    let ctx = context(&state_path, executor.clone(), Arc::new(StaticBalances::new()));

    let mut progress = AccountProgress::new(6);
    progress.generated_actions = vec![ActionPlan::bare(ActionKind::Dmail); 3];
    progress.completed_actions = vec![ActionPlan::bare(ActionKind::Dmail); 1];
    ctx.db.save(&progress).expect("seed state");

    run_account(test_account(6), ctx.clone()).await;

    assert_eq!(executor.calls().len(), 2, "the 2 remaining steps ran");
    assert!(ctx.db.load(6).is_none(), "record cleared on completion");
    let _ = std::fs::remove_file(&state_path);
}

#[tokio::test]
async fn test_consumed_plan_regenerates_a_fresh_epoch() {
    let state_path = temp_state_path("resume_fresh_epoch");
    let executor = Arc::new(ScriptedExecutor::succeeding());
    let ctx = context(&state_path, executor.clone(), Arc::new(StaticBalances::new()));

    // Prior plan fully consumed: 3 of 3 attempted.
    ctx.db.save(&seeded_progress(5, 3, 3)).expect("seed state");

    run_account(test_account(5), ctx.clone()).await;

    // A fresh dmail-only plan was generated and executed to completion.
    assert!(!executor.calls().is_empty());
    assert!(executor.calls().iter().all(|kind| *kind == ActionKind::Dmail));
    assert!(ctx.db.load(5).is_none());
    let _ = std::fs::remove_file(&state_path);
}
