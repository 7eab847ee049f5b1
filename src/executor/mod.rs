//! Boundary contract for performing one concrete on-chain operation. The
//! engine never constructs or signs transactions itself; it hands a
//! materialized step to an `ActionExecutor` and classifies the outcome.

use crate::account::Account;
use crate::actions::ActionPlan;
use async_trait::async_trait;
use thiserror::Error;

/// Closed set of failure classes. Recovery logic switches on the tag, never
/// on message contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    InsufficientFunds,
    Reverted,
    Rpc,
    Other,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientFunds => "insufficient_funds",
            Self::Reverted => "reverted",
            Self::Rpc => "rpc",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("execution failed ({}): {message}", reason.as_str())]
pub struct ExecutionFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl ExecutionFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn insufficient_funds(message: impl Into<String>) -> Self {
        Self::new(FailureReason::InsufficientFunds, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureReason::Other, message)
    }
}

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(
        &self,
        action: &ActionPlan,
        account: &mut Account,
    ) -> Result<(), ExecutionFailure>;
}

/// Logs every step instead of touching a chain. The default executor for the
/// shipped binary, which runs in dry-run mode only.
pub struct DryRunExecutor;

#[async_trait]
impl ActionExecutor for DryRunExecutor {
    async fn execute(
        &self,
        action: &ActionPlan,
        account: &mut Account,
    ) -> Result<(), ExecutionFailure> {
        tracing::info!(
            "[EXEC] dry-run account={} action={} params={:?}",
            account.account_id,
            action.action_kind,
            action.params
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_tags_are_stable() {
        assert_eq!(
            FailureReason::InsufficientFunds.as_str(),
            "insufficient_funds"
        );
        assert_eq!(FailureReason::Reverted.as_str(), "reverted");
    }

    #[test]
    fn test_failure_display_carries_tag_and_message() {
        let failure = ExecutionFailure::insufficient_funds("balance 0 < required 100");
        let rendered = failure.to_string();
        assert!(rendered.contains("insufficient_funds"));
        assert!(rendered.contains("balance 0"));
    }
}
