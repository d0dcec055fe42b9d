//! Settlement — the deferred pending → terminal step of deposits and
//! withdrawals.
//!
//! DESIGN
//! ======
//! Each pending transaction gets its own tokio task that races the gateway
//! against a cancellation signal. The gateway only decides the outcome; the
//! ledger applies it under its own lock. Swapping the simulated gateway for
//! a real payment backend does not change the store contract.
//!
//! Cancellation uses a `watch` channel held by the [`SettlementHandle`].
//! Dropping the handle is not a cancel: the task keeps waiting on the
//! gateway.

use std::future;
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::error;

use super::transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};
use crate::config::{StoreConfig, clamp_rate};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("settlement declined: {0}")]
    Declined(String),
    #[error("settlement cancelled")]
    Cancelled,
}

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// Decides whether a pending transaction settles. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Resolve once the backend has accepted or declined `tx`.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::Declined`] when the backend refuses.
    async fn settle(&self, tx: &Transaction) -> Result<(), SettlementError>;
}

/// Waits a fixed per-kind delay and always accepts.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    deposit_delay: Duration,
    withdraw_delay: Duration,
}

impl SimulatedGateway {
    #[must_use]
    pub fn new(deposit_delay: Duration, withdraw_delay: Duration) -> Self {
        Self { deposit_delay, withdraw_delay }
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.deposit_settle, config.withdraw_settle)
    }

    #[must_use]
    pub fn delay_for(&self, kind: TransactionKind) -> Duration {
        match kind {
            TransactionKind::Deposit => self.deposit_delay,
            TransactionKind::Withdraw => self.withdraw_delay,
            TransactionKind::Earning | TransactionKind::Reward => Duration::ZERO,
        }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

#[async_trait::async_trait]
impl SettlementGateway for SimulatedGateway {
    async fn settle(&self, tx: &Transaction) -> Result<(), SettlementError> {
        tokio::time::sleep(self.delay_for(tx.kind)).await;
        Ok(())
    }
}

/// Runs an inner gateway, then declines a random share of what it accepted.
#[derive(Debug, Clone, Copy)]
pub struct DecliningGateway<G = SimulatedGateway> {
    inner: G,
    decline_rate: f64,
}

impl<G: SettlementGateway> DecliningGateway<G> {
    /// `decline_rate` is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(inner: G, decline_rate: f64) -> Self {
        Self { inner, decline_rate: clamp_rate(decline_rate) }
    }
}

#[async_trait::async_trait]
impl<G: SettlementGateway> SettlementGateway for DecliningGateway<G> {
    async fn settle(&self, tx: &Transaction) -> Result<(), SettlementError> {
        self.inner.settle(tx).await?;
        let declined = rand::rng().random_bool(self.decline_rate);
        if declined {
            return Err(SettlementError::Declined(format!("{} {} refused by payment processor", tx.kind, tx.id)));
        }
        Ok(())
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Tracks one in-flight settlement.
#[derive(Debug)]
pub struct SettlementHandle {
    id: TransactionId,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<TransactionStatus>,
}

impl SettlementHandle {
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Ask the settlement to stop. The transaction ends `Failed` unless it
    /// already reached a terminal status, in which case this is a no-op.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the terminal status of the transaction.
    pub async fn wait(self) -> TransactionStatus {
        match self.task.await {
            Ok(status) => status,
            Err(e) => {
                error!(tx_id = %self.id, error = %e, "settlement task aborted");
                TransactionStatus::Failed
            }
        }
    }
}

/// Spawn the settlement task for `tx`. `apply` receives the gateway outcome
/// and returns the status the ledger ended up recording.
pub(crate) fn spawn<F>(
    runtime: &Handle,
    gateway: std::sync::Arc<dyn SettlementGateway>,
    tx: Transaction,
    apply: F,
) -> SettlementHandle
where
    F: FnOnce(TransactionId, Result<(), SettlementError>) -> TransactionStatus + Send + 'static,
{
    let id = tx.id;
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let task = runtime.spawn(async move {
        let outcome = tokio::select! {
            result = gateway.settle(&tx) => result,
            () = cancelled(cancel_rx) => Err(SettlementError::Cancelled),
        };
        apply(id, outcome)
    });
    SettlementHandle { id, cancel_tx, task }
}

/// Resolves when a cancel is requested. Never resolves if the handle was
/// dropped without cancelling.
async fn cancelled(mut rx: watch::Receiver<bool>) {
    let closed = rx.wait_for(|requested| *requested).await.is_err();
    if closed {
        future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "settlement_test.rs"]
mod tests;
