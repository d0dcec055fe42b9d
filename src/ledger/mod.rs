//! Ledger store — wallet balance and transaction history.
//!
//! DESIGN
//! ======
//! Balance and history live behind one mutex so every mutation touches
//! both atomically. The lock is never held across `.await`; settlement
//! tasks re-enter through [`LedgerStore::apply_settlement`] and look the
//! transaction up by id.
//!
//! Balance is a running total, not a fold over history. The two effects
//! are deliberately asymmetric:
//! - deposit credits only when it settles,
//! - withdraw debits at creation and settlement just flips the status.
//!
//! A failed settlement leaves the balance as if the transaction had never
//! been attempted: a failed deposit was never credited, and a failed
//! withdrawal is refunded.
//!
//! History is newest first. Settlement changes status in place and never
//! moves an entry.

pub mod settlement;
pub mod transaction;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use time::macros::date;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::day;
use settlement::{DecliningGateway, SettlementError, SettlementGateway, SettlementHandle, SimulatedGateway};
use transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};

const SEED_BALANCE: u64 = 245_000;
const DEPOSIT_DESCRIPTION: &str = "واریز از کارت بانکی";
const EVENT_CAPACITY: usize = 64;

fn withdraw_description(bank_account: &str) -> String {
    format!("برداشت به حساب {bank_account}")
}

// =============================================================================
// ERRORS & EVENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },
    #[error("no tokio runtime available to run settlement")]
    NoRuntime,
}

/// Change notification. Carries only the id; read the store for details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEvent {
    Recorded(TransactionId),
    Settled(TransactionId),
    Failed(TransactionId),
}

/// Point-in-time copy of the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub balance: u64,
    pub transactions: Vec<Transaction>,
}

// =============================================================================
// LEDGER STORE
// =============================================================================

struct LedgerInner {
    balance: u64,
    /// Newest first.
    transactions: VecDeque<Transaction>,
    next_id: u64,
}

/// Handle to a wallet ledger. Clones share the same balance and history.
#[derive(Clone)]
pub struct LedgerStore {
    inner: Arc<Mutex<LedgerInner>>,
    gateway: Arc<dyn SettlementGateway>,
    events: broadcast::Sender<LedgerEvent>,
}

impl LedgerStore {
    /// Ledger pre-loaded with the demo wallet: 245000 and four completed
    /// transactions.
    #[must_use]
    pub fn new(gateway: Arc<dyn SettlementGateway>) -> Self {
        Self::with_history(SEED_BALANCE, seed_transactions(), gateway)
    }

    /// Ledger with the given balance and no history.
    #[must_use]
    pub fn empty(balance: u64, gateway: Arc<dyn SettlementGateway>) -> Self {
        Self::with_history(balance, Vec::new(), gateway)
    }

    /// Seeded ledger whose gateway follows `config`. A non-zero decline
    /// rate wraps the simulated gateway in a [`DecliningGateway`].
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        let simulated = SimulatedGateway::from_config(config);
        let gateway: Arc<dyn SettlementGateway> = if config.decline_rate > 0.0 {
            Arc::new(DecliningGateway::new(simulated, config.decline_rate))
        } else {
            Arc::new(simulated)
        };
        Self::new(gateway)
    }

    /// `transactions` must already be newest first.
    fn with_history(balance: u64, transactions: Vec<Transaction>, gateway: Arc<dyn SettlementGateway>) -> Self {
        let next_id = transactions.iter().map(|t| t.id.0).max().unwrap_or(0) + 1;
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(LedgerInner { balance, transactions: transactions.into(), next_id })),
            gateway,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: LedgerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn balance(&self) -> u64 {
        self.lock().balance
    }

    /// History, newest first.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.iter().cloned().collect()
    }

    #[must_use]
    pub fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.lock().transactions.iter().find(|t| t.id == id).cloned()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock()
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
            .count()
    }

    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.lock();
        LedgerSnapshot { balance: inner.balance, transactions: inner.transactions.iter().cloned().collect() }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // Deposits & withdrawals
    // -------------------------------------------------------------------------

    /// Record a pending deposit and settle it in the background.
    ///
    /// Returns `true` once the deposit is recorded; the balance moves only
    /// when settlement completes. Returns `false` with no state change when
    /// there is no tokio runtime to settle on.
    pub fn deposit(&self, amount: u64) -> bool {
        self.schedule_deposit(amount).is_ok()
    }

    /// Like [`deposit`](Self::deposit) but returns the settlement handle.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoRuntime`] when called outside a tokio
    /// runtime. Nothing is recorded in that case.
    pub fn schedule_deposit(&self, amount: u64) -> Result<SettlementHandle, LedgerError> {
        let runtime = current_runtime()?;
        let tx = {
            let mut inner = self.lock();
            let tx = record(&mut inner, TransactionKind::Deposit, amount, DEPOSIT_DESCRIPTION.into());
            info!(tx_id = %tx.id, amount, balance = inner.balance, "deposit recorded");
            tx
        };
        self.emit(LedgerEvent::Recorded(tx.id));
        Ok(self.spawn_settlement(&runtime, tx))
    }

    /// Record a pending withdrawal to `bank_account`, debiting immediately.
    ///
    /// Returns `false` with no state change when `amount` exceeds the
    /// balance or there is no tokio runtime to settle on.
    pub fn withdraw(&self, amount: u64, bank_account: &str) -> bool {
        self.schedule_withdraw(amount, bank_account).is_ok()
    }

    /// Like [`withdraw`](Self::withdraw) but returns the settlement handle.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] when `amount` exceeds the
    /// current balance, or [`LedgerError::NoRuntime`] when called outside a
    /// tokio runtime. Nothing is recorded in either case.
    pub fn schedule_withdraw(&self, amount: u64, bank_account: &str) -> Result<SettlementHandle, LedgerError> {
        let runtime = current_runtime()?;
        let tx = {
            let mut inner = self.lock();
            if amount > inner.balance {
                warn!(amount, balance = inner.balance, "withdraw rejected: insufficient funds");
                return Err(LedgerError::InsufficientFunds { requested: amount, available: inner.balance });
            }
            inner.balance -= amount;
            let tx = record(&mut inner, TransactionKind::Withdraw, amount, withdraw_description(bank_account));
            info!(tx_id = %tx.id, amount, balance = inner.balance, "withdraw recorded");
            tx
        };
        self.emit(LedgerEvent::Recorded(tx.id));
        Ok(self.spawn_settlement(&runtime, tx))
    }

    fn spawn_settlement(&self, runtime: &Handle, tx: Transaction) -> SettlementHandle {
        let store = self.clone();
        settlement::spawn(runtime, Arc::clone(&self.gateway), tx, move |id, outcome| {
            store.apply_settlement(id, outcome)
        })
    }

    /// Apply a settlement outcome to transaction `id` and return its final
    /// status. Already-terminal transactions are left untouched.
    fn apply_settlement(&self, id: TransactionId, outcome: Result<(), SettlementError>) -> TransactionStatus {
        let (status, event) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            let Some(tx) = inner.transactions.iter_mut().find(|t| t.id == id) else {
                warn!(tx_id = %id, "settlement for unknown transaction");
                return TransactionStatus::Failed;
            };

            match outcome {
                Ok(()) => {
                    if !tx.finish(TransactionStatus::Completed) {
                        return tx.status;
                    }
                    if tx.kind == TransactionKind::Deposit {
                        inner.balance = inner.balance.saturating_add(tx.amount);
                    }
                    info!(tx_id = %id, kind = %tx.kind, balance = inner.balance, "settlement completed");
                    (TransactionStatus::Completed, LedgerEvent::Settled(id))
                }
                Err(e) => {
                    if !tx.finish(TransactionStatus::Failed) {
                        return tx.status;
                    }
                    if tx.kind == TransactionKind::Withdraw {
                        inner.balance = inner.balance.saturating_add(tx.amount);
                    }
                    warn!(tx_id = %id, kind = %tx.kind, error = %e, balance = inner.balance, "settlement failed");
                    (TransactionStatus::Failed, LedgerEvent::Failed(id))
                }
            }
        };
        self.emit(event);
        status
    }

    // -------------------------------------------------------------------------
    // Immediate credits
    // -------------------------------------------------------------------------

    /// Credit a completed earning. Balance and history update together.
    pub fn add_earning(&self, amount: u64, description: &str) {
        self.credit(TransactionKind::Earning, amount, description);
    }

    /// Credit a completed reward. Balance and history update together.
    pub fn add_reward(&self, amount: u64, description: &str) {
        self.credit(TransactionKind::Reward, amount, description);
    }

    fn credit(&self, kind: TransactionKind, amount: u64, description: &str) {
        let id = {
            let mut inner = self.lock();
            let tx = record(&mut inner, kind, amount, description.into());
            inner.balance = inner.balance.saturating_add(amount);
            info!(tx_id = %tx.id, %kind, amount, balance = inner.balance, "credit recorded");
            tx.id
        };
        self.emit(LedgerEvent::Recorded(id));
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Settlement needs a runtime; check before touching any state.
fn current_runtime() -> Result<Handle, LedgerError> {
    Handle::try_current().map_err(|_| {
        warn!("settlement requested outside a tokio runtime");
        LedgerError::NoRuntime
    })
}

/// Mint an id, build the transaction dated today and push it to the head
/// of history. Returns a copy for the caller.
fn record(inner: &mut LedgerInner, kind: TransactionKind, amount: u64, description: String) -> Transaction {
    let id = TransactionId(inner.next_id);
    inner.next_id += 1;
    let tx = Transaction::new(id, kind, amount, description, day::today());
    inner.transactions.push_front(tx.clone());
    tx
}

fn seed_transactions() -> Vec<Transaction> {
    let completed = |id, kind, amount, description: &str, date| {
        let mut tx = Transaction::new(TransactionId(id), kind, amount, description.into(), date);
        tx.status = TransactionStatus::Completed;
        tx
    };
    vec![
        completed(1, TransactionKind::Earning, 50_000, "درآمد از ویدیو \"آموزش React\"", date!(2024 - 01 - 15)),
        completed(2, TransactionKind::Reward, 25_000, "پاداش ورود روزانه", date!(2024 - 01 - 14)),
        completed(3, TransactionKind::Deposit, 100_000, DEPOSIT_DESCRIPTION, date!(2024 - 01 - 13)),
        completed(4, TransactionKind::Withdraw, 75_000, "برداشت به حساب بانکی", date!(2024 - 01 - 12)),
    ]
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
