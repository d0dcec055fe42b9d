//! Ledger transaction records.
//!
//! Deposits and withdrawals are born `Pending` and move exactly once to a
//! terminal status. Earnings and rewards are born `Completed`.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

/// Per-store, monotonically increasing transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub(crate) u64);

impl TransactionId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Earning,
    Reward,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Earning => "earning",
            Self::Reward => "reward",
        }
    }

    /// Whether transactions of this kind go through deferred settlement.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdraw)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub amount: u64,
    pub description: String,
    #[serde(with = "crate::day")]
    pub date: Date,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Build a transaction in the status its kind starts in.
    #[must_use]
    pub(crate) fn new(id: TransactionId, kind: TransactionKind, amount: u64, description: String, date: Date) -> Self {
        let status = if kind.is_settled() { TransactionStatus::Pending } else { TransactionStatus::Completed };
        Self { id, kind, amount, description, date, status }
    }

    /// Move a pending transaction to `status`.
    ///
    /// Returns `false` without touching anything if the transaction is
    /// already terminal or `status` is not terminal.
    pub(crate) fn finish(&mut self, status: TransactionStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
