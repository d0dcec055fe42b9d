//! Client-side state for the Vitimo video platform.
//!
//! ARCHITECTURE
//! ============
//! Two independent, explicitly constructed stores consumed by presentation
//! code:
//! - [`SessionStore`] holds at most one signed-in [`Identity`].
//! - [`LedgerStore`] holds the wallet balance and transaction history, with
//!   deposits and withdrawals settling in the background.
//!
//! Neither store knows about the other. Both are cheap `Clone` handles over
//! shared state, so one instance can be handed to every consumer.

pub mod config;
pub mod day;
pub mod ledger;
pub mod session;

pub use config::StoreConfig;
pub use ledger::settlement::{DecliningGateway, SettlementError, SettlementGateway, SettlementHandle, SimulatedGateway};
pub use ledger::transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};
pub use ledger::{LedgerError, LedgerEvent, LedgerSnapshot, LedgerStore};
pub use session::{Identity, SessionStore};
