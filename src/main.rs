//! Scripted walkthrough of the session and ledger stores.
//!
//! Signs in, attempts an overdraft, makes a deposit, waits for settlement
//! and prints the final ledger as JSON. Timing comes from `VITIMO_*`
//! environment variables (or `.env`).

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vitimo_state::{LedgerStore, SessionStore, StoreConfig};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StoreConfig::from_env();
    let session = SessionStore::from_config(&config);
    let ledger = LedgerStore::from_config(&config);

    if !session.login("user@vitimo.com", "user").await {
        error!("demo login failed");
        return;
    }
    info!(admin = session.is_admin(), balance = ledger.balance(), "signed in");

    if !ledger.withdraw(300_000, "IBAN-1") {
        warn!(balance = ledger.balance(), "overdraft refused");
    }

    let handle = match ledger.schedule_deposit(50_000) {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "deposit refused");
            return;
        }
    };
    info!(tx_id = %handle.id(), pending = ledger.pending_count(), balance = ledger.balance(), "deposit submitted");
    let status = handle.wait().await;
    info!(?status, balance = ledger.balance(), "deposit finished");

    ledger.add_reward(5_000, "پاداش ورود روزانه");

    match serde_json::to_string_pretty(&ledger.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "snapshot serialization failed"),
    }

    session.logout();
}
