use std::sync::Arc;

use time::macros::date;

use super::*;

fn pending(kind: TransactionKind) -> Transaction {
    Transaction::new(TransactionId(1), kind, 500, "test".into(), date!(2024 - 01 - 01))
}

// =============================================================================
// SimulatedGateway
// =============================================================================

#[test]
fn simulated_default_delays() {
    let gw = SimulatedGateway::default();
    assert_eq!(gw.delay_for(TransactionKind::Deposit), Duration::from_secs(2));
    assert_eq!(gw.delay_for(TransactionKind::Withdraw), Duration::from_secs(3));
    assert_eq!(gw.delay_for(TransactionKind::Earning), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn simulated_waits_its_delay_then_accepts() {
    let gw = SimulatedGateway::new(Duration::from_millis(40), Duration::from_millis(90));
    let started = tokio::time::Instant::now();
    assert!(gw.settle(&pending(TransactionKind::Withdraw)).await.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(90));
}

// =============================================================================
// DecliningGateway
// =============================================================================

#[tokio::test(start_paused = true)]
async fn declining_with_zero_rate_accepts() {
    let gw = DecliningGateway::new(SimulatedGateway::default(), 0.0);
    assert!(gw.settle(&pending(TransactionKind::Deposit)).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn declining_with_full_rate_declines() {
    let gw = DecliningGateway::new(SimulatedGateway::default(), 1.0);
    let err = gw.settle(&pending(TransactionKind::Deposit)).await.unwrap_err();
    assert!(matches!(err, SettlementError::Declined(_)));
    assert!(err.to_string().contains("deposit"));
}

#[tokio::test(start_paused = true)]
async fn declining_clamps_out_of_range_rate() {
    let gw = DecliningGateway::new(SimulatedGateway::default(), 3.0);
    assert!(gw.settle(&pending(TransactionKind::Withdraw)).await.is_err());
}

// =============================================================================
// spawn / SettlementHandle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn handle_reports_gateway_outcome() {
    let gw: Arc<dyn SettlementGateway> = Arc::new(SimulatedGateway::default());
    let handle = spawn(&Handle::current(), gw, pending(TransactionKind::Deposit), |_, outcome| {
        if outcome.is_ok() { TransactionStatus::Completed } else { TransactionStatus::Failed }
    });
    assert_eq!(handle.id(), TransactionId(1));
    assert_eq!(handle.wait().await, TransactionStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn cancel_short_circuits_the_gateway() {
    let gw: Arc<dyn SettlementGateway> = Arc::new(SimulatedGateway::default());
    let handle = spawn(&Handle::current(), gw, pending(TransactionKind::Withdraw), |_, outcome| {
        assert_eq!(outcome, Err(SettlementError::Cancelled));
        TransactionStatus::Failed
    });
    let started = tokio::time::Instant::now();
    handle.cancel();
    assert_eq!(handle.wait().await, TransactionStatus::Failed);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_does_not_cancel() {
    let gw: Arc<dyn SettlementGateway> = Arc::new(SimulatedGateway::default());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(&Handle::current(), gw, pending(TransactionKind::Deposit), move |_, outcome| {
        let _ = done_tx.send(outcome);
        TransactionStatus::Completed
    });
    drop(handle);
    assert_eq!(done_rx.await.unwrap(), Ok(()));
}
