use std::collections::HashMap;

use super::*;

// =============================================================================
// defaults
// =============================================================================

#[test]
fn default_matches_fixed_front_end_delays() {
    let cfg = StoreConfig::default();
    assert_eq!(cfg.login_delay, Duration::from_secs(1));
    assert_eq!(cfg.deposit_settle, Duration::from_secs(2));
    assert_eq!(cfg.withdraw_settle, Duration::from_secs(3));
    assert!(cfg.decline_rate.abs() < f64::EPSILON);
}

// =============================================================================
// parse_or
// =============================================================================

#[test]
fn parse_or_trims_whitespace() {
    assert_eq!(parse_or(Some(" 250 "), 42_u64), 250);
}

#[test]
fn parse_or_malformed_uses_default() {
    assert_eq!(parse_or(Some("fast"), 42_u64), 42);
    assert_eq!(parse_or(Some("-5"), 42_u64), 42);
}

#[test]
fn parse_or_missing_uses_default() {
    assert_eq!(parse_or::<u64>(None, 42), 42);
}

// =============================================================================
// from_lookup
// =============================================================================

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_applies_overrides() {
    let cfg = StoreConfig::from_lookup(lookup_from(&[
        ("VITIMO_LOGIN_DELAY_MS", "10"),
        ("VITIMO_DEPOSIT_SETTLE_MS", " 20"),
        ("VITIMO_WITHDRAW_SETTLE_MS", "30"),
        ("VITIMO_DECLINE_RATE", "0.5"),
    ]));
    assert_eq!(cfg.login_delay, Duration::from_millis(10));
    assert_eq!(cfg.deposit_settle, Duration::from_millis(20));
    assert_eq!(cfg.withdraw_settle, Duration::from_millis(30));
    assert!((cfg.decline_rate - 0.5).abs() < f64::EPSILON);
}

#[test]
fn from_lookup_with_nothing_set_is_default() {
    assert_eq!(StoreConfig::from_lookup(|_| None), StoreConfig::default());
}

#[test]
fn from_lookup_malformed_value_falls_back_per_key() {
    let cfg = StoreConfig::from_lookup(lookup_from(&[
        ("VITIMO_LOGIN_DELAY_MS", "soon"),
        ("VITIMO_DEPOSIT_SETTLE_MS", "500"),
    ]));
    assert_eq!(cfg.login_delay, Duration::from_secs(1));
    assert_eq!(cfg.deposit_settle, Duration::from_millis(500));
    assert_eq!(cfg.withdraw_settle, Duration::from_secs(3));
}

#[test]
fn from_lookup_clamps_decline_rate() {
    let cfg = StoreConfig::from_lookup(lookup_from(&[("VITIMO_DECLINE_RATE", "4")]));
    assert!((cfg.decline_rate - 1.0).abs() < f64::EPSILON);
}

// =============================================================================
// clamp_rate
// =============================================================================

#[test]
fn clamp_rate_keeps_values_in_range() {
    assert!((clamp_rate(0.25) - 0.25).abs() < f64::EPSILON);
}

#[test]
fn clamp_rate_caps_above_one() {
    assert!((clamp_rate(7.5) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn clamp_rate_floors_negative() {
    assert!(clamp_rate(-0.3).abs() < f64::EPSILON);
}

#[test]
fn clamp_rate_nan_is_zero() {
    assert!(clamp_rate(f64::NAN).abs() < f64::EPSILON);
}
