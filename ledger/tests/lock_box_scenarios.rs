//! End-to-end lock box flows
//!
//! Issuance credits the beneficiary at once; the locked part only becomes
//! transferable once the clock reaches the lock's maturity.

#![allow(clippy::unwrap_used)]

use dmtr_ledger::config::TokenConfig;
use dmtr_ledger::time::{ManualClock, TimestampSeconds, SECONDS_PER_DAY};
use dmtr_ledger::{
    to_base_units, Address, MemoryLedger, Role, TokenError, TokenEvent, TokenFacade,
};
use primitive_types::U256;

const OWNER: Address = [1u8; 32];
const ACCOUNT_A: Address = [0xAA; 32];
const ACCOUNT_B: Address = [0xBB; 32];
const START: TimestampSeconds = 1_700_000_000;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn deploy() -> TokenFacade<MemoryLedger, ManualClock> {
    init_logger();
    TokenFacade::new(TokenConfig::default(), OWNER, ManualClock::new(START)).unwrap()
}

fn tokens(whole: u64) -> U256 {
    to_base_units(whole)
}

/// Mint 1000 to the owner, move 150 to A and lock 200 for A over four days
fn scenario_a() -> TokenFacade<MemoryLedger, ManualClock> {
    let mut token = deploy();
    token.mint(&OWNER, &OWNER, tokens(1000)).unwrap();
    token.transfer(&OWNER, &ACCOUNT_A, tokens(150)).unwrap();
    token
        .issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(200), START + 4 * SECONDS_PER_DAY)
        .unwrap();
    token
}

#[test]
fn test_issue_credits_and_locks() {
    let token = scenario_a();

    assert_eq!(token.balance_of(&ACCOUNT_A), tokens(350));
    assert_eq!(token.get_locked_balance(&ACCOUNT_A, &ACCOUNT_A), Ok(tokens(200)));
    assert_eq!(token.get_released_balance(&ACCOUNT_A, &ACCOUNT_A), Ok(tokens(150)));
    assert_eq!(token.get_total_lock_box_balance(&OWNER), Ok(tokens(200)));
    assert_eq!(token.get_lock_box_count(&OWNER), Ok(1));
    assert_eq!(token.total_supply(), tokens(1200));
}

#[test]
fn test_locked_part_cannot_leave() {
    let mut token = scenario_a();

    assert_eq!(token.transfer(&ACCOUNT_A, &ACCOUNT_B, tokens(150)), Ok(true));
    assert_eq!(
        token.transfer(&ACCOUNT_A, &ACCOUNT_B, tokens(150)),
        Err(TokenError::InsufficientSpendableBalance {
            available: U256::zero(),
            required: tokens(150),
        })
    );

    assert_eq!(token.balance_of(&ACCOUNT_A), tokens(200));
    assert_eq!(token.balance_of(&ACCOUNT_B), tokens(150));
    assert_eq!(token.get_locked_balance(&ACCOUNT_A, &ACCOUNT_A), Ok(tokens(200)));
}

#[test]
fn test_matured_lock_releases() {
    let mut token = scenario_a();
    token.transfer(&ACCOUNT_A, &ACCOUNT_B, tokens(150)).unwrap();

    token.clock().advance_days(5);

    assert_eq!(token.get_locked_balance(&ACCOUNT_A, &ACCOUNT_A), Ok(U256::zero()));
    assert_eq!(token.get_total_lock_box_balance(&OWNER), Ok(U256::zero()));
    assert_eq!(token.transfer(&ACCOUNT_A, &ACCOUNT_B, tokens(200)), Ok(true));
    assert_eq!(token.balance_of(&ACCOUNT_A), U256::zero());
    assert_eq!(token.balance_of(&ACCOUNT_B), tokens(350));

    // Matured lock boxes stay on record
    assert_eq!(token.get_lock_box_count(&OWNER), Ok(1));
}

#[test]
fn test_burn_respects_locks() {
    let mut token = scenario_a();
    token.grant_role(&OWNER, Role::Burner, &ACCOUNT_A).unwrap();

    assert_eq!(
        token.burn(&ACCOUNT_A, tokens(151)),
        Err(TokenError::InsufficientSpendableBalance {
            available: tokens(150),
            required: tokens(151),
        })
    );
    token.burn(&ACCOUNT_A, tokens(150)).unwrap();
    assert_eq!(token.total_supply(), tokens(1050));

    // burn_from checks the locks of the debited account, not the caller
    token.approve(&ACCOUNT_A, &OWNER, tokens(200)).unwrap();
    assert!(matches!(
        token.burn_from(&OWNER, &ACCOUNT_A, tokens(1)),
        Err(TokenError::InsufficientSpendableBalance { .. })
    ));
}

fn assert_released(token: &TokenFacade<MemoryLedger, ManualClock>, expected: u64) {
    assert_eq!(
        token.get_released_balance(&ACCOUNT_A, &ACCOUNT_A),
        Ok(tokens(expected))
    );
}

fn stepwise_release(maturities: [(u64, TimestampSeconds); 2]) {
    let mut token = deploy();
    for (amount, maturity) in maturities {
        token
            .issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(amount), maturity)
            .unwrap();
    }

    let first = START + 100;
    let second = START + 200;

    assert_released(&token, 0);
    token.clock().set(first - 1).unwrap();
    assert_released(&token, 0);
    token.clock().set(first).unwrap();
    assert_released(&token, 10);
    token.clock().set(second - 1).unwrap();
    assert_released(&token, 10);
    token.clock().set(second).unwrap();
    assert_released(&token, 30);
    assert_eq!(token.get_next_maturity(&ACCOUNT_A, &ACCOUNT_A), Ok(None));
}

#[test]
fn test_overlapping_locks_release_stepwise() {
    stepwise_release([(10, START + 100), (20, START + 200)]);
    stepwise_release([(20, START + 200), (10, START + 100)]);
}

#[test]
fn test_past_maturity_is_released_immediately() {
    let mut token = deploy();
    token
        .issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(5), START - 1)
        .unwrap();
    token
        .issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(7), START)
        .unwrap();

    assert_eq!(token.get_locked_balance(&ACCOUNT_A, &ACCOUNT_A), Ok(U256::zero()));
    assert_eq!(token.transfer(&ACCOUNT_A, &ACCOUNT_B, tokens(12)), Ok(true));
}

#[test]
fn test_issue_is_gated() {
    let mut token = deploy();

    assert_eq!(
        token.issue_locked_tokens(&ACCOUNT_B, &ACCOUNT_A, tokens(1), START + 1),
        Err(TokenError::NotAuthorized {
            role: Role::Issuer,
            account: ACCOUNT_B,
        })
    );
    assert_eq!(
        token.issue_locked_tokens(&OWNER, &ACCOUNT_A, U256::zero(), START + 1),
        Err(TokenError::ZeroAmount)
    );

    token.pause(&OWNER).unwrap();
    assert_eq!(
        token.issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(1), START + 1),
        Err(TokenError::Paused)
    );
    // Authorization is reported before the pause
    assert!(matches!(
        token.issue_locked_tokens(&ACCOUNT_B, &ACCOUNT_A, tokens(1), START + 1),
        Err(TokenError::NotAuthorized { .. })
    ));

    assert_eq!(token.get_lock_box_count(&OWNER), Ok(0));
    assert_eq!(token.total_supply(), U256::zero());
}

#[test]
fn test_lock_box_listing() {
    let mut token = deploy();
    for day in 1..=5u64 {
        token
            .issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(day), START + day * SECONDS_PER_DAY)
            .unwrap();
    }
    token
        .issue_locked_tokens(&OWNER, &ACCOUNT_B, tokens(9), START + SECONDS_PER_DAY)
        .unwrap();

    assert_eq!(
        token.get_lock_box_ids(&ACCOUNT_A, &ACCOUNT_A),
        Ok(vec![0, 1, 2, 3, 4])
    );
    let page = token.get_lock_boxes(&ACCOUNT_A, &ACCOUNT_A, 1, 2).unwrap();
    assert_eq!(page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(page[0].issuer, OWNER);

    token.clock().advance_days(2);
    assert_eq!(
        token.get_next_maturity(&ACCOUNT_A, &ACCOUNT_A),
        Ok(Some(START + 3 * SECONDS_PER_DAY))
    );
    assert_eq!(token.get_locked_balance(&OWNER, &ACCOUNT_A), Ok(tokens(12)));
    assert_eq!(token.get_total_lock_box_balance(&OWNER), Ok(tokens(12)));
    assert_eq!(token.get_lock_box_count(&OWNER), Ok(6));
}

#[test]
fn test_issue_events() {
    let mut token = deploy();
    token
        .issue_locked_tokens(&OWNER, &ACCOUNT_A, tokens(3), START + 60)
        .unwrap();

    let names: Vec<_> = token.events().iter().map(TokenEvent::name).collect();
    assert_eq!(names, vec!["Transfer", "LogIssueLockedTokens"]);
}
