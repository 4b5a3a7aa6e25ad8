//! Integration tests for the Coinchain Token.

#![cfg(test)]

use crate::{CoinchainError, CoinchainToken, CoinchainTokenClient, Role, DECIMALS};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, Env, String,
};

const ONE: i128 = 1_000_000_000_000_000_000;
const INITIAL_SUPPLY: i128 = 200_000_000 * ONE;

struct TestSetup {
    env: Env,
    operator: Address,
    receiver: Address,
    pair: Address,
    client: CoinchainTokenClient<'static>,
}

fn setup_test_env() -> TestSetup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| {
        li.sequence_number = 100;
    });

    let operator = Address::generate(&env);
    let receiver = Address::generate(&env);
    let pair = Address::generate(&env);

    let contract_id = env.register(CoinchainToken, ());
    let client = CoinchainTokenClient::new(&env, &contract_id);
    client.initialize(
        &operator,
        &receiver,
        &String::from_str(&env, "Coinchain"),
        &String::from_str(&env, "CCH"),
        &INITIAL_SUPPLY,
        &pair,
    );

    TestSetup {
        env,
        operator,
        receiver,
        pair,
        client,
    }
}

fn next_ledger(env: &Env) {
    env.ledger().with_mut(|li| {
        li.sequence_number += 1;
    });
}

// Initialization Tests

#[test]
fn test_initialize_sets_metadata_and_roles() {
    let t = setup_test_env();

    assert_eq!(t.client.name(), String::from_str(&t.env, "Coinchain"));
    assert_eq!(t.client.symbol(), String::from_str(&t.env, "CCH"));
    assert_eq!(t.client.decimals(), DECIMALS);
    assert_eq!(t.client.decimals(), 18);
    assert_eq!(t.client.total_supply(), INITIAL_SUPPLY);
    assert_eq!(t.client.balance(&t.receiver), INITIAL_SUPPLY);
    assert_eq!(t.client.pair(), t.pair);

    assert!(t.client.has_role(&Role::DefaultAdmin, &t.receiver));
    assert!(t.client.has_role(&Role::Operator, &t.operator));
    assert!(!t.client.has_role(&Role::Minter, &t.operator));
    assert_eq!(t.client.role_member_count(&Role::DefaultAdmin), 1);
    assert_eq!(t.client.role_member_count(&Role::Operator), 1);
    assert_eq!(t.client.role_member_count(&Role::Minter), 0);
}

#[test]
fn test_cannot_initialize_twice() {
    let t = setup_test_env();

    let result = t.client.try_initialize(
        &t.operator,
        &t.operator,
        &String::from_str(&t.env, "Other"),
        &String::from_str(&t.env, "OTH"),
        &ONE,
        &t.pair,
    );
    assert_eq!(result, Err(Ok(CoinchainError::AlreadyInitialized)));
    assert_eq!(t.client.total_supply(), INITIAL_SUPPLY);
}

// Transfer Tests

#[test]
fn test_transfer_moves_balance() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));

    assert_eq!(t.client.balance(&addr1), 100 * ONE);
    assert_eq!(t.client.balance(&t.receiver), INITIAL_SUPPLY - 100 * ONE);
    assert_eq!(t.client.total_supply(), INITIAL_SUPPLY);
}

#[test]
fn test_transfer_rejects_bad_amounts() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);

    assert_eq!(
        t.client.try_transfer(&addr1, &addr2, &ONE),
        Err(Ok(CoinchainError::InsufficientBalance.into()))
    );
    assert_eq!(
        t.client.try_transfer(&t.receiver, &addr2, &-1),
        Err(Ok(CoinchainError::InvalidAmount.into()))
    );
}

#[test]
fn test_transfer_limit_exceeded() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));

    t.client.set_transfer_limit(&t.operator, &(99 * ONE));
    t.client.set_transfer_limit_enabled(&t.operator, &true);

    assert_eq!(
        t.client.try_transfer(&addr1, &addr2, &(100 * ONE)),
        Err(Ok(CoinchainError::TransferLimitExceeded.into()))
    );
    assert_eq!(t.client.balance(&addr1), 100 * ONE);
}

#[test]
fn test_transfer_within_limit() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));

    t.client.set_transfer_limit(&t.operator, &(101 * ONE));
    t.client.set_transfer_limit_enabled(&t.operator, &true);
    t.client.transfer(&addr1, &addr2, &(100 * ONE));

    assert_eq!(t.client.balance(&addr2), 100 * ONE);
}

#[test]
fn test_transfer_limit_disabled() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));

    t.client.set_transfer_limit(&t.operator, &(99 * ONE));
    t.client.set_transfer_limit_enabled(&t.operator, &false);
    t.client.transfer(&addr1, &addr2, &(100 * ONE));

    assert_eq!(t.client.balance(&addr2), 100 * ONE);
    let limit = t.client.get_transfer_limit();
    assert_eq!(limit.amount, 99 * ONE);
    assert!(!limit.enabled);
}

#[test]
fn test_transfer_limit_requires_operator() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    assert_eq!(
        t.client.try_set_transfer_limit(&addr1, &ONE),
        Err(Ok(CoinchainError::Unauthorized))
    );
    assert_eq!(
        t.client.try_set_transfer_limit_enabled(&t.receiver, &true),
        Err(Ok(CoinchainError::Unauthorized))
    );
}

#[test]
fn test_transfer_limit_applies_to_transfer_from() {
    let t = setup_test_env();
    let spender = Address::generate(&t.env);
    let addr1 = Address::generate(&t.env);
    t.client
        .approve(&t.receiver, &spender, &(10 * ONE), &(t.env.ledger().sequence() + 10));

    t.client.set_transfer_limit(&t.operator, &ONE);
    t.client.set_transfer_limit_enabled(&t.operator, &true);

    assert_eq!(
        t.client
            .try_transfer_from(&spender, &t.receiver, &addr1, &(2 * ONE)),
        Err(Ok(CoinchainError::TransferLimitExceeded.into()))
    );
    t.client.transfer_from(&spender, &t.receiver, &addr1, &ONE);
    assert_eq!(t.client.balance(&addr1), ONE);
    assert_eq!(t.client.allowance(&t.receiver, &spender), 9 * ONE);
}

// Launch Guard Tests

#[test]
fn test_transfer_in_liquidity_ledger_is_blocked() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));
    next_ledger(&t.env);

    t.client.transfer(&t.receiver, &t.pair, &(100_000 * ONE));
    assert_eq!(
        t.client.try_transfer(&addr1, &addr2, &(100 * ONE)),
        Err(Ok(CoinchainError::LaunchWindowActive.into()))
    );

    // More liquidity in the same ledger is still allowed.
    t.client.transfer(&t.receiver, &t.pair, &ONE);
    assert_eq!(t.client.balance(&t.pair), 100_001 * ONE);
}

#[test]
fn test_transfer_after_liquidity_ledger_is_allowed() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));
    next_ledger(&t.env);

    t.client.transfer(&t.receiver, &t.pair, &(100_000 * ONE));
    next_ledger(&t.env);
    t.client.transfer(&addr1, &addr2, &(100 * ONE));

    assert_eq!(t.client.balance(&addr2), 100 * ONE);
}

// Mint Tests

#[test]
fn test_mint_requires_minter_role() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    assert_eq!(
        t.client.try_mint(&addr1, &addr1, &(1_000_000 * ONE)),
        Err(Ok(CoinchainError::Unauthorized))
    );
    assert!(t.client.has_role(&Role::Operator, &t.operator));
    assert_eq!(
        t.client.try_mint(&t.operator, &addr1, &(1_000_000 * ONE)),
        Err(Ok(CoinchainError::Unauthorized))
    );
}

#[test]
fn test_mint_to_address() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    t.client.grant_role(&t.receiver, &Role::Minter, &addr1);
    t.client.mint(&addr1, &addr1, &(1_000_000 * ONE));

    assert_eq!(t.client.balance(&addr1), 1_000_000 * ONE);
    assert_eq!(t.client.total_supply(), INITIAL_SUPPLY + 1_000_000 * ONE);
}

#[test]
fn test_mint_after_role_revoked() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    t.client.grant_role(&t.receiver, &Role::Minter, &addr1);
    t.client.mint(&addr1, &addr1, &(1_000_000 * ONE));
    t.client.revoke_role(&t.receiver, &Role::Minter, &addr1);

    assert_eq!(
        t.client.try_mint(&addr1, &addr1, &(1_000_000 * ONE)),
        Err(Ok(CoinchainError::Unauthorized))
    );
    assert_eq!(t.client.balance(&addr1), 1_000_000 * ONE);
}

// Burn Tests

#[test]
fn test_burn_own_tokens() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));

    t.client.burn(&addr1, &(100 * ONE));

    assert_eq!(t.client.balance(&addr1), 0);
    assert_eq!(t.client.total_supply(), INITIAL_SUPPLY - 100 * ONE);
}

#[test]
fn test_burn_from_requires_allowance() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    let addr2 = Address::generate(&t.env);
    t.client.transfer(&t.receiver, &addr1, &(100 * ONE));

    assert_eq!(
        t.client.try_burn_from(&addr2, &addr1, &(100 * ONE)),
        Err(Ok(CoinchainError::InsufficientAllowance.into()))
    );

    t.client
        .approve(&addr1, &addr2, &(60 * ONE), &(t.env.ledger().sequence() + 10));
    t.client.burn_from(&addr2, &addr1, &(40 * ONE));

    assert_eq!(t.client.balance(&addr1), 60 * ONE);
    assert_eq!(t.client.allowance(&addr1, &addr2), 20 * ONE);
    assert_eq!(t.client.total_supply(), INITIAL_SUPPLY - 40 * ONE);
}

// Allowance Tests

#[test]
fn test_allowance_expires() {
    let t = setup_test_env();
    let spender = Address::generate(&t.env);
    let expiration = t.env.ledger().sequence() + 5;

    t.client.approve(&t.receiver, &spender, &ONE, &expiration);
    assert_eq!(t.client.allowance(&t.receiver, &spender), ONE);

    t.env.ledger().with_mut(|li| {
        li.sequence_number = expiration + 1;
    });
    assert_eq!(t.client.allowance(&t.receiver, &spender), 0);
    assert_eq!(
        t.client
            .try_transfer_from(&spender, &t.receiver, &spender, &ONE),
        Err(Ok(CoinchainError::InsufficientAllowance.into()))
    );
}

#[test]
fn test_approve_with_past_expiration_fails() {
    let t = setup_test_env();
    let spender = Address::generate(&t.env);
    let past = t.env.ledger().sequence() - 1;

    assert_eq!(
        t.client.try_approve(&t.receiver, &spender, &ONE, &past),
        Err(Ok(CoinchainError::InvalidExpiration.into()))
    );
    // Clearing an allowance does not need a live expiration.
    t.client.approve(&t.receiver, &spender, &0, &past);
    assert_eq!(t.client.allowance(&t.receiver, &spender), 0);
}

// Role Tests

#[test]
fn test_role_grants_require_default_admin() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    assert_eq!(
        t.client.try_grant_minter_role(&t.operator, &addr1),
        Err(Ok(CoinchainError::Unauthorized))
    );
    assert_eq!(
        t.client.try_grant_operator_role(&t.operator, &addr1),
        Err(Ok(CoinchainError::Unauthorized))
    );
}

#[test]
fn test_grant_and_revoke_minter_role() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    t.client.grant_minter_role(&t.receiver, &addr1);
    assert_eq!(t.client.role_member_count(&Role::Minter), 1);
    assert!(t.client.has_role(&Role::Minter, &addr1));

    t.client.revoke_minter_role(&t.receiver, &addr1);
    assert_eq!(t.client.role_member_count(&Role::Minter), 0);
    assert!(!t.client.has_role(&Role::Minter, &addr1));
}

#[test]
fn test_grant_and_revoke_operator_role() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);

    t.client.grant_operator_role(&t.receiver, &addr1);
    assert_eq!(t.client.role_member_count(&Role::Operator), 2);
    assert!(t.client.has_role(&Role::Operator, &addr1));

    // Granting twice does not double count.
    t.client.grant_operator_role(&t.receiver, &addr1);
    assert_eq!(t.client.role_member_count(&Role::Operator), 2);

    t.client.revoke_operator_role(&t.receiver, &addr1);
    assert_eq!(t.client.role_member_count(&Role::Operator), 1);
    assert!(!t.client.has_role(&Role::Operator, &addr1));
}

#[test]
fn test_revoke_requires_default_admin() {
    let t = setup_test_env();
    let addr1 = Address::generate(&t.env);
    t.client.grant_minter_role(&t.receiver, &addr1);
    t.client.grant_operator_role(&t.receiver, &addr1);

    assert_eq!(
        t.client.try_revoke_minter_role(&t.operator, &addr1),
        Err(Ok(CoinchainError::Unauthorized))
    );
    assert_eq!(
        t.client.try_revoke_operator_role(&t.operator, &addr1),
        Err(Ok(CoinchainError::Unauthorized))
    );
    assert!(t.client.has_role(&Role::Minter, &addr1));
    assert_eq!(t.client.role_member_count(&Role::Operator), 2);
}
