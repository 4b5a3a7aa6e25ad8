//! Balances, allowances, supply and the transfer rules applied to every move.

use soroban_sdk::{panic_with_error, Address, Env};

use crate::types::{
    AllowanceKey, AllowanceValue, DataKey, TransferLimit, BALANCE_BUMP_AMOUNT,
    BALANCE_LIFETIME_THRESHOLD,
};
use crate::CoinchainError;

pub fn check_nonnegative_amount(env: &Env, amount: i128) {
    if amount < 0 {
        panic_with_error!(env, CoinchainError::InvalidAmount);
    }
}

pub fn read_balance(env: &Env, id: &Address) -> i128 {
    let key = DataKey::Balance(id.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(balance) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
            balance
        }
        None => 0,
    }
}

fn write_balance(env: &Env, id: &Address, amount: i128) {
    let key = DataKey::Balance(id.clone());
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}

pub fn receive_balance(env: &Env, id: &Address, amount: i128) {
    let balance = read_balance(env, id);
    match balance.checked_add(amount) {
        Some(updated) => write_balance(env, id, updated),
        None => panic_with_error!(env, CoinchainError::InvalidAmount),
    }
}

pub fn spend_balance(env: &Env, id: &Address, amount: i128) {
    let balance = read_balance(env, id);
    if balance < amount {
        panic_with_error!(env, CoinchainError::InsufficientBalance);
    }
    write_balance(env, id, balance - amount);
}

pub fn read_total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn adjust_total_supply(env: &Env, delta: i128) {
    match read_total_supply(env).checked_add(delta) {
        Some(supply) => env.storage().instance().set(&DataKey::TotalSupply, &supply),
        None => panic_with_error!(env, CoinchainError::InvalidAmount),
    }
}

/// Returns the live allowance; expired approvals read as zero.
pub fn read_allowance(env: &Env, from: &Address, spender: &Address) -> AllowanceValue {
    let key = DataKey::Allowance(AllowanceKey {
        from: from.clone(),
        spender: spender.clone(),
    });
    match env.storage().temporary().get::<_, AllowanceValue>(&key) {
        Some(allowance) if allowance.expiration_ledger >= env.ledger().sequence() => allowance,
        Some(allowance) => AllowanceValue {
            amount: 0,
            expiration_ledger: allowance.expiration_ledger,
        },
        None => AllowanceValue {
            amount: 0,
            expiration_ledger: 0,
        },
    }
}

pub fn write_allowance(
    env: &Env,
    from: &Address,
    spender: &Address,
    amount: i128,
    expiration_ledger: u32,
) {
    let sequence = env.ledger().sequence();
    if amount > 0 && expiration_ledger < sequence {
        panic_with_error!(env, CoinchainError::InvalidExpiration);
    }

    let key = DataKey::Allowance(AllowanceKey {
        from: from.clone(),
        spender: spender.clone(),
    });
    let allowance = AllowanceValue {
        amount,
        expiration_ledger,
    };
    env.storage().temporary().set(&key, &allowance);

    if amount > 0 {
        let live_for = expiration_ledger - sequence;
        env.storage().temporary().extend_ttl(&key, live_for, live_for);
    }
}

pub fn spend_allowance(env: &Env, from: &Address, spender: &Address, amount: i128) {
    let allowance = read_allowance(env, from, spender);
    if allowance.amount < amount {
        panic_with_error!(env, CoinchainError::InsufficientAllowance);
    }
    if amount > 0 {
        write_allowance(
            env,
            from,
            spender,
            allowance.amount - amount,
            allowance.expiration_ledger,
        );
    }
}

pub fn read_transfer_limit(env: &Env) -> TransferLimit {
    env.storage()
        .instance()
        .get(&DataKey::TransferLimit)
        .unwrap_or(TransferLimit {
            amount: 0,
            enabled: false,
        })
}

pub fn write_transfer_limit(env: &Env, limit: &TransferLimit) {
    env.storage().instance().set(&DataKey::TransferLimit, limit);
}

/// Applies the transfer limit and the launch guard to a move of `amount` into `to`.
///
/// A transfer into the liquidity pair opens a one-ledger window in which every
/// other transfer is refused.
pub fn check_transfer_rules(env: &Env, to: &Address, amount: i128) {
    let limit = read_transfer_limit(env);
    if limit.enabled && amount > limit.amount {
        panic_with_error!(env, CoinchainError::TransferLimitExceeded);
    }

    let pair: Option<Address> = env.storage().instance().get(&DataKey::Pair);
    let sequence = env.ledger().sequence();
    if pair.as_ref() == Some(to) {
        env.storage()
            .instance()
            .set(&DataKey::LiquidityLedger, &sequence);
        return;
    }

    let launch: Option<u32> = env.storage().instance().get(&DataKey::LiquidityLedger);
    if launch == Some(sequence) {
        panic_with_error!(env, CoinchainError::LaunchWindowActive);
    }
}

/// Moves `amount` from `from` to `to` after applying the transfer rules.
pub fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) {
    check_transfer_rules(env, to, amount);
    spend_balance(env, from, amount);
    receive_balance(env, to, amount);
}
