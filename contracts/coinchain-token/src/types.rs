//! Data types, storage keys and events for the Coinchain token.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

/// Fixed number of decimals reported by the token.
pub const DECIMALS: u32 = 18;

pub const DAY_IN_LEDGERS: u32 = 17_280;

pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub const BALANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const BALANCE_LIFETIME_THRESHOLD: u32 = BALANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Access roles. `DefaultAdmin` manages membership of every role.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    DefaultAdmin,
    Operator,
    Minter,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// Per-transfer cap, enforced only while `enabled` is set.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransferLimit {
    pub amount: i128,
    pub enabled: bool,
}

#[contracttype]
#[derive(Clone)]
pub struct AllowanceKey {
    pub from: Address,
    pub spender: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceValue {
    pub amount: i128,
    pub expiration_ledger: u32,
}

#[contracttype]
#[derive(Clone)]
pub struct RoleKey {
    pub role: Role,
    pub account: Address,
}

/// Storage keys for contract state.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Metadata,
    /// Liquidity pair address watched by the launch guard
    Pair,
    TotalSupply,
    TransferLimit,
    /// Ledger sequence of the most recent transfer into the pair
    LiquidityLedger,
    Balance(Address),
    Allowance(AllowanceKey),
    RoleMember(RoleKey),
    RoleCount(Role),
}

/// Events emitted by the token contract.
pub struct TokenEvents;

impl TokenEvents {
    pub fn transfer(env: &Env, from: &Address, to: &Address, amount: i128) {
        let topics = (symbol_short!("transfer"), from.clone(), to.clone());
        env.events().publish(topics, amount);
    }

    pub fn approve(
        env: &Env,
        from: &Address,
        spender: &Address,
        amount: i128,
        expiration_ledger: u32,
    ) {
        let topics = (symbol_short!("approve"), from.clone(), spender.clone());
        env.events().publish(topics, (amount, expiration_ledger));
    }

    pub fn mint(env: &Env, minter: &Address, to: &Address, amount: i128) {
        let topics = (symbol_short!("mint"), minter.clone(), to.clone());
        env.events().publish(topics, amount);
    }

    pub fn burn(env: &Env, from: &Address, amount: i128) {
        let topics = (symbol_short!("burn"), from.clone());
        env.events().publish(topics, amount);
    }

    pub fn role_granted(env: &Env, role: Role, account: &Address, caller: &Address) {
        let topics = (symbol_short!("role"), symbol_short!("granted"), role);
        env.events()
            .publish(topics, (account.clone(), caller.clone()));
    }

    pub fn role_revoked(env: &Env, role: Role, account: &Address, caller: &Address) {
        let topics = (symbol_short!("role"), symbol_short!("revoked"), role);
        env.events()
            .publish(topics, (account.clone(), caller.clone()));
    }

    pub fn limit_updated(env: &Env, operator: &Address, limit: TransferLimit) {
        let topics = (symbol_short!("limit"), symbol_short!("updated"));
        env.events().publish(topics, (operator.clone(), limit));
    }
}
