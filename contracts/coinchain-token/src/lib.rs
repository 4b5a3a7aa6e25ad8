//! # Coinchain Token
//!
//! Fungible token implementing the standard Soroban token interface, with
//! role-gated minting, an operator-controlled transfer limit and a launch
//! guard around the liquidity pair.
//!
//! ## Roles
//!
//! - **DefaultAdmin**: grants and revokes every role
//! - **Operator**: configures the transfer limit
//! - **Minter**: mints new supply
//!
//! The standard interface cannot return contract errors, so failures there
//! abort the invocation through `panic_with_error!` with a `CoinchainError`.

#![no_std]

mod access_control;
mod balance;
mod types;

use soroban_sdk::{
    contract, contracterror, contractimpl, log, panic_with_error,
    token::{self, TokenInterface as _},
    Address, Env, String,
};

use crate::balance::{
    adjust_total_supply, check_nonnegative_amount, move_balance, read_allowance, read_balance,
    read_total_supply, read_transfer_limit, receive_balance, spend_allowance, spend_balance,
    write_allowance, write_transfer_limit,
};
pub use crate::types::{
    DataKey, Role, TokenEvents, TokenMetadata, TransferLimit, DECIMALS, INSTANCE_BUMP_AMOUNT,
    INSTANCE_LIFETIME_THRESHOLD,
};

/// Error codes for the token contract.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CoinchainError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// Caller lacks the required role
    Unauthorized = 3,
    /// Negative amount or supply overflow
    InvalidAmount = 4,
    InsufficientBalance = 5,
    InsufficientAllowance = 6,
    /// Transfer above the enabled transfer limit
    TransferLimitExceeded = 7,
    /// Transfer in the same ledger as a transfer into the liquidity pair
    LaunchWindowActive = 8,
    /// Approval with an expiration ledger in the past
    InvalidExpiration = 9,
}

#[contract]
pub struct CoinchainToken;

#[contractimpl]
impl CoinchainToken {
    /// Initializes metadata and roles and mints the initial supply.
    ///
    /// # Arguments
    /// * `operator` - Receives the `Operator` role
    /// * `receiver` - Receives `initial_supply` and the `DefaultAdmin` role
    /// * `pair` - Liquidity pair address watched by the launch guard
    pub fn initialize(
        env: Env,
        operator: Address,
        receiver: Address,
        name: String,
        symbol: String,
        initial_supply: i128,
        pair: Address,
    ) -> Result<(), CoinchainError> {
        if env.storage().instance().has(&DataKey::Metadata) {
            return Err(CoinchainError::AlreadyInitialized);
        }
        if initial_supply < 0 {
            return Err(CoinchainError::InvalidAmount);
        }

        let metadata = TokenMetadata {
            name,
            symbol,
            decimals: DECIMALS,
        };
        env.storage().instance().set(&DataKey::Metadata, &metadata);
        env.storage().instance().set(&DataKey::Pair, &pair);

        access_control::grant_role(&env, &receiver, Role::DefaultAdmin);
        access_control::grant_role(&env, &operator, Role::Operator);

        receive_balance(&env, &receiver, initial_supply);
        adjust_total_supply(&env, initial_supply);
        Self::bump_instance(&env);

        log!(&env, "token initialized", initial_supply);
        TokenEvents::mint(&env, &operator, &receiver, initial_supply);
        Ok(())
    }

    /// Mints `amount` to `to`. Requires the `Minter` role.
    pub fn mint(env: Env, minter: Address, to: Address, amount: i128) -> Result<(), CoinchainError> {
        minter.require_auth();
        Self::require_initialized(&env)?;
        if amount < 0 {
            return Err(CoinchainError::InvalidAmount);
        }
        if !access_control::has_role(&env, &minter, Role::Minter) {
            return Err(CoinchainError::Unauthorized);
        }

        receive_balance(&env, &to, amount);
        adjust_total_supply(&env, amount);
        Self::bump_instance(&env);

        TokenEvents::mint(&env, &minter, &to, amount);
        Ok(())
    }

    pub fn total_supply(env: Env) -> i128 {
        read_total_supply(&env)
    }

    /// Returns the liquidity pair address.
    pub fn pair(env: Env) -> Result<Address, CoinchainError> {
        env.storage()
            .instance()
            .get(&DataKey::Pair)
            .ok_or(CoinchainError::NotInitialized)
    }

    // Transfer limit

    /// Sets the per-transfer cap. Requires the `Operator` role.
    pub fn set_transfer_limit(env: Env, operator: Address, limit: i128) -> Result<(), CoinchainError> {
        operator.require_auth();
        Self::require_operator(&env, &operator)?;
        if limit < 0 {
            return Err(CoinchainError::InvalidAmount);
        }

        let mut current = read_transfer_limit(&env);
        current.amount = limit;
        write_transfer_limit(&env, &current);
        Self::bump_instance(&env);

        TokenEvents::limit_updated(&env, &operator, current);
        Ok(())
    }

    /// Turns enforcement of the transfer limit on or off. Requires the `Operator` role.
    pub fn set_transfer_limit_enabled(
        env: Env,
        operator: Address,
        enabled: bool,
    ) -> Result<(), CoinchainError> {
        operator.require_auth();
        Self::require_operator(&env, &operator)?;

        let mut current = read_transfer_limit(&env);
        current.enabled = enabled;
        write_transfer_limit(&env, &current);
        Self::bump_instance(&env);

        TokenEvents::limit_updated(&env, &operator, current);
        Ok(())
    }

    pub fn get_transfer_limit(env: Env) -> TransferLimit {
        read_transfer_limit(&env)
    }

    // Role management

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access_control::has_role(&env, &account, role)
    }

    pub fn role_member_count(env: Env, role: Role) -> u32 {
        access_control::role_member_count(&env, role)
    }

    /// Grants `role` to `account`. Requires the `DefaultAdmin` role.
    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), CoinchainError> {
        caller.require_auth();
        Self::require_default_admin(&env, &caller)?;

        if access_control::grant_role(&env, &account, role) {
            TokenEvents::role_granted(&env, role, &account, &caller);
        }
        Self::bump_instance(&env);
        Ok(())
    }

    /// Revokes `role` from `account`. Requires the `DefaultAdmin` role.
    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), CoinchainError> {
        caller.require_auth();
        Self::require_default_admin(&env, &caller)?;

        if access_control::revoke_role(&env, &account, role) {
            TokenEvents::role_revoked(&env, role, &account, &caller);
        }
        Self::bump_instance(&env);
        Ok(())
    }

    pub fn grant_minter_role(env: Env, caller: Address, account: Address) -> Result<(), CoinchainError> {
        Self::grant_role(env, caller, Role::Minter, account)
    }

    pub fn revoke_minter_role(env: Env, caller: Address, account: Address) -> Result<(), CoinchainError> {
        Self::revoke_role(env, caller, Role::Minter, account)
    }

    pub fn grant_operator_role(env: Env, caller: Address, account: Address) -> Result<(), CoinchainError> {
        Self::grant_role(env, caller, Role::Operator, account)
    }

    pub fn revoke_operator_role(env: Env, caller: Address, account: Address) -> Result<(), CoinchainError> {
        Self::revoke_role(env, caller, Role::Operator, account)
    }

    // Internal helpers

    fn require_initialized(env: &Env) -> Result<(), CoinchainError> {
        if !env.storage().instance().has(&DataKey::Metadata) {
            return Err(CoinchainError::NotInitialized);
        }
        Ok(())
    }

    fn require_operator(env: &Env, caller: &Address) -> Result<(), CoinchainError> {
        Self::require_initialized(env)?;
        if !access_control::has_role(env, caller, Role::Operator) {
            return Err(CoinchainError::Unauthorized);
        }
        Ok(())
    }

    fn require_default_admin(env: &Env, caller: &Address) -> Result<(), CoinchainError> {
        Self::require_initialized(env)?;
        if !access_control::has_role(env, caller, Role::DefaultAdmin) {
            return Err(CoinchainError::Unauthorized);
        }
        Ok(())
    }

    fn metadata(env: &Env) -> TokenMetadata {
        match env.storage().instance().get(&DataKey::Metadata) {
            Some(metadata) => metadata,
            None => panic_with_error!(env, CoinchainError::NotInitialized),
        }
    }

    fn bump_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}

#[contractimpl]
impl token::TokenInterface for CoinchainToken {
    fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        read_allowance(&env, &from, &spender).amount
    }

    fn approve(env: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        from.require_auth();
        check_nonnegative_amount(&env, amount);

        write_allowance(&env, &from, &spender, amount, expiration_ledger);
        Self::bump_instance(&env);

        TokenEvents::approve(&env, &from, &spender, amount, expiration_ledger);
    }

    fn balance(env: Env, id: Address) -> i128 {
        read_balance(&env, &id)
    }

    fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        from.require_auth();
        check_nonnegative_amount(&env, amount);

        move_balance(&env, &from, &to, amount);
        Self::bump_instance(&env);

        TokenEvents::transfer(&env, &from, &to, amount);
    }

    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        spender.require_auth();
        check_nonnegative_amount(&env, amount);

        spend_allowance(&env, &from, &spender, amount);
        move_balance(&env, &from, &to, amount);
        Self::bump_instance(&env);

        TokenEvents::transfer(&env, &from, &to, amount);
    }

    fn burn(env: Env, from: Address, amount: i128) {
        from.require_auth();
        check_nonnegative_amount(&env, amount);

        spend_balance(&env, &from, amount);
        adjust_total_supply(&env, -amount);
        Self::bump_instance(&env);

        TokenEvents::burn(&env, &from, amount);
    }

    fn burn_from(env: Env, spender: Address, from: Address, amount: i128) {
        spender.require_auth();
        check_nonnegative_amount(&env, amount);

        spend_allowance(&env, &from, &spender, amount);
        spend_balance(&env, &from, amount);
        adjust_total_supply(&env, -amount);
        Self::bump_instance(&env);

        TokenEvents::burn(&env, &from, amount);
    }

    fn decimals(env: Env) -> u32 {
        Self::metadata(&env).decimals
    }

    fn name(env: Env) -> String {
        Self::metadata(&env).name
    }

    fn symbol(env: Env) -> String {
        Self::metadata(&env).symbol
    }
}

#[cfg(test)]
mod test;
