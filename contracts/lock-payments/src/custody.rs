//! Token custody adapter.
//!
//! Moves funds between depositors, recipients and this contract through the
//! payment token, and keeps the per-token ledger of funds earmarked for
//! batches that are still `Created`.

use soroban_sdk::{token, Address, Env};

use crate::types::{DataKey, BATCH_BUMP_AMOUNT, BATCH_LIFETIME_THRESHOLD};
use crate::LockPaymentsError;

pub struct Custody<'a> {
    env: &'a Env,
    token: Address,
    client: token::Client<'a>,
    engine: Address,
}

impl<'a> Custody<'a> {
    pub fn new(env: &'a Env, token: &Address) -> Self {
        Custody {
            env,
            token: token.clone(),
            client: token::Client::new(env, token),
            engine: env.current_contract_address(),
        }
    }

    /// Pulls exactly `amount` from `from` into custody using the allowance
    /// `from` granted to this contract.
    pub fn pull(&self, from: &Address, amount: i128) -> Result<(), LockPaymentsError> {
        if amount == 0 {
            return Ok(());
        }
        if self.client.balance(from) < amount {
            return Err(LockPaymentsError::InsufficientFunds);
        }
        if self.client.allowance(from, &self.engine) < amount {
            return Err(LockPaymentsError::TransferRejected);
        }

        match self
            .client
            .try_transfer_from(&self.engine, from, &self.engine, &amount)
        {
            Ok(Ok(())) => {}
            _ => return Err(LockPaymentsError::TransferRejected),
        }

        self.earmark(amount)
    }

    /// Pushes exactly `amount` out of custody to `to`.
    pub fn push(&self, to: &Address, amount: i128) -> Result<(), LockPaymentsError> {
        if amount == 0 {
            return Ok(());
        }
        if self.held() < amount {
            return Err(LockPaymentsError::InsufficientFunds);
        }

        match self.client.try_transfer(&self.engine, to, &amount) {
            Ok(Ok(())) => {}
            _ => return Err(LockPaymentsError::TransferRejected),
        }

        self.release(amount);
        Ok(())
    }

    /// Funds currently earmarked for `Created` batches in this token.
    pub fn held(&self) -> i128 {
        held(self.env, &self.token)
    }

    fn earmark(&self, amount: i128) -> Result<(), LockPaymentsError> {
        let updated = self
            .held()
            .checked_add(amount)
            .ok_or(LockPaymentsError::ArithmeticOverflow)?;
        self.store(updated);
        Ok(())
    }

    fn release(&self, amount: i128) {
        self.store(self.held() - amount);
    }

    fn store(&self, held: i128) {
        let key = DataKey::Custody(self.token.clone());
        let storage = self.env.storage().persistent();
        storage.set(&key, &held);
        storage.extend_ttl(&key, BATCH_LIFETIME_THRESHOLD, BATCH_BUMP_AMOUNT);
    }
}

/// Funds earmarked for `Created` batches in `token`.
pub fn held(env: &Env, token: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Custody(token.clone()))
        .unwrap_or(0)
}
