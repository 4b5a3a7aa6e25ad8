//! # Lock Payments Contract
//!
//! A Soroban smart contract that takes custody of token funds on behalf of a
//! depositor, groups payments into batches and releases each batch to its
//! recipients once the batch due date has passed.
//!
//! ## Lifecycle
//!
//! - **Created**: funded and editable; orders can be added or removed
//! - **Released**: every order has been paid out (terminal)
//! - **Removed**: every remaining order was refunded to the depositor (terminal)
//!
//! Every entry point is all-or-nothing: inputs are validated before any funds
//! move, state is written only after every transfer succeeded, and any error
//! rolls the whole invocation back.

#![no_std]

mod custody;
mod orders;
mod types;
mod validation;

use soroban_sdk::{contract, contracterror, contractimpl, log, Address, Env, Vec};

use crate::custody::Custody;
use crate::orders::stage_orders;
pub use crate::types::{
    AccessPolicy, Batch, BatchAttributes, BatchState, DataKey, DepositorSlot, LockEvents, Order,
    BATCH_BUMP_AMOUNT, BATCH_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT,
    INSTANCE_LIFETIME_THRESHOLD, MAX_BATCH_SIZE,
};
use crate::validation::{validate_batch_size, validate_due_date, ValidationError};

/// Error codes for the lock payments contract.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LockPaymentsError {
    /// Contract not initialized
    NotInitialized = 1,
    /// Contract already initialized
    AlreadyInitialized = 2,
    /// Caller is not allowed by the access policy
    Unauthorized = 3,
    /// Recipient and amount lists differ in length
    LengthMismatch = 4,
    /// Invalid recipient or non-positive amount
    InvalidOrder = 5,
    /// Due date not strictly in the future
    InvalidDueDate = 6,
    /// Batch id was never assigned
    UnknownBatch = 7,
    /// Batch is released or removed and cannot be edited
    BatchNotEditable = 8,
    /// Batch is released or removed and cannot be dispersed
    BatchClosed = 9,
    /// Batch due date has not been reached
    DueDateNotReached = 10,
    /// Funding account or custody lacks the funds
    InsufficientFunds = 11,
    /// Token contract refused the transfer
    TransferRejected = 12,
    /// Sum of amounts exceeds the numeric range
    ArithmeticOverflow = 13,
    /// No orders supplied
    EmptyBatch = 14,
    /// Batch would exceed MAX_BATCH_SIZE orders
    BatchTooLarge = 15,
    /// Recipient has no remaining order in the batch
    OrderNotFound = 16,
}

impl From<ValidationError> for LockPaymentsError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::LengthMismatch => LockPaymentsError::LengthMismatch,
            ValidationError::EmptyBatch => LockPaymentsError::EmptyBatch,
            ValidationError::BatchTooLarge => LockPaymentsError::BatchTooLarge,
            ValidationError::InvalidRecipient | ValidationError::InvalidAmount => {
                LockPaymentsError::InvalidOrder
            }
            ValidationError::InvalidDueDate => LockPaymentsError::InvalidDueDate,
        }
    }
}

#[contract]
pub struct LockPaymentsContract;

#[contractimpl]
impl LockPaymentsContract {
    /// Initializes the contract with an admin and the policy deciding who may
    /// mutate a batch after creation.
    ///
    /// # Arguments
    /// * `env` - The contract environment
    /// * `admin` - The admin address that can manage the contract
    /// * `policy` - Initial access policy (`Open` matches unrestricted access)
    pub fn initialize(
        env: Env,
        admin: Address,
        policy: AccessPolicy,
    ) -> Result<(), LockPaymentsError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(LockPaymentsError::AlreadyInitialized);
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Policy, &policy);
        env.storage().instance().set(&DataKey::TotalBatches, &0u64);
        Self::bump_instance(&env);

        LockEvents::policy_updated(&env, &admin, policy);
        Ok(())
    }

    /// Creates a batch and pulls its full value from the depositor into custody.
    ///
    /// The depositor must have approved this contract as spender for at least
    /// the sum of `amounts` on `token`.
    ///
    /// # Arguments
    /// * `depositor` - Account funding the batch (must authorize the call)
    /// * `recipients` - Payment recipients
    /// * `amounts` - Amount owed to each recipient, same length as `recipients`
    /// * `due_date` - Ledger timestamp from which the batch may be dispersed
    /// * `token` - Payment token contract
    ///
    /// # Returns
    /// * `u64` - The new batch id
    ///
    /// # Errors
    /// * `LengthMismatch`, `InvalidOrder`, `EmptyBatch`, `BatchTooLarge`
    /// * `InvalidDueDate` - If `due_date` is not strictly after now
    /// * `ArithmeticOverflow` - If the amounts do not fit the numeric range
    /// * `InsufficientFunds` / `TransferRejected` - If the pull fails
    pub fn create_batch(
        env: Env,
        depositor: Address,
        recipients: Vec<Address>,
        amounts: Vec<i128>,
        due_date: u64,
        token: Address,
    ) -> Result<u64, LockPaymentsError> {
        depositor.require_auth();
        Self::require_initialized(&env)?;

        let engine = env.current_contract_address();
        let staged = stage_orders(&env, &engine, &recipients, &amounts)?;
        validate_batch_size(0, staged.orders.len())?;
        validate_due_date(&env, due_date)?;

        Custody::new(&env, &token).pull(&depositor, staged.total)?;

        let batch_id = Self::total_batches(env.clone());
        let now = env.ledger().timestamp();
        let mut batch = Batch {
            orders: Vec::new(&env),
            total: 0,
            due_date,
            payment_token: token.clone(),
            state: BatchState::Created,
            creation_date: now,
            released_date: 0,
            depositor: depositor.clone(),
        };
        batch.append(&staged)?;

        Self::save_batch(&env, batch_id, &batch);
        Self::index_depositor(&env, &depositor, batch_id);
        env.storage()
            .instance()
            .set(&DataKey::TotalBatches, &(batch_id + 1));
        Self::bump_instance(&env);

        log!(&env, "batch created", batch_id, batch.total, due_date);
        LockEvents::batch_created(&env, batch_id, &depositor, &token, batch.total, due_date);

        Ok(batch_id)
    }

    /// Adds orders to an editable batch, pulling their sum from `funder`.
    ///
    /// # Errors
    /// * `UnknownBatch`, `BatchNotEditable`, `Unauthorized`
    /// * `LengthMismatch`, `InvalidOrder`, `EmptyBatch`, `BatchTooLarge`
    /// * `ArithmeticOverflow`, `InsufficientFunds`, `TransferRejected`
    pub fn add_order_to_batch(
        env: Env,
        funder: Address,
        batch_id: u64,
        recipients: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<(), LockPaymentsError> {
        funder.require_auth();
        let mut batch = Self::load_editable(&env, &funder, batch_id)?;

        let engine = env.current_contract_address();
        let staged = stage_orders(&env, &engine, &recipients, &amounts)?;
        validate_batch_size(batch.order_count(), staged.orders.len())?;

        Custody::new(&env, &batch.payment_token).pull(&funder, staged.total)?;
        batch.append(&staged)?;

        Self::save_batch(&env, batch_id, &batch);
        Self::bump_instance(&env);

        LockEvents::orders_added(&env, batch_id, &funder, staged.orders.len(), staged.total);
        Ok(())
    }

    /// Removes one order per listed recipient and refunds the removed amounts
    /// to the batch depositor.
    ///
    /// A recipient listed twice removes two orders, earliest first. The call
    /// fails with `OrderNotFound` if a listed recipient has no order left.
    pub fn remove_order_from_batch(
        env: Env,
        caller: Address,
        batch_id: u64,
        recipients: Vec<Address>,
    ) -> Result<(), LockPaymentsError> {
        caller.require_auth();
        let mut batch = Self::load_editable(&env, &caller, batch_id)?;

        let mut refund: i128 = 0;
        for recipient in recipients.iter() {
            let order = batch
                .remove_first(&recipient)
                .ok_or(LockPaymentsError::OrderNotFound)?;
            refund = refund
                .checked_add(order.amount)
                .ok_or(LockPaymentsError::ArithmeticOverflow)?;
        }

        Custody::new(&env, &batch.payment_token).push(&batch.depositor, refund)?;

        Self::save_batch(&env, batch_id, &batch);
        Self::bump_instance(&env);

        LockEvents::orders_removed(&env, batch_id, &batch.depositor, recipients.len(), refund);
        Ok(())
    }

    /// Pays every order of a due batch and marks it `Released`.
    ///
    /// # Errors
    /// * `UnknownBatch` - If the batch does not exist
    /// * `BatchClosed` - If the batch is already released or removed
    /// * `DueDateNotReached` - If the ledger timestamp is before the due date
    /// * `Unauthorized` - If the access policy rejects the caller
    pub fn disperse_batch(env: Env, caller: Address, batch_id: u64) -> Result<(), LockPaymentsError> {
        caller.require_auth();
        let mut batch = Self::load_batch(&env, batch_id)?;
        if batch.state != BatchState::Created {
            return Err(LockPaymentsError::BatchClosed);
        }
        let now = env.ledger().timestamp();
        if now < batch.due_date {
            return Err(LockPaymentsError::DueDateNotReached);
        }
        Self::require_access(&env, &caller, &batch)?;

        let custody = Custody::new(&env, &batch.payment_token);
        let mut paid: i128 = 0;
        for order in batch.orders.iter() {
            custody.push(&order.recipient, order.amount)?;
            paid = paid
                .checked_add(order.amount)
                .ok_or(LockPaymentsError::ArithmeticOverflow)?;
            LockEvents::payment_released(&env, batch_id, &order.recipient, order.amount);
        }
        debug_assert_eq!(batch.orders_total(), Ok(paid));

        batch.state = BatchState::Released;
        batch.released_date = now;
        Self::save_batch(&env, batch_id, &batch);
        Self::bump_instance(&env);

        log!(&env, "batch released", batch_id, paid);
        LockEvents::batch_released(&env, batch_id, batch.order_count(), paid);
        Ok(())
    }

    /// Refunds the full custody of a batch to its depositor and marks it
    /// `Removed`. Orders stay readable.
    pub fn remove_batch(env: Env, caller: Address, batch_id: u64) -> Result<(), LockPaymentsError> {
        caller.require_auth();
        let mut batch = Self::load_editable(&env, &caller, batch_id)?;

        Custody::new(&env, &batch.payment_token).push(&batch.depositor, batch.total)?;

        batch.state = BatchState::Removed;
        Self::save_batch(&env, batch_id, &batch);
        Self::bump_instance(&env);

        log!(&env, "batch removed", batch_id, batch.total);
        LockEvents::batch_removed(&env, batch_id, &batch.depositor, batch.total);
        Ok(())
    }

    /// Returns a snapshot of a batch.
    pub fn get_batch_attributes(
        env: Env,
        batch_id: u64,
    ) -> Result<BatchAttributes, LockPaymentsError> {
        let batch = Self::load_batch(&env, batch_id)?;
        Ok(batch.attributes(&env))
    }

    /// Returns the number of batches ever created, which is also the next id.
    pub fn total_batches(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::TotalBatches)
            .unwrap_or(0)
    }

    /// Returns the funds held for a batch: its total while `Created`, zero after.
    pub fn get_batch_custody(env: Env, batch_id: u64) -> Result<i128, LockPaymentsError> {
        let batch = Self::load_batch(&env, batch_id)?;
        match batch.state {
            BatchState::Created => Ok(batch.total),
            BatchState::Released | BatchState::Removed => Ok(0),
        }
    }

    /// Returns the funds held for all `Created` batches paid in `token`.
    pub fn get_total_custody(env: Env, token: Address) -> i128 {
        custody::held(&env, &token)
    }

    /// Returns the ids of every batch funded by `depositor`, oldest first.
    pub fn get_depositor_batches(env: Env, depositor: Address) -> Vec<u64> {
        let count = Self::get_depositor_batch_count(env.clone(), depositor.clone());
        let mut ids = Vec::new(&env);
        for index in 0..count {
            let key = DataKey::DepositorBatch(DepositorSlot {
                depositor: depositor.clone(),
                index,
            });
            if let Some(batch_id) = env.storage().persistent().get::<_, u64>(&key) {
                ids.push_back(batch_id);
            }
        }
        ids
    }

    /// Returns how many batches `depositor` has funded.
    pub fn get_depositor_batch_count(env: Env, depositor: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::DepositorBatchCount(depositor))
            .unwrap_or(0)
    }

    /// Returns the admin address.
    pub fn get_admin(env: Env) -> Result<Address, LockPaymentsError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(LockPaymentsError::NotInitialized)
    }

    /// Updates the admin address.
    pub fn set_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), LockPaymentsError> {
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        env.storage().instance().set(&DataKey::Admin, &new_admin);
        Self::bump_instance(&env);
        Ok(())
    }

    /// Returns the active access policy.
    pub fn get_access_policy(env: Env) -> Result<AccessPolicy, LockPaymentsError> {
        env.storage()
            .instance()
            .get(&DataKey::Policy)
            .ok_or(LockPaymentsError::NotInitialized)
    }

    /// Replaces the access policy. Applies to every batch, existing ones included.
    pub fn set_access_policy(
        env: Env,
        admin: Address,
        policy: AccessPolicy,
    ) -> Result<(), LockPaymentsError> {
        admin.require_auth();
        Self::require_admin(&env, &admin)?;

        env.storage().instance().set(&DataKey::Policy, &policy);
        Self::bump_instance(&env);

        LockEvents::policy_updated(&env, &admin, policy);
        Ok(())
    }

    // Internal helpers

    fn require_initialized(env: &Env) -> Result<(), LockPaymentsError> {
        if !env.storage().instance().has(&DataKey::Admin) {
            return Err(LockPaymentsError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), LockPaymentsError> {
        let admin = Self::get_admin(env.clone())?;
        if *caller != admin {
            return Err(LockPaymentsError::Unauthorized);
        }
        Ok(())
    }

    fn require_access(env: &Env, caller: &Address, batch: &Batch) -> Result<(), LockPaymentsError> {
        let policy = Self::get_access_policy(env.clone())?;
        let admin = Self::get_admin(env.clone())?;
        if !policy.permits(caller, &batch.depositor, &admin) {
            return Err(LockPaymentsError::Unauthorized);
        }
        Ok(())
    }

    // Loads a batch that is still `Created` and that `caller` may modify.
    fn load_editable(env: &Env, caller: &Address, batch_id: u64) -> Result<Batch, LockPaymentsError> {
        let batch = Self::load_batch(env, batch_id)?;
        if batch.state != BatchState::Created {
            return Err(LockPaymentsError::BatchNotEditable);
        }
        Self::require_access(env, caller, &batch)?;
        Ok(batch)
    }

    fn load_batch(env: &Env, batch_id: u64) -> Result<Batch, LockPaymentsError> {
        env.storage()
            .persistent()
            .get(&DataKey::Batch(batch_id))
            .ok_or(LockPaymentsError::UnknownBatch)
    }

    fn save_batch(env: &Env, batch_id: u64, batch: &Batch) {
        let key = DataKey::Batch(batch_id);
        env.storage().persistent().set(&key, batch);
        env.storage()
            .persistent()
            .extend_ttl(&key, BATCH_LIFETIME_THRESHOLD, BATCH_BUMP_AMOUNT);
    }

    fn index_depositor(env: &Env, depositor: &Address, batch_id: u64) {
        let count = Self::get_depositor_batch_count(env.clone(), depositor.clone());
        let storage = env.storage().persistent();

        let slot = DataKey::DepositorBatch(DepositorSlot {
            depositor: depositor.clone(),
            index: count,
        });
        storage.set(&slot, &batch_id);
        storage.extend_ttl(&slot, BATCH_LIFETIME_THRESHOLD, BATCH_BUMP_AMOUNT);

        let count_key = DataKey::DepositorBatchCount(depositor.clone());
        storage.set(&count_key, &(count + 1));
        storage.extend_ttl(&count_key, BATCH_LIFETIME_THRESHOLD, BATCH_BUMP_AMOUNT);
    }

    fn bump_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}
