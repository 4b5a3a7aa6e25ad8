//! Data types, storage keys and events for time-locked payment batches.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Vec};

/// Maximum number of orders a single batch may hold.
pub const MAX_BATCH_SIZE: u32 = 100;

/// Approximate number of ledgers closed per day (5 second close time).
pub const DAY_IN_LEDGERS: u32 = 17_280;

/// TTL extension applied to instance storage on every mutating call.
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// TTL extension applied to batch entries whenever they are written.
pub const BATCH_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub const BATCH_LIFETIME_THRESHOLD: u32 = BATCH_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Lifecycle state of a batch. `Released` and `Removed` are terminal.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum BatchState {
    Created = 0,
    Released = 1,
    Removed = 2,
}

/// Who may mutate a batch after it has been created.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessPolicy {
    /// Any authenticated caller.
    Open,
    /// Only the account that funded the batch.
    Depositor,
    /// The depositor or the contract admin.
    DepositorOrAdmin,
}

impl AccessPolicy {
    /// Returns true if `caller` may add to, remove from, remove or disperse a
    /// batch funded by `depositor`.
    pub fn permits(&self, caller: &Address, depositor: &Address, admin: &Address) -> bool {
        match self {
            AccessPolicy::Open => true,
            AccessPolicy::Depositor => caller == depositor,
            AccessPolicy::DepositorOrAdmin => caller == depositor || caller == admin,
        }
    }
}

/// A single payment inside a batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    pub recipient: Address,
    pub amount: i128,
}

/// A stored batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Batch {
    /// Orders in insertion order
    pub orders: Vec<Order>,
    /// Running sum of `orders[*].amount`
    pub total: i128,
    /// Earliest ledger timestamp at which the batch may be dispersed
    pub due_date: u64,
    /// Token every order is paid in
    pub payment_token: Address,
    pub state: BatchState,
    pub creation_date: u64,
    /// Zero until the batch is dispersed
    pub released_date: u64,
    /// Account that funded the batch; refund target on removal
    pub depositor: Address,
}

/// Read-only snapshot of a batch with orders split into parallel lists.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchAttributes {
    pub addresses: Vec<Address>,
    pub amounts: Vec<i128>,
    pub total: i128,
    pub due_date: u64,
    pub state: BatchState,
    pub creation_date: u64,
    pub released_date: u64,
    pub payment_token: Address,
    pub depositor: Address,
}

/// Position of a batch id in a depositor's index, one storage entry per batch.
#[contracttype]
#[derive(Clone)]
pub struct DepositorSlot {
    pub depositor: Address,
    pub index: u32,
}

/// Storage keys for contract state.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Admin address
    Admin,
    /// Active access policy
    Policy,
    /// Next batch id to assign
    TotalBatches,
    /// Stored batch by id
    Batch(u64),
    /// Funds held for `Created` batches, per token
    Custody(Address),
    /// Number of batches funded by a depositor
    DepositorBatchCount(Address),
    /// One entry of a depositor's batch index
    DepositorBatch(DepositorSlot),
}

/// Events emitted by the lock payments contract.
pub struct LockEvents;

impl LockEvents {
    pub fn batch_created(
        env: &Env,
        batch_id: u64,
        depositor: &Address,
        token: &Address,
        total: i128,
        due_date: u64,
    ) {
        let topics = (symbol_short!("batch"), symbol_short!("created"), batch_id);
        env.events().publish(
            topics,
            (depositor.clone(), token.clone(), total, due_date),
        );
    }

    pub fn orders_added(env: &Env, batch_id: u64, funder: &Address, count: u32, amount: i128) {
        let topics = (symbol_short!("orders"), symbol_short!("added"), batch_id);
        env.events()
            .publish(topics, (funder.clone(), count, amount));
    }

    pub fn orders_removed(
        env: &Env,
        batch_id: u64,
        depositor: &Address,
        count: u32,
        refunded: i128,
    ) {
        let topics = (symbol_short!("orders"), symbol_short!("removed"), batch_id);
        env.events()
            .publish(topics, (depositor.clone(), count, refunded));
    }

    pub fn payment_released(env: &Env, batch_id: u64, recipient: &Address, amount: i128) {
        let topics = (symbol_short!("payment"), symbol_short!("released"), batch_id);
        env.events().publish(topics, (recipient.clone(), amount));
    }

    pub fn batch_released(env: &Env, batch_id: u64, count: u32, total: i128) {
        let topics = (symbol_short!("batch"), symbol_short!("released"), batch_id);
        env.events().publish(topics, (count, total));
    }

    pub fn batch_removed(env: &Env, batch_id: u64, depositor: &Address, refunded: i128) {
        let topics = (symbol_short!("batch"), symbol_short!("removed"), batch_id);
        env.events().publish(topics, (depositor.clone(), refunded));
    }

    pub fn policy_updated(env: &Env, admin: &Address, policy: AccessPolicy) {
        let topics = (symbol_short!("policy"), symbol_short!("updated"));
        env.events().publish(topics, (admin.clone(), policy));
    }
}
