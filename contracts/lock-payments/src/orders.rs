//! Order ledger: the (recipient, amount) sequence of a batch and its running total.
//!
//! Batches are capped at `MAX_BATCH_SIZE` orders, so removal is a plain
//! linear scan over the sequence.

use soroban_sdk::{Address, Env, Vec};

use crate::types::{Batch, BatchAttributes, Order};
use crate::validation::{validate_amount, validate_lengths, validate_recipient};
use crate::LockPaymentsError;

/// Orders that passed validation but are not attached to a batch yet.
#[derive(Clone, Debug)]
pub struct StagedOrders {
    pub orders: Vec<Order>,
    pub total: i128,
}

/// Pairs recipients with amounts, validating every order and summing the total.
///
/// Nothing is written; the caller pulls `total` into custody before attaching
/// the orders to a batch.
pub fn stage_orders(
    env: &Env,
    engine: &Address,
    recipients: &Vec<Address>,
    amounts: &Vec<i128>,
) -> Result<StagedOrders, LockPaymentsError> {
    validate_lengths(recipients.len(), amounts.len())?;

    let mut orders = Vec::new(env);
    let mut total: i128 = 0;

    for (recipient, amount) in recipients.iter().zip(amounts.iter()) {
        validate_recipient(engine, &recipient)?;
        validate_amount(amount)?;

        total = total
            .checked_add(amount)
            .ok_or(LockPaymentsError::ArithmeticOverflow)?;
        orders.push_back(Order { recipient, amount });
    }

    Ok(StagedOrders { orders, total })
}

impl Batch {
    /// Number of orders currently in the batch.
    pub fn order_count(&self) -> u32 {
        self.orders.len()
    }

    /// Appends staged orders and grows the running total.
    pub fn append(&mut self, staged: &StagedOrders) -> Result<(), LockPaymentsError> {
        self.total = self
            .total
            .checked_add(staged.total)
            .ok_or(LockPaymentsError::ArithmeticOverflow)?;
        self.orders.append(&staged.orders);
        Ok(())
    }

    /// Removes the first order paying `recipient`, in insertion order.
    pub fn remove_first(&mut self, recipient: &Address) -> Option<Order> {
        let index = self
            .orders
            .iter()
            .position(|order| order.recipient == *recipient)? as u32;
        let order = self.orders.get(index)?;
        self.orders.remove(index);
        self.total -= order.amount;
        Some(order)
    }

    /// Recomputes the order sum from scratch.
    pub fn orders_total(&self) -> Result<i128, LockPaymentsError> {
        let mut sum: i128 = 0;
        for order in self.orders.iter() {
            sum = sum
                .checked_add(order.amount)
                .ok_or(LockPaymentsError::ArithmeticOverflow)?;
        }
        Ok(sum)
    }

    /// Builds the read snapshot with orders split into parallel lists.
    pub fn attributes(&self, env: &Env) -> BatchAttributes {
        let mut addresses = Vec::new(env);
        let mut amounts = Vec::new(env);
        for order in self.orders.iter() {
            addresses.push_back(order.recipient);
            amounts.push_back(order.amount);
        }

        BatchAttributes {
            addresses,
            amounts,
            total: self.total,
            due_date: self.due_date,
            state: self.state,
            creation_date: self.creation_date,
            released_date: self.released_date,
            payment_token: self.payment_token.clone(),
            depositor: self.depositor.clone(),
        }
    }
}
