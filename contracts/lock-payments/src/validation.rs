//! Validation rules for batch orders and due dates.

use soroban_sdk::{Address, Env};

use crate::types::MAX_BATCH_SIZE;

/// Validation error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Recipient and amount lists differ in length
    LengthMismatch,
    /// No orders supplied
    EmptyBatch,
    /// Batch would exceed `MAX_BATCH_SIZE` orders
    BatchTooLarge,
    /// Recipient cannot receive payments from this contract
    InvalidRecipient,
    /// Amount is zero or negative
    InvalidAmount,
    /// Due date is not strictly in the future
    InvalidDueDate,
}

/// Validates that recipients and amounts pair up one to one.
pub fn validate_lengths(recipients: u32, amounts: u32) -> Result<(), ValidationError> {
    if recipients != amounts {
        return Err(ValidationError::LengthMismatch);
    }
    Ok(())
}

/// Validates the number of incoming orders against what the batch already holds.
pub fn validate_batch_size(existing: u32, incoming: u32) -> Result<(), ValidationError> {
    if incoming == 0 {
        return Err(ValidationError::EmptyBatch);
    }
    match existing.checked_add(incoming) {
        Some(size) if size <= MAX_BATCH_SIZE => Ok(()),
        _ => Err(ValidationError::BatchTooLarge),
    }
}

/// Validates a recipient address.
///
/// Soroban addresses cannot be null, so the only unusable recipient is the
/// custody contract itself: paying it would strand funds outside any batch.
pub fn validate_recipient(engine: &Address, recipient: &Address) -> Result<(), ValidationError> {
    if recipient == engine {
        return Err(ValidationError::InvalidRecipient);
    }
    Ok(())
}

/// Validates an order amount.
pub fn validate_amount(amount: i128) -> Result<(), ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(())
}

/// Validates that a due date lies strictly after the current ledger timestamp.
pub fn validate_due_date(env: &Env, due_date: u64) -> Result<(), ValidationError> {
    if due_date <= env.ledger().timestamp() {
        return Err(ValidationError::InvalidDueDate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{
        testutils::{Address as _, Ledger},
        Env,
    };

    #[test]
    fn test_validate_lengths() {
        assert!(validate_lengths(0, 0).is_ok());
        assert!(validate_lengths(3, 3).is_ok());
        assert_eq!(validate_lengths(1, 2), Err(ValidationError::LengthMismatch));
        assert_eq!(validate_lengths(2, 1), Err(ValidationError::LengthMismatch));
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(0, 1).is_ok());
        assert!(validate_batch_size(0, MAX_BATCH_SIZE).is_ok());
        assert!(validate_batch_size(MAX_BATCH_SIZE - 1, 1).is_ok());
        assert_eq!(validate_batch_size(5, 0), Err(ValidationError::EmptyBatch));
        assert_eq!(
            validate_batch_size(MAX_BATCH_SIZE, 1),
            Err(ValidationError::BatchTooLarge)
        );
        assert_eq!(
            validate_batch_size(u32::MAX, 1),
            Err(ValidationError::BatchTooLarge)
        );
    }

    #[test]
    fn test_validate_recipient() {
        let env = Env::default();
        let engine = Address::generate(&env);
        let recipient = Address::generate(&env);

        assert!(validate_recipient(&engine, &recipient).is_ok());
        assert_eq!(
            validate_recipient(&engine, &engine),
            Err(ValidationError::InvalidRecipient)
        );
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(i128::MAX).is_ok());
        assert_eq!(validate_amount(0), Err(ValidationError::InvalidAmount));
        assert_eq!(validate_amount(-1), Err(ValidationError::InvalidAmount));
    }

    #[test]
    fn test_validate_due_date_is_strict() {
        let env = Env::default();
        env.ledger().with_mut(|li| {
            li.timestamp = 1_000;
        });

        assert!(validate_due_date(&env, 1_001).is_ok());
        assert_eq!(
            validate_due_date(&env, 1_000),
            Err(ValidationError::InvalidDueDate)
        );
        assert_eq!(
            validate_due_date(&env, 400),
            Err(ValidationError::InvalidDueDate)
        );
    }
}
