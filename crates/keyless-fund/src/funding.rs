//! Funding requirements of keyless senders.

use alloy_primitives::U256;

use crate::{FundingError, KeylessTx, Payout, Result};

/// The gas reservation of a transaction, `gas_limit * gas_price`.
pub fn gas_cost(tx: &KeylessTx) -> Result<U256> {
    U256::from(tx.gas_limit)
        .checked_mul(U256::from(tx.gas_price))
        .ok_or(FundingError::ValueOverflow)
}

/// The exact balance a keyless sender must hold before `tx` can be relayed:
/// `value + gas_limit * gas_price`.
pub fn required_value(tx: &KeylessTx) -> Result<U256> {
    tx.value.checked_add(gas_cost(tx)?).ok_or(FundingError::ValueOverflow)
}

/// Sums the amounts of a batch, failing instead of wrapping.
pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a U256>) -> Result<U256> {
    amounts
        .into_iter()
        .try_fold(U256::ZERO, |acc, amount| acc.checked_add(*amount))
        .ok_or(FundingError::ValueOverflow)
}

/// Sums the amounts of a list of payouts.
pub fn total_amount(payouts: &[Payout]) -> Result<U256> {
    checked_sum(payouts.iter().map(|payout| &payout.amount))
}
