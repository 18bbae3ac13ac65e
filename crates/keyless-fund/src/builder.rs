//! One keyless payee-contract deployment per batch.

use alloy_primitives::{Address, U256};

use crate::{
    checked_sum, derive_sender, DeployEncoder, FundingError, KeylessTransaction, KeylessTx, Payout,
    Result, SearchConfig, TxParams,
};

/// Builds keyless deployment transactions for batches of payees.
#[derive(Debug, Clone)]
pub struct BatchTxBuilder<E> {
    encoder: E,
    params: TxParams,
    search: SearchConfig,
}

impl<E: DeployEncoder> BatchTxBuilder<E> {
    /// Creates a builder with default gas parameters and search configuration.
    pub fn new(encoder: E) -> Self {
        Self { encoder, params: TxParams::default(), search: SearchConfig::default() }
    }

    /// Sets the gas parameters.
    pub fn with_params(mut self, params: TxParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the search configuration.
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// The gas parameters.
    pub const fn params(&self) -> &TxParams {
        &self.params
    }

    /// The search configuration.
    pub const fn search(&self) -> &SearchConfig {
        &self.search
    }

    /// The payee contract encoder.
    pub const fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Builds the keyless transaction deploying a payee contract for one batch.
    ///
    /// The transaction carries `sum(amounts)` as value. `addresses` and `amounts` must be
    /// non-empty and of equal length.
    pub fn build_batch_tx(
        &self,
        authorized: Address,
        addresses: &[Address],
        amounts: &[U256],
    ) -> Result<KeylessTransaction> {
        if addresses.len() != amounts.len() {
            return Err(FundingError::BatchLengthMismatch {
                addresses: addresses.len(),
                amounts: amounts.len(),
            });
        }
        if addresses.is_empty() {
            return Err(FundingError::EmptyBatch);
        }

        let value = checked_sum(amounts)?;
        let init_code = self.encoder.encode_deploy(authorized, addresses, amounts);
        let template = KeylessTx::template(
            self.params.gas_price,
            self.params.gas_limit,
            value,
            init_code,
            self.search.seed,
        );

        let found = derive_sender(&template, self.search.max_iterations)?;
        if found.tx.value != value {
            return Err(FundingError::ValueMismatch { declared: found.tx.value, expected: value });
        }
        Ok(found)
    }

    /// Same as [`Self::build_batch_tx`], for a batch of payouts.
    pub fn build_payouts_tx(
        &self,
        authorized: Address,
        batch: &[Payout],
    ) -> Result<KeylessTransaction> {
        let (addresses, amounts): (Vec<_>, Vec<_>) =
            batch.iter().map(|payout| (payout.address, payout.amount)).unzip();
        self.build_batch_tx(authorized, &addresses, &amounts)
    }
}
