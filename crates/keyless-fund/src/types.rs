use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A single transfer the funding tree has to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payout {
    /// The recipient
    pub address: Address,
    /// The amount in wei
    pub amount: U256,
}

impl Payout {
    /// Creates a payout of `amount` wei to `address`.
    pub const fn new(address: Address, amount: U256) -> Self {
        Self { address, amount }
    }
}

impl From<(Address, U256)> for Payout {
    fn from((address, amount): (Address, U256)) -> Self {
        Self::new(address, amount)
    }
}

/// Gas parameters shared by every transaction in a funding tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxParams {
    /// Gas price in wei
    pub gas_price: u128,
    /// Gas limit reserved for one payee contract deployment
    pub gas_limit: u64,
}

impl Default for TxParams {
    fn default() -> Self {
        Self {
            gas_price: crate::constants::DEFAULT_GAS_PRICE,
            gas_limit: crate::constants::DEFAULT_GAS_LIMIT,
        }
    }
}

/// How batch searches within one level are scheduled.
///
/// Both modes produce byte-identical trees; batches of one level never depend on each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    /// One batch after another on the calling thread.
    #[default]
    Sequential,
    /// Batches of a level are searched on the rayon thread pool.
    Parallel,
}
