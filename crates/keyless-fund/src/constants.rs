//! Constants for keyless funding trees.

use alloy_primitives::U256;

/// The seed for both signature components of a keyless transaction. The search starts with
/// `r = s = SIGNATURE_SEED` and only ever moves `r`.
///
/// Equal to `0x0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0da0`.
pub const SIGNATURE_SEED: U256 = U256::from_limbs([
    0x0da0_da0d_a0da_0da0,
    0xa0da_0da0_da0d_a0da,
    0xda0d_a0da_0da0_da0d,
    0x0da0_da0d_a0da_0da0,
]);

/// The recovery parameter of every keyless transaction. Pre-EIP-155, so no chain id is mixed in.
pub const KEYLESS_V: u8 = 27;

/// Nonce of every keyless transaction. A discovered sender sends exactly once.
pub const KEYLESS_NONCE: u64 = 0;

/// Default gas limit reserved for one payee contract deployment.
pub const DEFAULT_GAS_LIMIT: u64 = 4_000_000;

/// Default gas price, 20 gwei.
pub const DEFAULT_GAS_PRICE: u128 = 20_000_000_000;

/// Default number of payees per payee contract.
pub const DEFAULT_BATCH_SIZE: usize = 110;

/// Default upper bound on signature candidates tried per transaction.
///
/// Roughly half of all `r` values are valid x-coordinates on secp256k1, so the chance of a correct
/// search exhausting this bound is about `2^-256`.
pub const DEFAULT_MAX_SEARCH_ITERATIONS: u64 = 256;
