//! Keyless sender search.
//!
//! The signing hash of a keyless transaction does not depend on its signature, so every `r`
//! that recovers to a public key yields a sender able to relay the transaction. Nobody holds that
//! sender's private key, but the signature itself authorizes the transaction once the sender is
//! funded.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    calculate_payee_address,
    constants::{DEFAULT_MAX_SEARCH_ITERATIONS, SIGNATURE_SEED},
    recover_signer_from_prehash, required_value, FundingError, KeylessTx, Result,
};

/// Parameters of the keyless sender search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Initial value of both signature components
    pub seed: U256,
    /// Upper bound on the number of `r` candidates tried per transaction
    pub max_iterations: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { seed: SIGNATURE_SEED, max_iterations: DEFAULT_MAX_SEARCH_ITERATIONS }
    }
}

/// A keyless transaction with a signature that recovers to `sender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeylessTransaction {
    /// The finalized transaction
    pub tx: KeylessTx,
    /// The transaction hash
    pub hash: B256,
    /// The recovered sender, which must be funded before `raw` can be relayed
    pub sender: Address,
    /// The raw signed transaction
    pub raw: Bytes,
}

impl KeylessTransaction {
    /// The address the payee contract is deployed to.
    pub fn payee_address(&self) -> Address {
        calculate_payee_address(self.sender)
    }

    /// The exact balance `sender` needs for this transaction to be relayed.
    pub fn required_value(&self) -> Result<U256> {
        required_value(&self.tx)
    }
}

/// Finds a signature for `template` that recovers to a sender.
///
/// Candidates are `template.r, template.r + 1, ...` with `v` and `s` fixed. The first `r` that
/// recovers to a public key is accepted. At most `max_iterations` candidates are tried; running
/// out is a [`FundingError::SearchExhausted`], as is `r` overflowing 256 bits.
///
/// The result depends only on `template`, so the same template always yields the same
/// transaction and sender.
pub fn derive_sender(template: &KeylessTx, max_iterations: u64) -> Result<KeylessTransaction> {
    let msg_hash = template.signature_hash();
    let mut r = template.r;
    let mut last_r = r;

    for iteration in 0..max_iterations {
        last_r = r;
        match recover_signer_from_prehash(&msg_hash, template.v, r, template.s) {
            Ok(sender) => {
                let tx = KeylessTx { r, ..template.clone() };
                let raw = tx.encoded();
                let hash = keccak256(&raw);
                debug!(%sender, %hash, iterations = iteration + 1, "Found keyless sender");
                return Ok(KeylessTransaction { tx, hash, sender, raw });
            }
            Err(err) => {
                trace!(%r, %err, "Rejected signature candidate");
                r = r.checked_add(U256::from(1)).ok_or(FundingError::SearchExhausted {
                    iterations: iteration + 1,
                    last_r,
                })?;
            }
        }
    }

    Err(FundingError::SearchExhausted { iterations: max_iterations, last_r })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decode_keyless_tx, recover_signer,
        tx::tests::{CREATE2_FACTORY_SIGNER, CREATE2_FACTORY_TX},
    };
    use alloy_primitives::bytes;

    fn template_with_r(r: U256) -> KeylessTx {
        KeylessTx {
            r,
            ..KeylessTx::template(
                1_000_000_000,
                100_000,
                U256::from(5),
                bytes!("6080604052"),
                SIGNATURE_SEED,
            )
        }
    }

    #[test]
    fn test_accepts_first_valid_candidate() {
        let template = decode_keyless_tx(CREATE2_FACTORY_TX).unwrap();
        let found = derive_sender(&template, 1).unwrap();

        assert_eq!(found.sender, CREATE2_FACTORY_SIGNER);
        assert_eq!(found.tx, template);
        assert_eq!(found.raw.as_ref(), CREATE2_FACTORY_TX);
        assert_eq!(found.hash, keccak256(CREATE2_FACTORY_TX));
    }

    #[test]
    fn test_retries_past_invalid_r() {
        // r = 0 is never a valid signature scalar
        let found = derive_sender(&template_with_r(U256::ZERO), 256).unwrap();

        assert!(found.tx.r >= U256::from(1));
        assert_eq!(found.tx.s, SIGNATURE_SEED);
        assert_eq!(recover_signer(&found.tx), Ok(found.sender));
        assert_eq!(decode_keyless_tx(&found.raw), Ok(found.tx.clone()));
    }

    #[test]
    fn test_is_deterministic() {
        let template = template_with_r(SIGNATURE_SEED);
        let first = derive_sender(&template, 256).unwrap();
        let second = derive_sender(&template, 256).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exhausts_iteration_bound() {
        let err = derive_sender(&template_with_r(U256::ZERO), 1).unwrap_err();
        assert_eq!(err, FundingError::SearchExhausted { iterations: 1, last_r: U256::ZERO });
    }

    #[test]
    fn test_zero_bound_tries_nothing() {
        let err = derive_sender(&template_with_r(SIGNATURE_SEED), 0).unwrap_err();
        assert_eq!(err, FundingError::SearchExhausted { iterations: 0, last_r: SIGNATURE_SEED });
    }

    #[test]
    fn test_r_overflow_is_fatal() {
        // U256::MAX exceeds the curve order and has no successor
        let err = derive_sender(&template_with_r(U256::MAX), 10).unwrap_err();
        assert_eq!(err, FundingError::SearchExhausted { iterations: 1, last_r: U256::MAX });
    }

    #[test]
    fn test_required_value_and_payee() {
        let found = derive_sender(&template_with_r(SIGNATURE_SEED), 256).unwrap();
        assert_eq!(
            found.required_value(),
            Ok(U256::from(5) + U256::from(100_000u64) * U256::from(1_000_000_000u64))
        );
        assert_eq!(found.payee_address(), found.sender.create(0));
    }
}
