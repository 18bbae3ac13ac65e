//! Creation payloads for payee contracts.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;

/// Builds the init code of a payee contract that forwards its value to a batch of payees.
///
/// Implementations are handed to [`BatchTxBuilder`](crate::BatchTxBuilder) explicitly; the
/// builder never reaches for a process-wide encoder.
pub trait DeployEncoder {
    /// Returns the init code deploying a payee contract that pays `amounts[i]` to `addresses[i]`
    /// and that `authorized` may call.
    fn encode_deploy(
        &self,
        authorized: Address,
        addresses: &[Address],
        amounts: &[U256],
    ) -> Bytes;
}

impl<T: DeployEncoder + ?Sized> DeployEncoder for &T {
    fn encode_deploy(
        &self,
        authorized: Address,
        addresses: &[Address],
        amounts: &[U256],
    ) -> Bytes {
        (**self).encode_deploy(authorized, addresses, amounts)
    }
}

/// Encoder for a contract with constructor
/// `constructor(address account, address[] addresses, uint256[] amounts) payable`.
///
/// The init code is the compiled creation bytecode followed by the ABI-encoded constructor
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTransferEncoder {
    creation_code: Bytes,
}

impl MultiTransferEncoder {
    /// Creates an encoder for the given compiled creation bytecode.
    pub const fn new(creation_code: Bytes) -> Self {
        Self { creation_code }
    }

    /// The compiled creation bytecode.
    pub const fn creation_code(&self) -> &Bytes {
        &self.creation_code
    }
}

impl DeployEncoder for MultiTransferEncoder {
    fn encode_deploy(
        &self,
        authorized: Address,
        addresses: &[Address],
        amounts: &[U256],
    ) -> Bytes {
        let args = (authorized, addresses.to_vec(), amounts.to_vec()).abi_encode_params();
        let mut init_code = Vec::with_capacity(self.creation_code.len() + args.len());
        init_code.extend_from_slice(&self.creation_code);
        init_code.extend_from_slice(&args);
        init_code.into()
    }
}
