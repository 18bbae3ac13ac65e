//! Error types for building keyless funding trees.

use alloy_primitives::{Address, U256};

/// Errors produced while encoding, decoding, or recovering a keyless transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KeylessTxError {
    /// The transaction data is malformed (invalid RLP encoding)
    #[error("malformed transaction encoding")]
    MalformedEncoding,
    /// Bytes remain after the transaction's RLP list
    #[error("trailing bytes after transaction")]
    TrailingBytes,
    /// The transaction is not a contract creation (to address is not empty)
    #[error("transaction is not a contract creation")]
    NotContractCreation,
    /// The transaction is not pre-EIP-155 (v must be 27 or 28)
    #[error("transaction is not pre-EIP-155")]
    NotPreEIP155,
    /// Failed to recover signer from signature
    #[error("invalid signature")]
    InvalidSignature,
}

/// Errors produced while building or verifying a funding tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FundingError {
    /// There is nothing to fund.
    #[error("payout list is empty")]
    EmptyPayouts,
    /// The batch size cannot make progress.
    #[error("batch size {batch_size} is below the minimum of {min}")]
    InvalidBatchSize {
        /// The configured batch size
        batch_size: usize,
        /// The smallest accepted batch size for the operation
        min: usize,
    },
    /// The address and amount columns of a batch differ in length.
    #[error("batch has {addresses} addresses but {amounts} amounts")]
    BatchLengthMismatch {
        /// Number of addresses in the batch
        addresses: usize,
        /// Number of amounts in the batch
        amounts: usize,
    },
    /// A batch without payees.
    #[error("batch is empty")]
    EmptyBatch,
    /// No signature candidate produced a sender within the iteration bound.
    #[error("no keyless sender found after {iterations} candidates (last r = {last_r:#x})")]
    SearchExhausted {
        /// Number of candidates tried
        iterations: u64,
        /// The last `r` tried
        last_r: U256,
    },
    /// A value or gas reservation does not fit in 256 bits.
    #[error("value overflow")]
    ValueOverflow,
    /// A transaction's declared value differs from what its batch requires.
    #[error("declared value {declared} does not match expected {expected}")]
    ValueMismatch {
        /// The value carried by the transaction
        declared: U256,
        /// The value computed from its batch
        expected: U256,
    },
    /// A raw transaction recovers to a different sender than the one recorded for it.
    #[error("transaction {index} recovers to {recovered}, recorded sender is {recorded}")]
    SenderMismatch {
        /// Position of the transaction in the tree's ordering
        index: usize,
        /// The sender stored alongside the transaction
        recorded: Address,
        /// The sender recovered from the raw bytes
        recovered: Address,
    },
    /// A non-root sender is not paid exactly once by a parent transaction.
    #[error("sender {sender} of transaction {index} is funded {times} times")]
    FundingCount {
        /// Position of the transaction in the tree's ordering
        index: usize,
        /// The sender that should be funded
        sender: Address,
        /// How many parent payouts target the sender
        times: usize,
    },
    /// A non-root sender is paid something other than its requirement.
    #[error("sender {sender} is paid {paid}, requires {required}")]
    FundingAmount {
        /// The underfunded or overfunded sender
        sender: Address,
        /// The amount its parent transfers
        paid: U256,
        /// The amount it needs
        required: U256,
    },
    /// A transaction's raw bytes or hash disagree with its recorded fields.
    #[error("raw bytes of transaction {index} do not match its fields")]
    RawMismatch {
        /// Position of the transaction in the tree's ordering
        index: usize,
    },
    /// A transaction's init code does not deploy the payouts recorded for it.
    #[error("init code of transaction {index} does not pay its recorded payouts")]
    InitCodeMismatch {
        /// Position of the transaction in the tree's ordering
        index: usize,
    },
    /// A level does not pay the senders of the level below it, in order.
    #[error("level {level} does not fund the senders of the level below it")]
    LevelMismatch {
        /// The paying level
        level: usize,
    },
    /// The tree's shape is inconsistent with its transactions.
    #[error("malformed funding tree: {0}")]
    MalformedTree(&'static str),
    /// Encoding or recovery of a keyless transaction failed.
    #[error(transparent)]
    Tx(#[from] KeylessTxError),
}

/// Result type for funding tree operations.
pub type Result<T, E = FundingError> = core::result::Result<T, E>;
