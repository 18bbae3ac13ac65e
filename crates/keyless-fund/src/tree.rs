//! Recursive keyless funding trees.
//!
//! Level 0 deploys one payee contract per batch of the original payouts. Every level after that
//! treats the previous level's keyless senders, each paired with its funding requirement, as its
//! payouts. Construction stops at the first level consisting of a single transaction: the root.
//! Funding the root sender and relaying the transactions from the root downwards pays every
//! original payout.

use alloy_primitives::{keccak256, map::HashMap, Address, U256};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    batch_count, decode_keyless_tx, partition, recover_signer, required_value, total_amount,
    BatchTxBuilder, DeployEncoder, Execution, FundingError, KeylessTransaction, Payout, Result,
};

/// One transaction of a funding tree together with the payouts it delivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingNode {
    /// Level of the transaction, 0 for the batches of the original payouts
    pub level: usize,
    /// The payouts made by the deployed payee contract
    pub payouts: Vec<Payout>,
    /// The keyless deployment transaction
    pub transaction: KeylessTransaction,
    /// The exact balance the transaction's sender needs
    pub required_value: U256,
}

/// A complete keyless funding tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingTree {
    authorized: Address,
    root_sender: Address,
    root_value: U256,
    level_sizes: Vec<usize>,
    nodes: Vec<FundingNode>,
}

impl FundingTree {
    /// The account allowed to call every payee contract of the tree.
    pub const fn authorized(&self) -> Address {
        self.authorized
    }

    /// The only address that has to be funded from outside the tree.
    pub const fn root_sender(&self) -> Address {
        self.root_sender
    }

    /// The exact amount the root sender has to receive.
    pub const fn root_value(&self) -> U256 {
        self.root_value
    }

    /// All nodes, level 0 first, batch order preserved within a level. The root is last.
    pub fn nodes(&self) -> &[FundingNode] {
        &self.nodes
    }

    /// All transactions in node order.
    pub fn transactions(&self) -> impl Iterator<Item = &KeylessTransaction> + '_ {
        self.nodes.iter().map(|node| &node.transaction)
    }

    /// Number of levels, including the root level.
    pub fn depth(&self) -> usize {
        self.level_sizes.len()
    }

    /// Number of transactions per level.
    pub fn level_sizes(&self) -> &[usize] {
        &self.level_sizes
    }

    /// The nodes of `level`, or an empty slice past the root.
    pub fn level(&self, level: usize) -> &[FundingNode] {
        let Some(&len) = self.level_sizes.get(level) else { return &[] };
        let Some(start) = checked_total(&self.level_sizes[..level]) else { return &[] };
        start.checked_add(len).and_then(|end| self.nodes.get(start..end)).unwrap_or_default()
    }

    /// Splits the tree into the root sender, the root's required value, and the ordered
    /// transactions.
    pub fn into_parts(self) -> (Address, U256, Vec<KeylessTransaction>) {
        let transactions = self.nodes.into_iter().map(|node| node.transaction).collect();
        (self.root_sender, self.root_value, transactions)
    }

    /// Re-checks the tree from its raw transactions.
    ///
    /// Every raw transaction must decode to its recorded fields and hash and recover to its
    /// recorded sender. Its value must equal the sum of its payouts and its requirement must be
    /// `value + gas_limit * gas_price`. Its init code must be what `encoder` produces for the
    /// tree's authorized account and the node's payouts. Every sender except the root's must be
    /// paid exactly its requirement by exactly one transaction of the next level, and nothing may
    /// pay the root. Level `k + 1` pays the senders of level `k` in their order.
    pub fn verify<E: DeployEncoder>(&self, encoder: &E) -> Result<()> {
        self.verify_shape()?;

        let mut payments: HashMap<Address, (usize, U256)> = HashMap::default();
        for payout in self.nodes.iter().filter(|node| node.level > 0).flat_map(|n| &n.payouts) {
            let entry = payments.entry(payout.address).or_insert((0, U256::ZERO));
            entry.0 += 1;
            entry.1 = payout.amount;
        }

        let root_index = self.nodes.len() - 1;
        for (index, node) in self.nodes.iter().enumerate() {
            let transaction = &node.transaction;
            let decoded = decode_keyless_tx(&transaction.raw)?;
            if decoded != transaction.tx || keccak256(&transaction.raw) != transaction.hash {
                return Err(FundingError::RawMismatch { index });
            }

            let recovered = recover_signer(&decoded)?;
            if recovered != transaction.sender {
                return Err(FundingError::SenderMismatch {
                    index,
                    recorded: transaction.sender,
                    recovered,
                });
            }

            let expected = total_amount(&node.payouts)?;
            if decoded.value != expected {
                return Err(FundingError::ValueMismatch { declared: decoded.value, expected });
            }
            let required = required_value(&decoded)?;
            if node.required_value != required {
                return Err(FundingError::ValueMismatch {
                    declared: node.required_value,
                    expected: required,
                });
            }

            let (addresses, amounts): (Vec<Address>, Vec<U256>) =
                node.payouts.iter().map(|payout| (payout.address, payout.amount)).unzip();
            if encoder.encode_deploy(self.authorized, &addresses, &amounts) != decoded.init_code {
                return Err(FundingError::InitCodeMismatch { index });
            }

            let (times, paid) = payments.get(&transaction.sender).copied().unwrap_or_default();
            let expected_times = usize::from(index != root_index);
            if times != expected_times {
                return Err(FundingError::FundingCount {
                    index,
                    sender: transaction.sender,
                    times,
                });
            }
            if times == 1 && paid != required {
                return Err(FundingError::FundingAmount {
                    sender: transaction.sender,
                    paid,
                    required,
                });
            }
        }

        let root = &self.nodes[root_index];
        if root.transaction.sender != self.root_sender {
            return Err(FundingError::SenderMismatch {
                index: root_index,
                recorded: self.root_sender,
                recovered: root.transaction.sender,
            });
        }
        if root.required_value != self.root_value {
            return Err(FundingError::ValueMismatch {
                declared: self.root_value,
                expected: root.required_value,
            });
        }

        for level in 1..self.depth() {
            let expected = self
                .level(level - 1)
                .iter()
                .map(|node| Payout::new(node.transaction.sender, node.required_value));
            let paid = self.level(level).iter().flat_map(|node| &node.payouts).copied();
            if !expected.eq(paid) {
                return Err(FundingError::LevelMismatch { level });
            }
        }
        Ok(())
    }

    fn verify_shape(&self) -> Result<()> {
        if self.level_sizes.last() != Some(&1) {
            return Err(FundingError::MalformedTree("last level must hold exactly the root"));
        }
        if checked_total(&self.level_sizes) != Some(self.nodes.len()) {
            return Err(FundingError::MalformedTree("level sizes do not cover the nodes"));
        }
        for (level, &size) in self.level_sizes.iter().enumerate() {
            if size == 0 {
                return Err(FundingError::MalformedTree("empty level"));
            }
            if self.level(level).iter().any(|node| node.level != level) {
                return Err(FundingError::MalformedTree("nodes are not ordered level-first"));
            }
        }
        Ok(())
    }
}

fn checked_total(sizes: &[usize]) -> Option<usize> {
    sizes.iter().try_fold(0usize, |total, &size| total.checked_add(size))
}

/// Builds funding trees out of keyless batch transactions.
#[derive(Debug, Clone)]
pub struct TreeBuilder<E> {
    batch: BatchTxBuilder<E>,
    batch_size: usize,
    execution: Execution,
}

impl<E: DeployEncoder + Sync> TreeBuilder<E> {
    /// Smallest batch size for which the tree shrinks from level to level.
    pub const MIN_BATCH_SIZE: usize = 2;

    /// Creates a tree builder deploying up to `batch_size` payees per payee contract.
    pub fn new(batch: BatchTxBuilder<E>, batch_size: usize) -> Self {
        Self { batch, batch_size, execution: Execution::default() }
    }

    /// Sets how batches of one level are scheduled.
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// The batch transaction builder.
    pub const fn batch_builder(&self) -> &BatchTxBuilder<E> {
        &self.batch
    }

    /// The number of payees per payee contract.
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Builds the funding tree delivering `payouts`, with `authorized` allowed to call every
    /// payee contract.
    ///
    /// Rejects an empty payout list and a batch size below [`Self::MIN_BATCH_SIZE`] before any
    /// search starts. A batch size of 1 would never shrink a level.
    pub fn build_tree(&self, authorized: Address, payouts: &[Payout]) -> Result<FundingTree> {
        if self.batch_size < Self::MIN_BATCH_SIZE {
            return Err(FundingError::InvalidBatchSize {
                batch_size: self.batch_size,
                min: Self::MIN_BATCH_SIZE,
            });
        }
        if payouts.is_empty() {
            return Err(FundingError::EmptyPayouts);
        }

        let mut nodes = Vec::new();
        let mut level_sizes = Vec::new();
        let mut current = payouts.to_vec();

        loop {
            let level = level_sizes.len();
            let batches = partition(&current, self.batch_size)?;
            info!(
                level,
                payouts = current.len(),
                batches = batches.len(),
                "Building funding tree level"
            );

            let built = self.build_level(authorized, &batches)?;
            let next: Vec<Payout> = built
                .iter()
                .map(|(transaction, required)| Payout::new(transaction.sender, *required))
                .collect();

            level_sizes.push(built.len());
            nodes.extend(batches.into_iter().zip(built).map(
                |(batch, (transaction, required_value))| FundingNode {
                    level,
                    payouts: batch.to_vec(),
                    transaction,
                    required_value,
                },
            ));

            if let [root] = next.as_slice() {
                info!(
                    root_sender = %root.address,
                    root_value = %root.amount,
                    transactions = nodes.len(),
                    depth = level_sizes.len(),
                    "Funding tree complete"
                );
                return Ok(FundingTree {
                    authorized,
                    root_sender: root.address,
                    root_value: root.amount,
                    level_sizes,
                    nodes,
                });
            }
            debug_assert_eq!(next.len(), batch_count(current.len(), self.batch_size));
            current = next;
        }
    }

    fn build_level(
        &self,
        authorized: Address,
        batches: &[&[Payout]],
    ) -> Result<Vec<(KeylessTransaction, U256)>> {
        let build = |batch: &&[Payout]| -> Result<(KeylessTransaction, U256)> {
            let transaction = self.batch.build_payouts_tx(authorized, batch)?;
            let required = transaction.required_value()?;
            debug!(sender = %transaction.sender, %required, payees = batch.len(), "Built batch");
            Ok((transaction, required))
        };

        match self.execution {
            Execution::Sequential => batches.iter().map(build).collect(),
            Execution::Parallel => batches.par_iter().map(build).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MultiTransferEncoder, TxParams};
    use alloy_primitives::bytes;

    fn encoder() -> MultiTransferEncoder {
        MultiTransferEncoder::new(bytes!("6080604052"))
    }

    fn tree_builder(batch_size: usize) -> TreeBuilder<MultiTransferEncoder> {
        let batch = BatchTxBuilder::new(encoder())
            .with_params(TxParams { gas_price: 7, gas_limit: 100 });
        TreeBuilder::new(batch, batch_size)
    }

    fn payouts(n: u8) -> Vec<Payout> {
        (1..=n).map(|i| Payout::new(Address::repeat_byte(i), U256::from(i))).collect()
    }

    #[test]
    fn test_level_slices() {
        let tree = tree_builder(2).build_tree(Address::ZERO, &payouts(5)).unwrap();
        assert_eq!(tree.level_sizes(), &[3, 2, 1]);
        assert_eq!(tree.level(0).len(), 3);
        assert_eq!(tree.level(1).len(), 2);
        assert_eq!(tree.level(2).len(), 1);
        assert!(tree.level(3).is_empty());
        assert_eq!(tree.level(2)[0].transaction.sender, tree.root_sender());
    }

    #[test]
    fn test_into_parts_keeps_order() {
        let tree = tree_builder(2).build_tree(Address::ZERO, &payouts(3)).unwrap();
        let hashes: Vec<_> = tree.transactions().map(|tx| tx.hash).collect();
        let (root_sender, root_value, transactions) = tree.clone().into_parts();
        assert_eq!(root_sender, tree.root_sender());
        assert_eq!(root_value, tree.root_value());
        assert_eq!(transactions.iter().map(|tx| tx.hash).collect::<Vec<_>>(), hashes);
    }

    #[test]
    fn test_verify_detects_sender_tampering() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(4)).unwrap();
        assert_eq!(tree.verify(&encoder()), Ok(()));

        let recovered = tree.nodes[0].transaction.sender;
        tree.nodes[0].transaction.sender = Address::repeat_byte(0xee);
        assert_eq!(
            tree.verify(&encoder()),
            Err(FundingError::SenderMismatch {
                index: 0,
                recorded: Address::repeat_byte(0xee),
                recovered,
            })
        );
    }

    #[test]
    fn test_verify_detects_underfunded_child() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(3)).unwrap();
        let child = tree.nodes[0].clone();
        let root = tree.nodes.len() - 1;
        assert_eq!(tree.nodes[root].payouts[0].address, child.transaction.sender);
        tree.nodes[root].payouts[0].amount -= U256::from(1);
        assert_eq!(
            tree.verify(&encoder()),
            Err(FundingError::FundingAmount {
                sender: child.transaction.sender,
                paid: child.required_value - U256::from(1),
                required: child.required_value,
            })
        );
    }

    #[test]
    fn test_verify_detects_raw_tampering() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(2)).unwrap();
        tree.nodes[0].transaction.tx.gas_price += 1;
        assert_eq!(tree.verify(&encoder()), Err(FundingError::RawMismatch { index: 0 }));
    }

    #[test]
    fn test_verify_detects_amount_shifted_between_payees() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(4)).unwrap();
        tree.nodes[0].payouts[0].amount += U256::from(1);
        tree.nodes[0].payouts[1].amount -= U256::from(1);
        assert_eq!(tree.verify(&encoder()), Err(FundingError::InitCodeMismatch { index: 0 }));
    }

    #[test]
    fn test_verify_detects_redirected_payee() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(4)).unwrap();
        tree.nodes[0].payouts[0].address = Address::repeat_byte(0xee);
        assert_eq!(tree.verify(&encoder()), Err(FundingError::InitCodeMismatch { index: 0 }));
    }

    #[test]
    fn test_verify_detects_foreign_authorized_account() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(2)).unwrap();
        tree.authorized = Address::repeat_byte(0xaa);
        assert_eq!(tree.verify(&encoder()), Err(FundingError::InitCodeMismatch { index: 0 }));
    }

    #[test]
    fn test_verify_detects_wrong_creation_code() {
        let tree = tree_builder(2).build_tree(Address::ZERO, &payouts(2)).unwrap();
        let other = MultiTransferEncoder::new(bytes!("60806040"));
        assert_eq!(tree.verify(&other), Err(FundingError::InitCodeMismatch { index: 0 }));
    }

    #[test]
    fn test_verify_detects_reordered_level() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(5)).unwrap();
        assert_eq!(tree.level_sizes(), &[3, 2, 1]);
        tree.nodes.swap(3, 4);
        assert_eq!(tree.verify(&encoder()), Err(FundingError::LevelMismatch { level: 1 }));
    }

    #[test]
    fn test_overflowing_level_sizes_are_malformed() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(3)).unwrap();
        tree.level_sizes = vec![usize::MAX, 2, 1];
        assert!(matches!(tree.verify(&encoder()), Err(FundingError::MalformedTree(_))));
        assert!(tree.level(1).is_empty());
        assert!(tree.level(2).is_empty());
    }

    #[test]
    fn test_verify_detects_bad_shape() {
        let mut tree = tree_builder(2).build_tree(Address::ZERO, &payouts(3)).unwrap();
        tree.level_sizes = vec![3, 1];
        assert!(matches!(tree.verify(&encoder()), Err(FundingError::MalformedTree(_))));
    }

    #[test]
    fn test_rejects_configuration_before_search() {
        assert_eq!(
            tree_builder(1).build_tree(Address::ZERO, &payouts(3)),
            Err(FundingError::InvalidBatchSize { batch_size: 1, min: 2 })
        );
        assert_eq!(
            tree_builder(0).build_tree(Address::ZERO, &payouts(3)),
            Err(FundingError::InvalidBatchSize { batch_size: 0, min: 2 })
        );
        assert_eq!(tree_builder(2).build_tree(Address::ZERO, &[]), Err(FundingError::EmptyPayouts));
    }
}
