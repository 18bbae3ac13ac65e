use std::{path::PathBuf, time::Instant};

use alloy_primitives::{Address, Bytes, U256};
use clap::Parser;
use keyless_fund::{
    constants::{
        DEFAULT_BATCH_SIZE, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE, DEFAULT_MAX_SEARCH_ITERATIONS,
        SIGNATURE_SEED,
    },
    BatchTxBuilder, Execution, MultiTransferEncoder, SearchConfig, TreeBuilder, TxParams,
};
use tracing::{debug, info};

use super::{load_payouts, write_json, BytecodeArgs, LogArgs, Result};

/// Build a keyless funding tree
#[derive(Parser, Debug)]
pub struct Cmd {
    /// JSON file with the payouts, as `[address, amount]` pairs
    #[arg(long = "payouts", env = "KEYLESS_FUND_PAYOUTS")]
    pub payouts: PathBuf,

    /// Account allowed to call every payee contract
    #[arg(long = "authorized", env = "KEYLESS_FUND_AUTHORIZED")]
    pub authorized: Address,

    /// Payee contract creation bytecode
    #[command(flatten)]
    pub bytecode: BytecodeArgs,

    /// Number of payees per payee contract
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Gas price of every transaction, in wei
    #[arg(long = "gas-price", default_value_t = DEFAULT_GAS_PRICE)]
    pub gas_price: u128,

    /// Gas limit of every transaction
    #[arg(long = "gas-limit", default_value_t = DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Starting value of the signature components
    #[arg(long = "seed", default_value_t = SIGNATURE_SEED)]
    pub seed: U256,

    /// Maximum signature candidates tried per transaction
    #[arg(long = "max-iterations", default_value_t = DEFAULT_MAX_SEARCH_ITERATIONS)]
    pub max_iterations: u64,

    /// Search the batches of a level in parallel
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Write the funding tree to this file instead of stdout
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the build command
    pub fn run(&self) -> Result<()> {
        self.log_args.init()?;

        let payouts = load_payouts(&self.payouts)?;
        let creation_code = self.bytecode.load()?;
        debug!(payouts = payouts.len(), code_size = creation_code.len(), "Inputs loaded");

        info!(batch_size = self.batch_size, parallel = self.parallel, "Building funding tree");
        let start = Instant::now();
        let builder = self.tree_builder(creation_code);
        let tree = builder.build_tree(self.authorized, &payouts)?;
        info!(elapsed = ?start.elapsed(), transactions = tree.nodes().len(), "Funding tree built");

        tree.verify(builder.batch_builder().encoder())?;
        write_json(&tree, self.output.as_deref())?;

        if let Some(ref output) = self.output {
            println!("root sender:   {}", tree.root_sender());
            println!("root value:    {}", tree.root_value());
            println!("levels:        {:?}", tree.level_sizes());
            println!("transactions:  {}", tree.nodes().len());
            println!("written to:    {}", output.display());
        }
        Ok(())
    }

    /// The tree builder configured by the command line.
    pub fn tree_builder(&self, creation_code: Bytes) -> TreeBuilder<MultiTransferEncoder> {
        let batch = BatchTxBuilder::new(MultiTransferEncoder::new(creation_code))
            .with_params(TxParams { gas_price: self.gas_price, gas_limit: self.gas_limit })
            .with_search(SearchConfig { seed: self.seed, max_iterations: self.max_iterations });
        let execution = if self.parallel { Execution::Parallel } else { Execution::Sequential };
        TreeBuilder::new(batch, self.batch_size).with_execution(execution)
    }
}
