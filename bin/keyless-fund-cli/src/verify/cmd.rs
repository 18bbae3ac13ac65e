use std::{fs, path::PathBuf};

use alloy_primitives::Address;
use clap::Parser;
use keyless_fund::{FundingTree, MultiTransferEncoder};
use tracing::info;

use super::{BytecodeArgs, CliError, LogArgs, Result};

/// Verify a funding tree report
#[derive(Parser, Debug)]
pub struct Cmd {
    /// JSON file written by `keyless-fund build`
    #[arg(long = "tree")]
    pub tree: PathBuf,

    /// Payee contract creation bytecode the tree was built with
    #[command(flatten)]
    pub bytecode: BytecodeArgs,

    /// Expected authorized account. Defaults to the one recorded in the report
    #[arg(long = "authorized")]
    pub authorized: Option<Address>,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the verify command
    pub fn run(&self) -> Result<()> {
        self.log_args.init()?;

        let tree: FundingTree = serde_json::from_str(&fs::read_to_string(&self.tree)?)?;
        if let Some(authorized) = self.authorized.filter(|account| *account != tree.authorized()) {
            return Err(CliError::InvalidInput(format!(
                "report is authorized for {}, expected {authorized}",
                tree.authorized()
            )));
        }

        let encoder = MultiTransferEncoder::new(self.bytecode.load()?);
        info!(transactions = tree.nodes().len(), "Verifying funding tree");
        tree.verify(&encoder)?;

        println!("funding tree OK");
        println!("authorized:    {}", tree.authorized());
        println!("root sender:   {}", tree.root_sender());
        println!("root value:    {}", tree.root_value());
        println!("transactions:  {}", tree.nodes().len());
        Ok(())
    }
}
