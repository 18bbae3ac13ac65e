use clap::Parser;

/// Main command enumeration for the keyless-fund CLI tool
#[derive(Parser, Debug)]
#[command(infer_subcommands = true, version = "0.1")]
pub enum MainCmd {
    /// Build a keyless funding tree for a list of payouts
    Build(crate::build::Cmd),
    /// Verify a funding tree report written by `build`
    Verify(crate::verify::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error raised by a subcommand
    #[error("{0}")]
    Cli(#[from] crate::common::CliError),
}

impl MainCmd {
    /// Execute the main command
    pub fn run(&self) -> Result<(), Error> {
        match self {
            Self::Build(cmd) => {
                cmd.run()?;
                Ok(())
            }
            Self::Verify(cmd) => {
                cmd.run()?;
                Ok(())
            }
        }
    }
}
