//! Payee contract creation bytecode arguments.

use std::{fs, io::Read, str::FromStr};

use alloy_primitives::Bytes;
use clap::Args;

use super::{CliError, Result};

/// Source of the payee contract creation bytecode
#[derive(Args, Debug, Clone, Default)]
pub struct BytecodeArgs {
    /// Creation bytecode of the payee contract (hex string)
    #[arg(long = "bytecode", conflicts_with = "bytecode_file")]
    pub bytecode: Option<String>,

    /// File containing the payee contract creation bytecode. If '-' is specified, it is read
    /// from stdin
    #[arg(long = "bytecode.file", visible_aliases = ["bytecode-file"])]
    pub bytecode_file: Option<String>,
}

impl BytecodeArgs {
    /// Loads the creation bytecode. Fails if neither source is given or the code is empty.
    pub fn load(&self) -> Result<Bytes> {
        let text = match (&self.bytecode, self.bytecode_file.as_deref()) {
            (Some(hex), _) => hex.clone(),
            (None, Some("-")) => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
            (None, Some(path)) => fs::read_to_string(path)?,
            (None, None) => return Err(missing_bytecode()),
        };

        let code = Bytes::from_str(text.trim())?;
        if code.is_empty() {
            return Err(missing_bytecode());
        }
        Ok(code)
    }
}

fn missing_bytecode() -> CliError {
    CliError::InvalidInput(
        "payee contract bytecode is required (--bytecode or --bytecode.file)".into(),
    )
}
