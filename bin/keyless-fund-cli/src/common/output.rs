use std::{fs, path::Path};

use serde::Serialize;

use super::Result;

/// Writes `value` as pretty JSON to `path`, or to stdout without one.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}
