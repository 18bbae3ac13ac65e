//! Payout file loading.
//!
//! A payout file is a JSON array whose entries are either `[address, amount]` pairs or
//! `{"address": ..., "amount": ...}` objects. Amounts are wei, given as an integer or as a
//! decimal or `0x`-prefixed string.

use std::{fs, path::Path, str::FromStr};

use alloy_primitives::{Address, U256};
use keyless_fund::Payout;
use serde_json::Value;

use super::{CliError, Result};

/// Parses a payout list from its JSON representation.
///
/// Integer amounts keep their full precision, so values above `u64::MAX` need not be quoted.
pub fn parse_payouts(json: &str) -> Result<Vec<Payout>> {
    let entries: Vec<Value> = serde_json::from_str(json)?;
    entries.into_iter().enumerate().map(|(index, entry)| parse_entry(index, entry)).collect()
}

fn parse_entry(index: usize, entry: Value) -> Result<Payout> {
    let (address, amount) = match entry {
        Value::Array(pair) => <[Value; 2]>::try_from(pair)
            .map(|[address, amount]| (address, amount))
            .map_err(|_| invalid_entry(index, "expected an [address, amount] pair"))?,
        Value::Object(mut object) => match (object.remove("address"), object.remove("amount")) {
            (Some(address), Some(amount)) => (address, amount),
            _ => return Err(invalid_entry(index, "expected `address` and `amount` fields")),
        },
        _ => return Err(invalid_entry(index, "expected an array or an object")),
    };

    let address: Address = serde_json::from_value(address)?;
    Ok(Payout::new(address, parse_amount(index, &amount)?))
}

fn parse_amount(index: usize, amount: &Value) -> Result<U256> {
    let text = match amount {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_owned(),
        _ => return Err(invalid_entry(index, "amount must be a number or a string")),
    };
    U256::from_str(&text).map_err(|e| {
        CliError::InvalidInput(format!("Invalid amount {text:?} in payout {index}: {e}"))
    })
}

fn invalid_entry(index: usize, reason: &str) -> CliError {
    CliError::InvalidInput(format!("Invalid payout {index}: {reason}"))
}

/// Loads a payout list from a JSON file.
pub fn load_payouts(path: &Path) -> Result<Vec<Payout>> {
    parse_payouts(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_parse_pairs_and_objects() {
        let payouts = parse_payouts(
            r#"[
                ["0x1111111111111111111111111111111111111111", "1000000000000000000000000"],
                ["0x2222222222222222222222222222222222222222", 42],
                {"address": "0x3333333333333333333333333333333333333333", "amount": "0x10"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            payouts,
            vec![
                Payout::new(
                    address!("1111111111111111111111111111111111111111"),
                    U256::from(10u128.pow(24))
                ),
                Payout::new(address!("2222222222222222222222222222222222222222"), U256::from(42)),
                Payout::new(address!("3333333333333333333333333333333333333333"), U256::from(16)),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_amount() {
        let err = parse_payouts(r#"[["0x1111111111111111111111111111111111111111", "ten"]]"#)
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_integers_beyond_u64() {
        let payouts = parse_payouts(
            r#"[
                ["0x1111111111111111111111111111111111111111", 18446744073709551616],
                {"address": "0x2222222222222222222222222222222222222222",
                 "amount": 1000000000000000000000000000000000000000000}
            ]"#,
        )
        .unwrap();

        assert_eq!(payouts[0].amount, U256::from(u64::MAX) + U256::from(1));
        assert_eq!(payouts[1].amount, U256::from(10u128.pow(21)) * U256::from(10u128.pow(21)));
    }

    #[test]
    fn test_parse_rejects_non_integer_amounts() {
        for amount in ["-1", "1.5", "1e3", "true"] {
            let json = format!(r#"[["0x1111111111111111111111111111111111111111", {amount}]]"#);
            let err = parse_payouts(&json).unwrap_err();
            assert!(matches!(err, CliError::InvalidInput(_)), "{amount}: {err}");
        }
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        for json in [
            r#"[["0x1111111111111111111111111111111111111111"]]"#,
            r#"[{"address": "0x1111111111111111111111111111111111111111"}]"#,
            r#"["0x1111111111111111111111111111111111111111"]"#,
        ] {
            assert!(matches!(parse_payouts(json), Err(CliError::InvalidInput(_))), "{json}");
        }
    }

    #[test]
    fn test_parse_rejects_bad_address() {
        let err = parse_payouts(r#"[["0x1234", "1"]]"#).unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }
}
