// Copyright 2024 StarkGate Bridge Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use ethers::types::U256;
use ethers::utils::{format_units, parse_units};
use starkgate_bridge_utils::{Error, Result};

use crate::Uint256;

/// Default decimals of ETH and most bridged ERC20 tokens.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Converts a human amount (`"1.5"`) into base units.
pub fn parse_to_decimals(amount: &str, decimals: u32) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') {
        return Err(Error::InvalidAmount(amount.to_owned()));
    }
    let parsed = parse_units(amount, decimals)
        .map_err(|_| Error::InvalidAmount(amount.to_owned()))?;
    Ok(parsed.into())
}

/// Converts base units into a human amount, trimming trailing zeros but
/// always keeping one fractional digit (`1000000000000000000` → `"1.0"`).
pub fn parse_from_decimals(value: U256, decimals: u32) -> Result<String> {
    let formatted = format_units(value, decimals)?;
    Ok(trim_fraction(formatted))
}

/// Converts a human amount straight into a Cairo `u256`.
pub fn parse_to_uint256(amount: &str, decimals: u32) -> Result<Uint256> {
    parse_to_decimals(amount, decimals).map(Uint256::from)
}

fn trim_fraction(formatted: String) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => format!("{formatted}.0"),
    }
}
