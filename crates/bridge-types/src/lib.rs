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

#![warn(missing_docs)]
//! Types shared across the bridge client: transfers, statuses, addresses and
//! amount helpers.

mod env;

/// Starknet network names and chain ids.
pub mod network;
/// Private key wrapper that can be read from the environment.
pub mod private_key;
/// RPC url wrapper that can be read from the environment.
pub mod rpc_url;
/// Validated Starknet addresses.
pub mod starknet_address;
/// Toast (notification) kinds.
pub mod toast;
/// Transfers as shown in the transfer log.
pub mod transfer;
/// Cairo `u256` representation.
pub mod uint256;
/// Decimal amount parsing and formatting.
pub mod units;

pub use network::StarknetNetwork;
pub use starknet_address::StarknetAddress;
pub use toast::ToastType;
pub use transfer::{
    ConsumptionOrder, NetworkType, TransactionStatus, Transfer, TransferType,
};
pub use uint256::Uint256;

/// Starknet field element.
pub use starknet::core::types::Felt;

/// Formats a felt as a 0x prefixed hex string without leading zeros.
pub fn felt_to_hex(felt: &Felt) -> String {
    let digits = felt_to_fixed_hex(felt);
    let trimmed = digits[2..].trim_start_matches('0');
    if trimmed.is_empty() {
        String::from("0x0")
    } else {
        format!("0x{trimmed}")
    }
}

/// Formats a felt as a 0x prefixed, 64 digit hex string.
pub fn felt_to_fixed_hex(felt: &Felt) -> String {
    let digits: String = felt
        .to_bytes_be()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("0x{digits}")
}

/// Parses a 0x prefixed hex string (or a decimal string) into a felt.
pub fn parse_to_felt(value: &str) -> starkgate_bridge_utils::Result<Felt> {
    let parsed = if value.starts_with("0x") {
        Felt::from_hex(value)
    } else {
        Felt::from_dec_str(value)
    };
    parsed.map_err(|_| starkgate_bridge_utils::Error::InvalidFelt(value.to_owned()))
}
