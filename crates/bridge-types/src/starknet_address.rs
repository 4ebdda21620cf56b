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

use std::str::FromStr;

use ethers::types::U256;
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;
use starkgate_bridge_utils::Error;

/// Addresses must be strictly lower than `2^251 - 256`.
pub const STARKNET_ADDRESS_LIMIT: &str =
    "0x7ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff00";

fn address_limit() -> Felt {
    Felt::from_hex_unchecked(STARKNET_ADDRESS_LIMIT)
}

/// A Starknet contract or account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StarknetAddress(Felt);

impl StarknetAddress {
    /// Validates `felt` as an address.
    pub fn new(felt: Felt) -> Result<Self, Error> {
        if felt < address_limit() {
            Ok(Self(felt))
        } else {
            Err(Error::InvalidStarknetAddress(crate::felt_to_hex(&felt)))
        }
    }

    /// The address as a field element.
    pub const fn felt(&self) -> Felt {
        self.0
    }

    /// The address as a 256 bit word, as packed into L1 messages.
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0.to_bytes_be())
    }

    /// The 0x prefixed, 64 digit hex representation.
    pub fn to_fixed_hex_string(&self) -> String {
        crate::felt_to_fixed_hex(&self.0)
    }
}

impl FromStr for StarknetAddress {
    type Err = Error;

    /// Parses a strict hex (`0x` prefixed) address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("0x") {
            return Err(Error::InvalidStarknetAddress(s.to_owned()));
        }
        let felt = Felt::from_hex(s)
            .map_err(|_| Error::InvalidStarknetAddress(s.to_owned()))?;
        Self::new(felt)
    }
}

impl From<StarknetAddress> for Felt {
    fn from(address: StarknetAddress) -> Self {
        address.0
    }
}

impl std::fmt::Display for StarknetAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_fixed_hex_string())
    }
}

impl std::fmt::Debug for StarknetAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StarknetAddress({self})")
    }
}

impl Serialize for StarknetAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_fixed_hex_string())
    }
}

impl<'de> Deserialize<'de> for StarknetAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let value = crate::env::resolve(&raw).map_err(serde::de::Error::custom)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses `address` as a Starknet address, returning `None` for anything
/// that is not a strict hex string within the address range.
pub fn to_starknet_address(address: &str) -> Option<StarknetAddress> {
    address.parse().ok()
}
