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
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;
use starkgate_bridge_utils::{Error, Result};

/// A Cairo `u256`: two 128 bit limbs, serialized on the wire as `[low, high]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uint256 {
    /// The lower 128 bits.
    pub low: u128,
    /// The upper 128 bits.
    pub high: u128,
}

impl Uint256 {
    /// Builds a value from its limbs as felts (event data), failing when a
    /// limb does not fit in 128 bits.
    pub fn from_felts(low: &Felt, high: &Felt) -> Result<Self> {
        Ok(Self {
            low: felt_to_u128(low)?,
            high: felt_to_u128(high)?,
        })
    }

    /// The limbs as calldata: `[low, high]`.
    pub fn to_calldata(&self) -> [Felt; 2] {
        [Felt::from(self.low), Felt::from(self.high)]
    }
}

fn felt_to_u128(felt: &Felt) -> Result<u128> {
    let bytes = felt.to_bytes_be();
    let (upper, lower) = bytes.split_at(16);
    if upper.iter().any(|b| *b != 0) {
        return Err(Error::InvalidAmount(crate::felt_to_hex(felt)));
    }
    let mut limb = [0u8; 16];
    limb.copy_from_slice(lower);
    Ok(u128::from_be_bytes(limb))
}

impl From<U256> for Uint256 {
    fn from(value: U256) -> Self {
        Self {
            low: value.low_u128(),
            high: (value >> 128).low_u128(),
        }
    }
}

impl From<Uint256> for U256 {
    fn from(value: Uint256) -> Self {
        (U256::from(value.high) << 128) | U256::from(value.low)
    }
}
