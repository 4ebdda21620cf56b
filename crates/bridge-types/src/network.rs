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

use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;

/// The Starknet networks the bridge can be configured for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StarknetNetwork {
    /// Starknet mainnet.
    Main,
    /// The deprecated Goerli testnet, also the fallback for unknown names.
    #[default]
    Goerli,
    /// The Sepolia testnet.
    Sepolia,
}

impl StarknetNetwork {
    /// Maps an environment name to a network; unknown names map to Goerli.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Self::Main,
            "sepolia" => Self::Sepolia,
            _ => Self::Goerli,
        }
    }

    /// The network name as used by starknet tooling.
    pub const fn network_name(&self) -> &'static str {
        match self {
            Self::Main => "SN_MAIN",
            Self::Goerli => "SN_GOERLI",
            Self::Sepolia => "SN_SEPOLIA",
        }
    }

    /// The chain id, the network name encoded as a short string.
    pub fn chain_id(&self) -> Felt {
        Felt::from_bytes_be_slice(self.network_name().as_bytes())
    }
}

impl<'de> Deserialize<'de> for StarknetNetwork {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}
