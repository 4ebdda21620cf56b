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
use starkgate_bridge_types::{
    private_key::PrivateKey, rpc_url::RpcUrl, StarknetAddress,
    StarknetNetwork,
};

/// L2ChainConfig is the configuration of the Starknet side of the bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct L2ChainConfig {
    /// The Starknet network, one of `main`, `goerli` or `sepolia`.
    /// Unknown names fall back to `goerli`.
    #[serde(default)]
    pub network: StarknetNetwork,
    /// Starknet JSON-RPC endpoint.
    #[serde(skip_serializing)]
    pub rpc_endpoint: RpcUrl,
    /// Block Explorer for this network, used for clickable links.
    #[serde(skip_serializing, default)]
    pub explorer: Option<url::Url>,
    /// The connected Starknet account contract.
    #[serde(default)]
    pub account_address: Option<StarknetAddress>,
    /// The stark key of the connected account, same formats as the L1 key.
    #[serde(skip_serializing, default)]
    pub private_key: Option<PrivateKey>,
    /// The L2 ETH token, used to pay the auto withdrawal relayer fee.
    #[serde(default)]
    pub eth_token_address: Option<StarknetAddress>,
}
