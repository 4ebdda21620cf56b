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


use ethers::types::Address;
use serde::{Deserialize, Serialize};
use starkgate_bridge_types::{private_key::PrivateKey, rpc_url::RpcUrl};

use crate::defaults;

/// L1ChainConfig is the configuration of the Ethereum side of the bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct L1ChainConfig {
    /// String that groups configuration for this chain on a human-readable name.
    pub name: String,
    /// chain specific id (output of chainId opcode on EVM networks)
    #[serde(rename(serialize = "chainId"))]
    pub chain_id: u64,
    /// Http(s) Endpoint for quick Req/Res
    #[serde(skip_serializing)]
    pub http_endpoint: RpcUrl,
    /// Block Explorer for this chain.
    ///
    /// Optional, and only used for printing a clickable links
    /// for transactions.
    #[serde(skip_serializing, default)]
    pub explorer: Option<url::Url>,
    /// The Private Key of the connected Ethereum account.
    /// the format is more dynamic here:
    /// 1. if it starts with '0x' then this would be raw (64 bytes) hex encoded
    ///    private key.
    ///    Example: 0x8917174396171783496173419137618235192359106130478137647163400318
    ///
    /// 2. if it starts with '$' then it would be considered as an Enviroment variable
    ///    of a hex-encoded private key.
    ///   Example: $ETHEREUM_PRIVATE_KEY
    ///
    /// Without a key, only read-only commands are available.
    #[serde(skip_serializing, default)]
    pub private_key: Option<PrivateKey>,
    /// A read-only Ethereum account to watch when no private key is set.
    #[serde(default)]
    pub account: Option<Address>,
    /// The Starknet core contract, which tracks L2 to L1 messages.
    pub core_contract: Address,
    /// Number of confirmations to wait for L1 transactions.
    #[serde(default = "defaults::confirmations")]
    pub confirmations: usize,
}
