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

//! # Bridge Configuration Module
//!
//! A module for configuring the bridge client.
//!
//! ## Overview
//!
//! Configuration is read from every `.toml`/`.json` file of a directory and
//! merged with `STARKGATE__`-prefixed environment variables. Possible sections:
//! * `l1`: the Ethereum side: rpc endpoint, wallet key and the Starknet core
//!   contract.
//! * `l2`: the Starknet side: network, rpc endpoint, account and key.
//! * `tokens`: bridged tokens, keyed by symbol.
//! * `indexer`: the transfer history backend.
//! * `queries` / `events`: polling intervals, retries and event paging.
//! * `teleport` / `auto-withdrawal`: optional DAI teleport and relayer fee.

/// CLI configuration
#[cfg(feature = "cli")]
pub mod cli;
/// Default values for the configuration.
pub mod defaults;
/// L1 (Ethereum) configuration
pub mod l1;
/// L2 (Starknet) configuration
pub mod l2;
/// Query, retry and event paging configuration
pub mod queries;
/// Teleport and auto withdrawal configuration
pub mod teleport;
/// Bridged tokens configuration
pub mod token;
/// Utils for processing configuration
pub mod utils;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use l1::L1ChainConfig;
use l2::L2ChainConfig;
use queries::{EventsConfig, QueriesConfig};
use teleport::{AutoWithdrawalConfig, TeleportConfig};
use token::TokenConfig;

/// BridgeConfig is the configuration for the bridge client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BridgeConfig {
    /// The Ethereum side.
    pub l1: L1ChainConfig,
    /// The Starknet side.
    pub l2: L2ChainConfig,
    /// Bridged tokens, a map between the token symbol and its configuration.
    #[serde(default)]
    pub tokens: HashMap<String, TokenConfig>,
    /// Transfer history backend.
    #[serde(default)]
    pub indexer: Option<IndexerConfig>,
    /// Polling intervals and retries of the transfer log queries.
    #[serde(default)]
    pub queries: QueriesConfig,
    /// Paging of the L2 event queries.
    #[serde(default)]
    pub events: EventsConfig,
    /// DAI teleport, only needed for `initiate-teleport` and `request-mint`.
    #[serde(default)]
    pub teleport: Option<TeleportConfig>,
    /// Relayer paid withdrawals, only needed for auto withdrawals.
    #[serde(default)]
    pub auto_withdrawal: Option<AutoWithdrawalConfig>,
}

impl BridgeConfig {
    /// Makes sure that the config is valid, by going
    /// through the whole config and doing some basic checks.
    pub fn verify(&self) -> starkgate_bridge_utils::Result<()> {
        if self.tokens.is_empty() {
            return Err(starkgate_bridge_utils::Error::Generic(
                "At least one enabled token must be configured",
            ));
        }
        if self.queries.max_retry > defaults::MAX_QUERY_RETRY {
            tracing::warn!(
                max_retry = self.queries.max_retry,
                "a large retry count keeps failing queries busy for long"
            );
        }
        if let Some(teleport) = &self.teleport {
            if !(teleport.fee_multiplier >= 0.0) {
                return Err(starkgate_bridge_utils::Error::Generic(
                    "teleport fee-multiplier must be a positive number",
                ));
            }
        }
        Ok(())
    }

    /// Looks up an enabled token by symbol (case insensitive).
    pub fn token(
        &self,
        symbol: &str,
    ) -> starkgate_bridge_utils::Result<&TokenConfig> {
        self.tokens.get(&symbol.to_uppercase()).ok_or_else(|| {
            starkgate_bridge_utils::Error::TokenNotFound {
                symbol: symbol.to_owned(),
            }
        })
    }

    /// Tokens sorted by symbol, for a stable iteration order.
    pub fn tokens_sorted(&self) -> Vec<&TokenConfig> {
        let mut tokens = self.tokens.values().collect::<Vec<_>>();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }
}

/// IndexerConfig is the configuration of the transfer history backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerConfig {
    /// Base url of the indexer API.
    pub api_url: url::Url,
    /// Request timeout in milliseconds.
    #[serde(default = "defaults::indexer_timeout")]
    pub timeout: u64,
}
