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
//! Shared building blocks for the StarkGate bridge client: the error type,
//! retry policies and the probe logging target.

use ethers::providers::ProviderError;

pub mod clickable_link;

/// A module used for tracing the bridge client lifecycle and sync state.
pub mod probe;
/// Retry functionality
pub mod retry;

/// Read only L1 client.
pub type L1Provider = ethers::providers::Provider<ethers::providers::Http>;

/// Wallet signed L1 client.
pub type L1SignerClient = ethers::middleware::SignerMiddleware<
    L1Provider,
    ethers::signers::LocalWallet,
>;

/// HTTP 429, the rate limit response code.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// An enum of all possible errors that could be encountered while talking to
/// the bridge contracts, the chains, or the transfer indexer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An Io error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON Error occurred.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Config loading error.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error while iterating over a glob pattern.
    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),
    /// Error from Glob Iterator.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    /// Error while parsing a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Reqwest error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// Error in Http Provider (ethers client).
    #[error(transparent)]
    EthersProvider(#[from] ProviderError),
    /// Smart contract error.
    #[error(transparent)]
    EthersContractCall(#[from] ethers::contract::ContractError<L1Provider>),
    /// Smart contract error.
    #[error(transparent)]
    EthersContractCallWithSigner(
        #[from] ethers::contract::ContractError<L1SignerClient>,
    ),
    /// Human readable ABI could not be parsed.
    #[error(transparent)]
    EthersAbiParse(#[from] ethers::abi::ParseError),
    /// Error while encoding a contract call.
    #[error(transparent)]
    EthersAbi(#[from] ethers::abi::AbiError),
    /// Ether wallet errors.
    #[error(transparent)]
    EtherWalletError(#[from] ethers::signers::WalletError),
    /// Ethers currency conversion error
    #[error(transparent)]
    Conversion(#[from] ethers::utils::ConversionError),
    /// Error returned by the Starknet JSON-RPC provider.
    #[error(transparent)]
    StarknetProvider(#[from] starknet::providers::ProviderError),
    /// Error returned by the Starknet account while executing calls.
    #[error("Starknet account error: {}", _0)]
    StarknetAccount(String),
    /// Generic error.
    #[error("{}", _0)]
    Generic(&'static str),
    /// Error while parsing the config files.
    #[error("Config parse error: {}", _0)]
    ParseConfig(#[from] serde_path_to_error::Error<config::ConfigError>),
    /// Token is not configured (or not enabled).
    #[error("Token Not Found: {}", symbol)]
    TokenNotFound {
        /// The token symbol.
        symbol: String,
    },
    /// Missing private key for the requested wallet.
    #[error("Missing required private-key in the config")]
    MissingSecrets,
    /// No account connected on the requested layer.
    #[error("No {} wallet connected", layer)]
    WalletNotConnected {
        /// `L1` or `L2`.
        layer: &'static str,
    },
    /// Value is not a valid Starknet address.
    #[error("Invalid Starknet address: {}", _0)]
    InvalidStarknetAddress(String),
    /// Value is not a valid Ethereum address.
    #[error("Invalid Ethereum address: {}", _0)]
    InvalidL1Address(String),
    /// Value is not a valid field element.
    #[error("Invalid felt: {}", _0)]
    InvalidFelt(String),
    /// Value is not a valid token amount.
    #[error("Invalid amount: {}", _0)]
    InvalidAmount(String),
    /// The indexer (or another HTTP backend) replied with a non success status.
    #[error("HTTP request to {} failed with status {}", url, status)]
    HttpStatus {
        /// Response status code.
        status: reqwest::StatusCode,
        /// The requested url.
        url: String,
    },
    /// A transaction was sent but dropped from the mempool.
    #[error("Transaction {} dropped from mempool", tx_hash)]
    TransactionDropped {
        /// Hash of the dropped transaction.
        tx_hash: String,
    },
    /// An optional section of the configuration is required for this call.
    #[error("Missing `{}` configuration", _0)]
    NotConfigured(&'static str),
}

impl Error {
    /// Returns `true` if the error is a rate limit response (HTTP 429) from
    /// any of the backends. Those are never retried.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::Reqwest(e) => is_too_many_requests(e.status()),
            Error::HttpStatus { status, .. } => {
                status.as_u16() == TOO_MANY_REQUESTS
            }
            Error::EthersProvider(e) => is_rate_limited_provider_error(e),
            Error::EthersContractCall(ethers::contract::ContractError::ProviderError { e })
            | Error::EthersContractCallWithSigner(
                ethers::contract::ContractError::ProviderError { e },
            ) => is_rate_limited_provider_error(e),
            Error::StarknetProvider(
                starknet::providers::ProviderError::RateLimited,
            ) => true,
            _ => false,
        }
    }
}

fn is_too_many_requests(status: Option<reqwest::StatusCode>) -> bool {
    status.map_or(false, |s| s.as_u16() == TOO_MANY_REQUESTS)
}

fn is_rate_limited_provider_error(err: &ProviderError) -> bool {
    match err {
        ProviderError::HTTPError(e) => is_too_many_requests(e.status()),
        ProviderError::JsonRpcClientError(e) => e
            .as_error_response()
            .map_or(false, |rpc| rpc.code == i64::from(TOO_MANY_REQUESTS)),
        _ => false,
    }
}

/// A type alias for the result for the bridge client, that uses the `Error` enum.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_is_rate_limited() {
        let err = Error::HttpStatus {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            url: String::from("https://indexer.example/transfers"),
        };
        assert!(err.is_rate_limited());
    }

    #[test]
    fn other_statuses_are_not_rate_limited() {
        let err = Error::HttpStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
            url: String::from("https://indexer.example/transfers"),
        };
        assert!(!err.is_rate_limited());
        assert!(!Error::Generic("boom").is_rate_limited());
    }

    #[test]
    fn starknet_rate_limit_is_detected() {
        let err = Error::from(starknet::providers::ProviderError::RateLimited);
        assert!(err.is_rate_limited());
    }
}
