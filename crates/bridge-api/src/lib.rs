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
//! # Bridge Contract API
//!
//! Calls into the bridge contracts on both layers.
//!
//! L1 calls go through an ethers contract bound to the token bridge (or the
//! teleport oracle auth contract). Transactions are dry-run first and then
//! sent, waiting for the configured number of confirmations.
//!
//! L2 calls are batches of `(contract, entrypoint, calldata)` executed by the
//! connected Starknet account, see [`l2::L2Submitter`].

mod api;
/// Relayer gas cost lookup for auto withdrawals.
pub mod gas_cost;
/// L1 (Ethereum) contract calls.
pub mod l1;
/// L2 (Starknet) call batches.
pub mod l2;

pub use api::BridgeContractApi;
pub use l1::teleport::TeleportGuid;
pub use l2::{L2Account, L2Submitter};

/// `2^256 - 1` formatted with 18 decimals, the deposit ceiling reported when
/// the bridge has no total balance limit.
pub const MAX_TOTAL_BALANCE: &str =
    "115792089237316195423570985008687907853269984665640564039457.584007913129639935";
