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
//! # Withdrawal Matcher Module
//!
//! Finds withdrawals that were initiated on L2, are proven on L1, and are
//! still waiting for the L1 `withdraw` call.
//!
//! ## Overview
//!
//! Every withdrawal sends an L2 to L1 message. The Starknet core contract
//! counts, per message hash, the messages that are proven but not consumed
//! yet. The matcher rebuilds the hash of each `WithdrawInitiated` event and
//! reports as many events per hash as the core contract still counts.

/// The Starknet core contract, source of the unconsumed message counts.
pub mod core_contract;
/// Pending withdrawal discovery over all configured tokens.
pub mod finder;
/// Matching of events against the unconsumed message counts.
pub mod matcher;
/// The L2 to L1 withdrawal message and its hash.
pub mod message;
/// Mapping of pending withdrawals to transfers.
pub mod transfer;

pub use core_contract::{MessageCountSource, StarknetCoreContract};
pub use finder::PendingWithdrawalsFinder;
pub use matcher::{PendingWithdrawal, PendingWithdrawalMatcher};
pub use starkgate_bridge_types::ConsumptionOrder;
pub use message::{BridgeRoute, WithdrawalMessage};
