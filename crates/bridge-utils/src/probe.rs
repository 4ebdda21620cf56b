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

use derive_more::Display;
/// Target for logger
pub const TARGET: &str = "starkgate_probe";

/// The Kind of the Probe.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// When the lifecycle of the service changes, like starting or shutting down.
    #[display(fmt = "lifecycle")]
    Lifecycle,
    /// Transfer log sync state for a connected account.
    #[display(fmt = "sync")]
    Sync,
    /// Result of a pending withdrawals reconciliation.
    #[display(fmt = "pending_withdrawals")]
    PendingWithdrawals,
    /// A toast was rendered or dismissed.
    #[display(fmt = "toast")]
    Toast,
    /// A bridge transaction was submitted on L1 or L2.
    #[display(fmt = "tx")]
    Tx,
    /// When a query will be retried.
    #[display(fmt = "retry")]
    Retry,
}
