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


use std::fmt;

use starkgate_bridge_types::Transfer;
use starkgate_toast_manager::TransferSummary;
use starkgate_transfer_log::QueryState;

/// Heading of the transfer log.
pub const TITLE: &str = "Transfer log";
/// Shown above every log, pending withdrawals only show up once provable.
pub const READY_WITHDRAWAL_NOTICE: &str = "Withdrawals will only appear here once they are ready for completion. If you don't find your withdrawal here, please check back later as it means the transaction is still processing.";
/// Shown when the last query failed.
pub const ERROR_MSG: &str = "Failed to load the transfer log, please try again later.";
/// Shown when there is nothing to list.
pub const EMPTY_MSG: &str = "No transfers found.";

/// The transfer log as printed by the `transfers` and
/// `pending-withdrawals` commands.
#[derive(Debug)]
pub struct TransferLogView<'a> {
    transfers: &'a [Transfer],
    state: &'a QueryState,
}

impl<'a> TransferLogView<'a> {
    /// A view of `transfers`, loaded by a query that ended in `state`.
    pub fn new(transfers: &'a [Transfer], state: &'a QueryState) -> Self {
        Self { transfers, state }
    }

    fn overview(&self) -> String {
        match self.transfers.len() {
            1 => String::from("1 transfer"),
            n => format!("{n} transfers"),
        }
    }
}

impl fmt::Display for TransferLogView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f, "{READY_WITHDRAWAL_NOTICE}")?;
        if self.state.error.is_some() {
            return writeln!(f, "{ERROR_MSG}");
        }
        if self.transfers.is_empty() {
            return writeln!(f, "{EMPTY_MSG}");
        }
        writeln!(f, "{}", self.overview())?;
        for transfer in self.transfers {
            let summary = TransferSummary::from(transfer);
            writeln!(f, "  {} | {} | {}", transfer.id, transfer.l2_tx_status, summary)?;
        }
        Ok(())
    }
}
