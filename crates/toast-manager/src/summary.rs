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


use chrono::{DateTime, Utc};
use starkgate_bridge_types::Transfer;

/// The time format of transfer summaries.
pub const TIME_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// What a toast tells about a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    /// `Ethereum -> Starknet` or `Starknet -> Ethereum`.
    pub direction: String,
    /// The withdrawal used a liquidity provider.
    pub fast_withdrawal: bool,
    /// The UTC time of the transfer, `None` when unknown.
    pub time: Option<String>,
    /// `<amount> <symbol>`.
    pub amount: String,
}

fn format_time(timestamp: u64) -> Option<String> {
    if timestamp == 0 {
        return None;
    }
    let secs = i64::try_from(timestamp).ok()?;
    let time: DateTime<Utc> = DateTime::from_timestamp(secs, 0)?;
    Some(time.format(TIME_FORMAT).to_string())
}

impl From<&Transfer> for TransferSummary {
    fn from(transfer: &Transfer) -> Self {
        Self {
            direction: transfer.direction(),
            fast_withdrawal: transfer.fast_withdrawal,
            time: format_time(transfer.display_timestamp()),
            amount: format!("{} {}", transfer.amount, transfer.symbol),
        }
    }
}

impl std::fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.direction)?;
        if self.fast_withdrawal {
            write!(f, " (fast)")?;
        }
        if let Some(time) = &self.time {
            write!(f, " | {time}")?;
        }
        write!(f, " | {}", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(kind: &str) -> Transfer {
        serde_json::from_value(serde_json::json!({
            "id": "0x1",
            "type": kind,
            "amount": "0.25",
            "name": "Dai Stablecoin",
            "symbol": "DAI",
            "l1TxTimestamp": 1_700_000_000u64,
        }))
        .unwrap()
    }

    #[test]
    fn deposits_use_the_l1_time() {
        let summary = TransferSummary::from(&transfer("deposit"));
        assert_eq!(summary.direction, "Ethereum -> Starknet");
        assert_eq!(summary.time.as_deref(), Some("14/11/2023, 22:13:20"));
        assert_eq!(
            summary.to_string(),
            "Ethereum -> Starknet | 14/11/2023, 22:13:20 | 0.25 DAI"
        );
    }

    #[test]
    fn unknown_times_are_omitted() {
        let mut withdrawal = transfer("withdrawal");
        withdrawal.fast_withdrawal = true;
        let summary = TransferSummary::from(&withdrawal);
        assert!(summary.time.is_none());
        assert_eq!(summary.to_string(), "Starknet -> Ethereum (fast) | 0.25 DAI");
    }
}
