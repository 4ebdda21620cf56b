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


use std::time::Duration;

use serde::{Deserialize, Serialize};
use starkgate_bridge_types::ConsumptionOrder;
use starkgate_bridge_utils::retry::QueryRetryPolicy;

use crate::defaults;

/// QueriesConfig is the configuration for the transfer log queries.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueriesConfig {
    /// Maximum number of retries of a failed query.
    #[serde(default = "defaults::max_retry")]
    pub max_retry: usize,
    /// Delay between two retries in milliseconds.
    #[serde(default = "defaults::retry_interval")]
    pub retry_interval: u64,
    /// Polling interval of the pending withdrawals in milliseconds.
    #[serde(default = "defaults::pending_withdrawals_refetch_interval")]
    pub pending_withdrawals_refetch_interval: u64,
    /// Polling interval of the transfer history in milliseconds.
    #[serde(default = "defaults::transfers_refetch_interval")]
    pub transfers_refetch_interval: u64,
}

impl QueriesConfig {
    /// The retry policy every query runs with.
    pub fn retry_policy(&self) -> QueryRetryPolicy {
        QueryRetryPolicy::new(
            self.max_retry,
            Duration::from_millis(self.retry_interval),
        )
    }
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            max_retry: defaults::max_retry(),
            retry_interval: defaults::retry_interval(),
            pending_withdrawals_refetch_interval:
                defaults::pending_withdrawals_refetch_interval(),
            transfers_refetch_interval: defaults::transfers_refetch_interval(),
        }
    }
}

/// EventsConfig is the configuration for the L2 event queries.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventsConfig {
    /// Number of events requested per `getEvents` page.
    #[serde(default = "defaults::events_chunk_size")]
    pub chunk_size: u64,
    /// Which of several withdrawals sharing one message hash are reported
    /// pending, `fifo` or `lifo`.
    #[serde(default)]
    pub consumption_order: ConsumptionOrder,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::events_chunk_size(),
            consumption_order: ConsumptionOrder::default(),
        }
    }
}
