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

/// Retry counts above this are accepted with a warning.
pub const MAX_QUERY_RETRY: usize = 10;

/// Failed transfer log queries are retried `3` times by default.
pub const fn max_retry() -> usize {
    3
}
/// The delay between two retries is `1s` by default.
pub const fn retry_interval() -> u64 {
    1_000
}
/// Pending withdrawals are refreshed every `30s` by default.
pub const fn pending_withdrawals_refetch_interval() -> u64 {
    30_000
}
/// Transfer history is refreshed every `30s` by default.
pub const fn transfers_refetch_interval() -> u64 {
    30_000
}
/// A single `getEvents` page holds up to `200` events.
pub const fn events_chunk_size() -> u64 {
    200
}
/// Indexer requests time out after `10s`.
pub const fn indexer_timeout() -> u64 {
    10_000
}
/// Tokens have `18` decimals unless configured otherwise.
pub const fn token_decimals() -> u32 {
    18
}
/// Tokens are enabled by default.
pub const fn token_enabled() -> bool {
    true
}
/// L1 transactions are awaited for `1` confirmation.
pub const fn confirmations() -> usize {
    1
}
/// Teleport `maxFeePercentage` multiplier.
pub const fn teleport_fee_multiplier() -> f64 {
    0.0005
}
