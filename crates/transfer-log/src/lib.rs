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


//! Transfer Log
//!
//! The transfer log lists the transfers of the connected accounts: the
//! withdrawals waiting to be completed on L1, followed by the L1 and L2
//! transfer history served by an indexer.
//!
//! History is read page by page with an opaque cursor, the way an infinite
//! list is loaded. Every query goes through the shared retry policy, which
//! gives up at once on rate limits.
//!
//! ## Usage
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use starkgate_transfer_log::{IndexerBackend, Layer, TransferLogBackend};
//!
//! # async fn example() -> starkgate_bridge_utils::Result<()> {
//! let api_url = url::Url::parse("https://indexer.example/api")?;
//! let backend = IndexerBackend::new(api_url, Duration::from_secs(10))?;
//! let page = backend.get_transfers("0xabc", Layer::L1, None).await?;
//! println!("{} transfers", page.transfers.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use derive_more::Display;
use serde::{Deserialize, Serialize};
use starkgate_bridge_types::Transfer;
use starkgate_bridge_utils::Result;

/// An in-memory backend
mod dummy;
/// Indexer HTTP backend
mod indexer;
/// The transfer log itself
mod provider;

pub use dummy::DummyTransferLogBackend;
pub use indexer::IndexerBackend;
pub use provider::{PendingWithdrawalsSource, QueryState, TransferLogProvider};

/// The layer a history query is about.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Transfers of the Ethereum account.
    #[display(fmt = "l1")]
    L1,
    /// Transfers of the Starknet account.
    #[display(fmt = "l2")]
    L2,
}

/// One page of transfer history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransfersPage {
    /// The transfers of this page, newest first.
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    /// Cursor of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// A source of transfer history pages.
#[async_trait::async_trait]
pub trait TransferLogBackend: Send + Sync {
    /// Returns the page of `address` transfers on `layer` starting at
    /// `next`, or the first page when `next` is `None`.
    async fn get_transfers(
        &self,
        address: &str,
        layer: Layer,
        next: Option<&str>,
    ) -> Result<TransfersPage>;
}
