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


use std::collections::HashMap;

use starkgate_bridge_types::Transfer;
use starkgate_bridge_utils::Result;

use super::{Layer, TransfersPage};

/// A backend serving fixed transfers from memory, split in pages of
/// `page_size` with the page index as cursor.
///
/// Without any transfers it answers every query with an empty last page,
/// which is what the transfer log uses when no indexer is configured.
#[derive(Debug, Clone)]
pub struct DummyTransferLogBackend {
    transfers: HashMap<(String, Layer), Vec<Transfer>>,
    page_size: usize,
}

impl DummyTransferLogBackend {
    /// Creates a new dummy backend
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            transfers: HashMap::new(),
            page_size: page_size.max(1),
        }
    }

    /// Adds transfers of `address` on `layer`.
    #[must_use]
    pub fn with_transfers(
        mut self,
        address: &str,
        layer: Layer,
        transfers: Vec<Transfer>,
    ) -> Self {
        self.transfers
            .entry((address.to_lowercase(), layer))
            .or_default()
            .extend(transfers);
        self
    }
}

impl Default for DummyTransferLogBackend {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait::async_trait]
impl super::TransferLogBackend for DummyTransferLogBackend {
    async fn get_transfers(
        &self,
        address: &str,
        layer: Layer,
        next: Option<&str>,
    ) -> Result<TransfersPage> {
        let Some(all) = self.transfers.get(&(address.to_lowercase(), layer))
        else {
            return Ok(TransfersPage::default());
        };
        let page = match next {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| {
                starkgate_bridge_utils::Error::Generic("invalid page cursor")
            })?,
            None => 0,
        };
        // Cursors past the end answer with an empty last page.
        let Some(start) = page
            .checked_mul(self.page_size)
            .filter(|start| *start < all.len())
        else {
            return Ok(TransfersPage::default());
        };
        let end = start.saturating_add(self.page_size).min(all.len());
        let transfers = all.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next = (end < all.len()).then(|| (page + 1).to_string());
        Ok(TransfersPage { transfers, next })
    }
}
