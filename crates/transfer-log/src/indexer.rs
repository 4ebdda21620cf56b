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

use starkgate_bridge_utils::{Error, Result};

use super::{Layer, TransfersPage};

/// Reads transfer history from the indexer API:
/// `GET {api}/transfers?address=<address>&layer=<l1|l2>[&next=<cursor>]`.
#[derive(Clone)]
pub struct IndexerBackend {
    client: reqwest::Client,
    api_url: url::Url,
}

impl std::fmt::Debug for IndexerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerBackend")
            .field("api_url", &self.api_url.as_str())
            .finish()
    }
}

impl IndexerBackend {
    /// Creates a new backend; requests time out after `timeout`.
    pub fn new(api_url: url::Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_url })
    }

    /// The url of one history page.
    pub fn transfers_url(
        &self,
        address: &str,
        layer: Layer,
        next: Option<&str>,
    ) -> Result<url::Url> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let mut url = url::Url::parse(&format!("{base}/transfers"))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("address", address)
                .append_pair("layer", &layer.to_string());
            if let Some(next) = next {
                query.append_pair("next", next);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl super::TransferLogBackend for IndexerBackend {
    #[tracing::instrument(skip(self))]
    async fn get_transfers(
        &self,
        address: &str,
        layer: Layer,
        next: Option<&str>,
    ) -> Result<TransfersPage> {
        let url = self.transfers_url(address, layer, next)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status,
                url: url.to_string(),
            });
        }
        let page = response.json::<TransfersPage>().await?;
        tracing::trace!(
            transfers = page.transfers.len(),
            has_next = page.next.is_some(),
            "transfers page loaded"
        );
        Ok(page)
    }
}
