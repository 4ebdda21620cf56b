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


use std::collections::HashSet;
use std::sync::Arc;

use ethers::types::Address;
use starkgate_bridge_types::{StarknetAddress, Transfer};
use starkgate_bridge_utils::retry::QueryRetryPolicy;
use starkgate_bridge_utils::{probe, Result};
use starkgate_l2_events::WithdrawalEventSource;
use starkgate_withdrawal_matcher::{
    MessageCountSource, PendingWithdrawalsFinder,
};

use super::{Layer, TransferLogBackend, TransfersPage};

/// A source of the pending withdrawals of an Ethereum account.
#[async_trait::async_trait]
pub trait PendingWithdrawalsSource: Send + Sync {
    /// The withdrawals of `ethereum_account` waiting for the L1 `withdraw`.
    async fn find_pending_withdrawals(
        &self,
        ethereum_account: Address,
    ) -> Result<Vec<Transfer>>;
}

#[async_trait::async_trait]
impl<E, C> PendingWithdrawalsSource for PendingWithdrawalsFinder<E, C>
where
    E: WithdrawalEventSource,
    C: MessageCountSource,
{
    async fn find_pending_withdrawals(
        &self,
        ethereum_account: Address,
    ) -> Result<Vec<Transfer>> {
        PendingWithdrawalsFinder::find_pending_withdrawals(self, ethereum_account)
            .await
    }
}

/// The outcome of the last run of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    /// The query succeeded at least once since the last reset.
    pub fetched: bool,
    /// The error of the last run, cleared by the next success.
    pub error: Option<String>,
}

impl QueryState {
    /// The query succeeded at least once and did not fail since.
    pub fn is_success(&self) -> bool {
        self.fetched && self.error.is_none()
    }

    fn succeeded(&mut self) {
        self.fetched = true;
        self.error = None;
    }
}

#[derive(Debug, Default)]
struct HistoryQuery {
    pages: Vec<TransfersPage>,
    state: QueryState,
}

impl HistoryQuery {
    fn has_next_page(&self) -> bool {
        self.pages.last().is_some_and(|p| p.next.is_some())
    }

    fn next_cursor(&self) -> Option<String> {
        self.pages.last().and_then(|p| p.next.clone())
    }

    fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.pages.iter().flat_map(|p| p.transfers.iter())
    }
}

/// The transfer log of the connected accounts.
///
/// History queries of a layer are disabled while the account of that layer is
/// not connected; the pending withdrawals query needs the Ethereum account.
/// Changing an account resets everything.
pub struct TransferLogProvider<B, P> {
    backend: Arc<B>,
    pending_source: Arc<P>,
    retry: QueryRetryPolicy,
    ethereum_account: Option<Address>,
    starknet_account: Option<StarknetAddress>,
    l1: HistoryQuery,
    l2: HistoryQuery,
    pending_withdrawals: Vec<Transfer>,
    pending_state: QueryState,
}

impl<B, P> std::fmt::Debug for TransferLogProvider<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferLogProvider")
            .field("ethereum_account", &self.ethereum_account)
            .field("starknet_account", &self.starknet_account)
            .field("l1_pages", &self.l1.pages.len())
            .field("l2_pages", &self.l2.pages.len())
            .field("pending_withdrawals", &self.pending_withdrawals.len())
            .finish()
    }
}

impl<B, P> TransferLogProvider<B, P>
where
    B: TransferLogBackend,
    P: PendingWithdrawalsSource,
{
    /// Creates a new transfer log with no connected account.
    pub fn new(
        backend: Arc<B>,
        pending_source: Arc<P>,
        retry: QueryRetryPolicy,
    ) -> Self {
        Self {
            backend,
            pending_source,
            retry,
            ethereum_account: None,
            starknet_account: None,
            l1: HistoryQuery::default(),
            l2: HistoryQuery::default(),
            pending_withdrawals: Vec::new(),
            pending_state: QueryState::default(),
        }
    }

    /// Connects accounts. Returns `true` and resets the log when either
    /// account changed.
    pub fn set_accounts(
        &mut self,
        ethereum_account: Option<Address>,
        starknet_account: Option<StarknetAddress>,
    ) -> bool {
        let changed = self.ethereum_account != ethereum_account
            || self.starknet_account != starknet_account;
        if changed {
            self.ethereum_account = ethereum_account;
            self.starknet_account = starknet_account;
            self.reset();
        }
        changed
    }

    /// The connected Ethereum account.
    pub fn ethereum_account(&self) -> Option<Address> {
        self.ethereum_account
    }

    /// The connected Starknet account.
    pub fn starknet_account(&self) -> Option<StarknetAddress> {
        self.starknet_account
    }

    fn account_of(&self, layer: Layer) -> Option<String> {
        match layer {
            Layer::L1 => self.ethereum_account.map(|a| format!("{a:?}")),
            Layer::L2 => self.starknet_account.map(|a| a.to_string()),
        }
    }

    fn history(&self, layer: Layer) -> &HistoryQuery {
        match layer {
            Layer::L1 => &self.l1,
            Layer::L2 => &self.l2,
        }
    }

    fn history_mut(&mut self, layer: Layer) -> &mut HistoryQuery {
        match layer {
            Layer::L1 => &mut self.l1,
            Layer::L2 => &mut self.l2,
        }
    }

    async fn load_page(
        &self,
        address: &str,
        layer: Layer,
        cursor: Option<String>,
    ) -> Result<TransfersPage> {
        let backend = self.backend.clone();
        let query = match layer {
            Layer::L1 => "transfers_l1",
            Layer::L2 => "transfers_l2",
        };
        self.retry
            .run(query, || backend.get_transfers(address, layer, cursor.as_deref()))
            .await
    }

    /// Loads the next history page of `layer`, or the first one when nothing
    /// is loaded yet. Does nothing when the account of the layer is not
    /// connected or the last page was reached.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_next_page(&mut self, layer: Layer) -> Result<()> {
        let Some(address) = self.account_of(layer) else {
            return Ok(());
        };
        let history = self.history(layer);
        if history.state.fetched && !history.has_next_page() {
            return Ok(());
        }
        let cursor = history.next_cursor();
        match self.load_page(&address, layer, cursor).await {
            Ok(page) => {
                let history = self.history_mut(layer);
                history.pages.push(page);
                history.state.succeeded();
                Ok(())
            }
            Err(e) => {
                self.history_mut(layer).state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reloads every loaded page of `layer` from the first one.
    #[tracing::instrument(skip(self))]
    pub async fn refetch(&mut self, layer: Layer) -> Result<()> {
        let Some(address) = self.account_of(layer) else {
            return Ok(());
        };
        let wanted = self.history(layer).pages.len().max(1);
        let mut pages: Vec<TransfersPage> = Vec::with_capacity(wanted);
        let mut cursor = None;
        while pages.len() < wanted {
            match self.load_page(&address, layer, cursor).await {
                Ok(page) => {
                    cursor = page.next.clone();
                    let last = cursor.is_none();
                    pages.push(page);
                    if last {
                        break;
                    }
                }
                Err(e) => {
                    self.history_mut(layer).state.error = Some(e.to_string());
                    return Err(e);
                }
            }
        }
        let history = self.history_mut(layer);
        history.pages = pages;
        history.state.succeeded();
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Sync,
            %layer,
            pages = history.pages.len(),
            has_next_page = history.has_next_page(),
        );
        Ok(())
    }

    /// Reloads the pending withdrawals of the Ethereum account.
    #[tracing::instrument(skip(self))]
    pub async fn refetch_pending_withdrawals(&mut self) -> Result<()> {
        let Some(account) = self.ethereum_account else {
            return Ok(());
        };
        let source = self.pending_source.clone();
        let result = self
            .retry
            .run("pending_withdrawals", || source.find_pending_withdrawals(account))
            .await;
        match result {
            Ok(transfers) => {
                self.pending_withdrawals = transfers;
                self.pending_state.succeeded();
                Ok(())
            }
            Err(e) => {
                self.pending_state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Whether more history pages of `layer` can be loaded.
    pub fn has_next_page(&self, layer: Layer) -> bool {
        self.history(layer).has_next_page()
    }

    /// The state of the history query of `layer`.
    pub fn query_state(&self, layer: Layer) -> &QueryState {
        &self.history(layer).state
    }

    /// The state of the pending withdrawals query.
    pub fn pending_withdrawals_state(&self) -> &QueryState {
        &self.pending_state
    }

    /// The pending withdrawals found by the last successful run.
    pub fn pending_withdrawals(&self) -> &[Transfer] {
        &self.pending_withdrawals
    }

    /// The loaded L1 history.
    pub fn transfers_l1(&self) -> Vec<Transfer> {
        self.l1.transfers().cloned().collect()
    }

    /// The loaded L2 history.
    pub fn transfers_l2(&self) -> Vec<Transfer> {
        self.l2.transfers().cloned().collect()
    }

    /// Pending withdrawals followed by the L1 and then the L2 history, each
    /// transfer once (first occurrence wins).
    pub fn transfers(&self) -> Vec<Transfer> {
        let mut seen = HashSet::new();
        self.pending_withdrawals
            .iter()
            .chain(self.l1.transfers())
            .chain(self.l2.transfers())
            .filter(|t| seen.insert(t.id.clone()))
            .cloned()
            .collect()
    }

    /// Looks a transfer up by id.
    pub fn find(&self, id: &str) -> Option<Transfer> {
        self.transfers().into_iter().find(|t| t.id == id)
    }

    /// Forgets every loaded page, cursor and pending withdrawal.
    pub fn reset(&mut self) {
        self.l1 = HistoryQuery::default();
        self.l2 = HistoryQuery::default();
        self.pending_withdrawals.clear();
        self.pending_state = QueryState::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use starkgate_bridge_types::TransactionStatus;
    use starkgate_bridge_utils::Error;

    use super::*;
    use crate::DummyTransferLogBackend;

    const ETH_ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

    fn transfer(id: &str, kind: &str) -> Transfer {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": kind,
            "amount": "1.0",
            "name": "Ether",
            "symbol": "ETH",
            "l1Address": ETH_ACCOUNT,
            "l2TxStatus": "ACCEPTED_ON_L2",
        }))
        .unwrap()
    }

    fn pending(id: &str) -> Transfer {
        let mut t = transfer(id, "withdrawal");
        t.l2_tx_status = TransactionStatus::AcceptedOnL1;
        t
    }

    struct FixedPending(Vec<Transfer>, AtomicUsize);

    #[async_trait::async_trait]
    impl PendingWithdrawalsSource for FixedPending {
        async fn find_pending_withdrawals(
            &self,
            _ethereum_account: Address,
        ) -> Result<Vec<Transfer>> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Ok(self.0.clone())
        }
    }

    /// Fails with the given status until `failures` requests were made.
    struct FlakyBackend {
        status: reqwest::StatusCode,
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TransferLogBackend for FlakyBackend {
        async fn get_transfers(
            &self,
            _address: &str,
            _layer: Layer,
            _next: Option<&str>,
        ) -> Result<TransfersPage> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(Error::HttpStatus {
                    status: self.status,
                    url: String::from("https://indexer.example/transfers"),
                })
            } else {
                Ok(TransfersPage::default())
            }
        }
    }

    fn policy() -> QueryRetryPolicy {
        QueryRetryPolicy::new(3, Duration::from_millis(1))
    }

    fn eth_account() -> Address {
        ETH_ACCOUNT.parse().unwrap()
    }

    fn starknet_account() -> StarknetAddress {
        "0x1234".parse().unwrap()
    }

    #[tokio::test]
    async fn queries_are_disabled_without_accounts() {
        let source = Arc::new(FixedPending(vec![pending("0x9")], AtomicUsize::new(0)));
        let mut log = TransferLogProvider::new(
            Arc::new(DummyTransferLogBackend::default()),
            source.clone(),
            policy(),
        );
        log.fetch_next_page(Layer::L1).await.unwrap();
        log.refetch_pending_withdrawals().await.unwrap();
        assert_eq!(source.1.load(Ordering::SeqCst), 0);
        assert!(!log.query_state(Layer::L1).fetched);
        assert!(log.transfers().is_empty());
    }

    #[tokio::test]
    async fn pages_accumulate_until_the_last_one() {
        let backend = DummyTransferLogBackend::new(2).with_transfers(
            ETH_ACCOUNT,
            Layer::L1,
            vec![
                transfer("0x1", "deposit"),
                transfer("0x2", "deposit"),
                transfer("0x3", "deposit"),
            ],
        );
        let mut log = TransferLogProvider::new(
            Arc::new(backend),
            Arc::new(FixedPending(Vec::new(), AtomicUsize::new(0))),
            policy(),
        );
        assert!(log.set_accounts(Some(eth_account()), None));
        log.fetch_next_page(Layer::L1).await.unwrap();
        assert!(log.has_next_page(Layer::L1));
        assert_eq!(log.transfers_l1().len(), 2);
        log.fetch_next_page(Layer::L1).await.unwrap();
        assert!(!log.has_next_page(Layer::L1));
        assert_eq!(log.transfers_l1().len(), 3);
        // the last page was reached, nothing more is loaded.
        log.fetch_next_page(Layer::L1).await.unwrap();
        assert_eq!(log.transfers_l1().len(), 3);
        // refetching keeps the loaded pages.
        log.refetch(Layer::L1).await.unwrap();
        assert_eq!(log.transfers_l1().len(), 3);
        assert!(log.query_state(Layer::L1).is_success());
    }

    #[tokio::test]
    async fn merged_transfers_put_pending_withdrawals_first() {
        let backend = DummyTransferLogBackend::new(10)
            .with_transfers(
                ETH_ACCOUNT,
                Layer::L1,
                vec![transfer("0x1", "deposit"), transfer("0x9", "withdrawal")],
            )
            .with_transfers(
                &starknet_account().to_string(),
                Layer::L2,
                vec![transfer("0x2", "withdrawal"), transfer("0x1", "deposit")],
            );
        let mut log = TransferLogProvider::new(
            Arc::new(backend),
            Arc::new(FixedPending(vec![pending("0x9")], AtomicUsize::new(0))),
            policy(),
        );
        log.set_accounts(Some(eth_account()), Some(starknet_account()));
        log.refetch_pending_withdrawals().await.unwrap();
        log.fetch_next_page(Layer::L1).await.unwrap();
        log.fetch_next_page(Layer::L2).await.unwrap();

        let transfers = log.transfers();
        let ids = transfers.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["0x9", "0x1", "0x2"]);
        // the pending withdrawal wins over the history entry.
        assert!(transfers[0].is_pending_withdrawal());
        assert!(log.find("0x2").is_some());
    }

    #[tokio::test]
    async fn account_change_resets_the_log() {
        let mut log = TransferLogProvider::new(
            Arc::new(DummyTransferLogBackend::default()),
            Arc::new(FixedPending(vec![pending("0x9")], AtomicUsize::new(0))),
            policy(),
        );
        log.set_accounts(Some(eth_account()), None);
        log.refetch_pending_withdrawals().await.unwrap();
        assert_eq!(log.pending_withdrawals().len(), 1);
        assert!(!log.set_accounts(Some(eth_account()), None));
        assert_eq!(log.pending_withdrawals().len(), 1);
        assert!(log.set_accounts(Some(Address::repeat_byte(1)), None));
        assert!(log.pending_withdrawals().is_empty());
        assert!(!log.pending_withdrawals_state().fetched);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let backend = Arc::new(FlakyBackend {
            status: reqwest::StatusCode::BAD_GATEWAY,
            failures: 2,
            calls: AtomicUsize::new(0),
        });
        let mut log = TransferLogProvider::new(
            backend.clone(),
            Arc::new(FixedPending(Vec::new(), AtomicUsize::new(0))),
            policy(),
        );
        log.set_accounts(Some(eth_account()), None);
        log.fetch_next_page(Layer::L1).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert!(log.query_state(Layer::L1).is_success());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn rate_limits_are_not_retried() {
        let backend = Arc::new(FlakyBackend {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            failures: 10,
            calls: AtomicUsize::new(0),
        });
        let mut log = TransferLogProvider::new(
            backend.clone(),
            Arc::new(FixedPending(Vec::new(), AtomicUsize::new(0))),
            policy(),
        );
        log.set_accounts(Some(eth_account()), None);
        let err = log.fetch_next_page(Layer::L1).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(log.query_state(Layer::L1).error.is_some());
    }
}
