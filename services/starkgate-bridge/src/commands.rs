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


use std::str::FromStr;

use ethers::types::{Address, TransactionReceipt};
use starkgate_bridge_context::BridgeContext;
use starkgate_bridge_types::{felt_to_hex, Felt, StarknetAddress, Transfer};
use starkgate_bridge_utils::clickable_link::ClickableLink;
use starkgate_bridge_utils::Error;
use starkgate_transfer_log::{Layer, QueryState};

use crate::view::TransferLogView;
use crate::Result;

fn parse_l1_address(value: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|_| Error::InvalidL1Address(value.to_owned()))
}

fn print_l1_receipt(ctx: &BridgeContext, receipt: &TransactionReceipt) {
    let tx_hash = format!("{:?}", receipt.transaction_hash);
    match &ctx.config.l1.explorer {
        Some(explorer) => {
            println!("L1 transaction: {}", ClickableLink::transaction(explorer, &tx_hash))
        }
        None => println!("L1 transaction: {tx_hash}"),
    }
}

fn print_l2_hash(ctx: &BridgeContext, tx_hash: &Felt) {
    let tx_hash = felt_to_hex(tx_hash);
    match &ctx.config.l2.explorer {
        Some(explorer) => {
            println!("L2 transaction: {}", ClickableLink::transaction(explorer, &tx_hash))
        }
        None => println!("L2 transaction: {tx_hash}"),
    }
}

/// The first error among `states`, if any.
fn merge_states<'a>(states: impl IntoIterator<Item = &'a QueryState>) -> QueryState {
    states.into_iter().fold(QueryState::default(), |acc, s| QueryState {
        fetched: acc.fetched || s.fetched,
        error: acc.error.or_else(|| s.error.clone()),
    })
}

/// Prints the withdrawals of the connected Ethereum account that are ready
/// to be completed on L1.
pub async fn pending_withdrawals(ctx: &BridgeContext) -> Result<()> {
    if ctx.accounts().ethereum.is_none() {
        return Err(Error::WalletNotConnected { layer: "L1" });
    }
    let mut log = crate::build_transfer_log(ctx)?;
    if let Err(e) = log.refetch_pending_withdrawals().await {
        tracing::warn!("Pending withdrawals query failed: {e}");
    }
    let view = TransferLogView::new(
        log.pending_withdrawals(),
        log.pending_withdrawals_state(),
    );
    print!("{view}");
    Ok(())
}

/// Prints the transfer log of the connected accounts, loading up to
/// `pages` history pages per layer.
pub async fn transfers(ctx: &BridgeContext, pages: usize) -> Result<()> {
    let mut log = crate::build_transfer_log(ctx)?;
    if let Err(e) = log.refetch_pending_withdrawals().await {
        tracing::warn!("Pending withdrawals query failed: {e}");
    }
    for layer in [Layer::L1, Layer::L2] {
        for _ in 0..pages.max(1) {
            if let Err(e) = log.fetch_next_page(layer).await {
                tracing::warn!(%layer, "Transfer history query failed: {e}");
                break;
            }
            if !log.has_next_page(layer) {
                break;
            }
        }
    }
    let transfers = log.transfers();
    let state = merge_states([
        log.pending_withdrawals_state(),
        log.query_state(Layer::L1),
        log.query_state(Layer::L2),
    ]);
    print!("{}", TransferLogView::new(&transfers, &state));
    Ok(())
}

/// Deposits `amount` of `symbol` to the Starknet `recipient`.
pub async fn deposit(
    ctx: &BridgeContext,
    symbol: &str,
    recipient: &str,
    amount: &str,
) -> Result<()> {
    let api = ctx.bridge_api(symbol)?;
    let recipient = StarknetAddress::from_str(recipient)?;
    let receipt = if api.token().is_eth() {
        api.deposit_eth(&recipient, amount).await?
    } else {
        api.deposit(&recipient, amount).await?
    };
    print_l1_receipt(ctx, &receipt);
    Ok(())
}

/// Withdraws `amount` of `symbol` to `recipient` on L1.
pub async fn withdraw(
    ctx: &BridgeContext,
    symbol: &str,
    recipient: &str,
    amount: &str,
) -> Result<()> {
    let api = ctx.bridge_api(symbol)?;
    let receipt = api
        .withdraw(parse_l1_address(recipient)?, amount, None)
        .await?;
    print_l1_receipt(ctx, &receipt);
    Ok(())
}

/// Completes the pending withdrawal `id` on L1, dismissing its toast.
pub async fn complete_withdrawal(ctx: &BridgeContext, id: &str) -> Result<()> {
    let mut log = crate::build_transfer_log(ctx)?;
    log.refetch_pending_withdrawals().await?;
    let transfer = log
        .pending_withdrawals()
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
        .cloned()
        .ok_or(Error::Generic("No pending withdrawal with this id"))?;

    let accounts = ctx.accounts();
    let mut toasts = crate::build_toasts();
    toasts.set_ethereum_account(accounts.ethereum.map(|a| format!("{a:?}")))?;
    toasts.handle_transfers(log.pending_withdrawals())?;

    let api = ctx.bridge_api(&transfer.symbol)?;
    let receipt = toasts
        .complete_transfer(&transfer, |t: Transfer| async move {
            let recipient = t
                .l1_address
                .as_deref()
                .ok_or(Error::Generic("Withdrawal without an L1 recipient"))
                .and_then(parse_l1_address)?;
            api.withdraw(recipient, &t.amount, Some(&t.symbol)).await
        })
        .await?;
    print_l1_receipt(ctx, &receipt);
    Ok(())
}

/// Starts a withdrawal of `amount` of `symbol` on L2.
pub async fn initiate_withdraw(
    ctx: &BridgeContext,
    symbol: &str,
    recipient: &str,
    amount: &str,
    auto_withdrawal: bool,
) -> Result<()> {
    let api = ctx.bridge_api(symbol)?;
    let tx_hash = api
        .initiate_withdraw(parse_l1_address(recipient)?, amount, auto_withdrawal)
        .await?;
    print_l2_hash(ctx, &tx_hash);
    Ok(())
}

/// Teleports `amount` DAI to `recipient` on L1.
pub async fn initiate_teleport(
    ctx: &BridgeContext,
    symbol: &str,
    recipient: &str,
    amount: &str,
) -> Result<()> {
    let api = ctx.bridge_api(symbol)?;
    if !api.token().is_dai() {
        return Err(Error::Generic("Only DAI can be teleported"));
    }
    let tx_hash = api
        .initiate_teleport(parse_l1_address(recipient)?, amount)
        .await?;
    print_l2_hash(ctx, &tx_hash);
    Ok(())
}

/// Prints the deposit limits of `symbol`.
pub async fn max_deposit(ctx: &BridgeContext, symbol: &str) -> Result<()> {
    let api = ctx.bridge_api(symbol)?;
    let max = api.max_deposit(None).await?;
    println!("Max deposit: {max} {}", api.token().symbol);
    println!("Max total balance: {}", api.max_total_balance()?);
    Ok(())
}

/// Prints the teleport oracle signature threshold.
pub async fn teleport_threshold(ctx: &BridgeContext, symbol: &str) -> Result<()> {
    let api = ctx.bridge_api(symbol)?;
    println!("Teleport threshold: {}", api.teleport_threshold().await?);
    Ok(())
}
