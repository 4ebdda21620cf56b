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


//! StarkGate Bridge Binary.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use tokio::signal::unix;

use starkgate_bridge::{commands, service};
use starkgate_bridge_config::cli::{load_config, setup_logger, Command, Opts};
use starkgate_bridge_context::{Accounts, BridgeContext};
use starkgate_bridge_utils::probe;

/// The main entry point for the bridge client.
///
/// # Arguments
///
/// * `args` - The command line arguments.
#[paw::main]
#[tokio::main]
async fn main(args: Opts) -> anyhow::Result<()> {
    setup_logger(args.verbose)?;
    match dotenv::dotenv() {
        Ok(_) => {
            tracing::trace!("Loaded .env file");
        }
        Err(e) => {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // The configuration is validated and configured from the given directory
    let config = load_config(args.config_dir.clone())?;

    // The BridgeContext takes a configuration, and derives the providers,
    // wallets and connected accounts from it.
    let ctx = BridgeContext::new(config)?;
    let token = args.token.as_str();

    match args.command {
        Command::Watch => watch(ctx, args.config_dir).await?,
        Command::PendingWithdrawals => {
            commands::pending_withdrawals(&ctx).await?
        }
        Command::Transfers { pages } => commands::transfers(&ctx, pages).await?,
        Command::Deposit { recipient, amount } => {
            commands::deposit(&ctx, token, &recipient, &amount).await?
        }
        Command::Withdraw { recipient, amount } => {
            commands::withdraw(&ctx, token, &recipient, &amount).await?
        }
        Command::CompleteWithdrawal { id } => {
            commands::complete_withdrawal(&ctx, &id).await?
        }
        Command::InitiateWithdraw {
            recipient,
            amount,
            auto_withdrawal,
        } => {
            commands::initiate_withdraw(
                &ctx,
                token,
                &recipient,
                &amount,
                auto_withdrawal,
            )
            .await?
        }
        Command::InitiateTeleport { recipient, amount } => {
            commands::initiate_teleport(&ctx, token, &recipient, &amount)
                .await?
        }
        Command::MaxDeposit => commands::max_deposit(&ctx, token).await?,
        Command::TeleportThreshold => {
            commands::teleport_threshold(&ctx, token).await?
        }
    }
    Ok(())
}

/// Runs the transfer watcher until a termination signal. `SIGHUP` reloads
/// the configuration and switches to the accounts configured there.
async fn watch(
    ctx: BridgeContext,
    config_dir: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    let watcher_handle = service::ignite(&ctx)?;
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Lifecycle,
        started = true
    );
    // watch for signals
    let mut ctrlc_signal = unix::signal(unix::SignalKind::interrupt())?;
    let mut termination_signal = unix::signal(unix::SignalKind::terminate())?;
    let mut quit_signal = unix::signal(unix::SignalKind::quit())?;
    let mut hangup_signal = unix::signal(unix::SignalKind::hangup())?;
    loop {
        tokio::select! {
            _ = ctrlc_signal.recv() => {
                tracing::warn!("Interrupted (Ctrl+C) ...");
                break;
            },
            _ = termination_signal.recv() => {
                tracing::warn!("Got Terminate signal ...");
                break;
            },
            _ = quit_signal.recv() => {
                tracing::warn!("Quitting ...");
                break;
            },
            _ = hangup_signal.recv() => {
                tracing::info!("Reloading accounts ...");
                let reloaded = load_config(config_dir.as_ref()).and_then(|config| {
                    Accounts::from_config(&config).map_err(anyhow::Error::from)
                });
                match reloaded {
                    Ok(accounts) => ctx.set_accounts(accounts),
                    Err(e) => tracing::error!("Failed to reload config: {e}"),
                }
            },
        }
    }
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Lifecycle,
        shutdown = true
    );
    tracing::warn!("Shutting down...");
    // send shutdown signal to all of the application.
    ctx.shutdown();
    if let Err(e) = watcher_handle.await {
        tracing::error!("Transfer watcher panicked: {e}");
    }
    tracing::info!("Clean Exit ..");
    Ok(())
}
