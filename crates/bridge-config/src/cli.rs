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


use std::path::{Path, PathBuf};

use anyhow::Context;
use directories_next::ProjectDirs;
use structopt::StructOpt;

use crate::BridgeConfig;

/// Package identifier, where the default configuration is defined.
/// If the user does not start the bridge with the `--config-dir`
/// it will default to read from the default location depending on the OS.
pub const PACKAGE_ID: [&str; 3] = ["co", "starkware", "starkgate-bridge"];

/// The StarkGate bridge command-line tool
///
/// Watch transfers from a config directory:
///
/// $ starkgate-bridge -vvv -c <CONFIG_DIR> watch
#[derive(StructOpt)]
#[structopt(name = "StarkGate Bridge")]
pub struct Opts {
    /// A level of verbosity, and can be used multiple times
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: i32,
    /// Directory that contains configration files.
    #[structopt(
        short = "c",
        long = "config-dir",
        value_name = "PATH",
        parse(from_os_str)
    )]
    pub config_dir: Option<PathBuf>,
    /// The token to operate on, by symbol.
    #[structopt(short, long, default_value = "ETH")]
    pub token: String,
    /// The command to run.
    #[structopt(subcommand)]
    pub command: Command,
}

/// Bridge commands.
#[derive(Debug, Clone, StructOpt)]
pub enum Command {
    /// Poll the transfer log and notify about transfer updates.
    Watch,
    /// List withdrawals that are ready to be completed on L1.
    PendingWithdrawals,
    /// List the transfer history of the connected accounts.
    Transfers {
        /// Number of history pages to load per layer.
        #[structopt(long, default_value = "1")]
        pages: usize,
    },
    /// Deposit `amount` to the L2 `recipient`.
    Deposit {
        /// The Starknet recipient.
        recipient: String,
        /// Decimal amount, e.g. `0.25`.
        amount: String,
    },
    /// Withdraw `amount` on L1 to `recipient` (completes an L2 withdrawal).
    Withdraw {
        /// The Ethereum recipient.
        recipient: String,
        /// Decimal amount.
        amount: String,
    },
    /// Complete a pending withdrawal by its transfer id.
    CompleteWithdrawal {
        /// Transfer id, the L2 transaction hash.
        id: String,
    },
    /// Initiate a withdrawal on L2.
    InitiateWithdraw {
        /// The Ethereum recipient.
        recipient: String,
        /// Decimal amount.
        amount: String,
        /// Let the relayer complete the withdrawal on L1.
        #[structopt(long)]
        auto_withdrawal: bool,
    },
    /// Initiate a fast DAI withdrawal through the teleport gateway.
    InitiateTeleport {
        /// The Ethereum recipient.
        recipient: String,
        /// Decimal amount.
        amount: String,
    },
    /// Print the maximum single deposit of the token.
    MaxDeposit,
    /// Print the teleport oracle signature threshold.
    TeleportThreshold,
}

/// Loads the configuration from the given directory.
///
/// Returns `Ok(Config)` on success, or `Err(anyhow::Error)` on failure.
///
/// # Arguments
///
/// * `config_dir` - An optional `PathBuf` representing the directory that contains the configuration.
pub fn load_config<P>(
    config_dir: Option<P>,
) -> Result<BridgeConfig, anyhow::Error>
where
    P: AsRef<Path>,
{
    tracing::debug!("Getting default dirs for starkgate bridge");
    let dirs = ProjectDirs::from(PACKAGE_ID[0], PACKAGE_ID[1], PACKAGE_ID[2])
        .context("failed to get config")?;
    let path = match config_dir {
        Some(p) => p.as_ref().to_path_buf(),
        None => dirs.config_dir().to_path_buf(),
    };
    // return an error if the path is not a directory.
    if !path.is_dir() {
        return Err(anyhow::anyhow!("{} is not a directory", path.display()));
    }
    tracing::trace!("Loading Config from {} ..", path.display());
    let v = crate::utils::load(path)?;
    tracing::trace!("Config loaded..");
    Ok(v)
}

/// Sets up the logger for the bridge, based on the verbosity level passed in.
///
/// # Arguments
///
/// * `verbosity` - An i32 integer representing the verbosity level.
pub fn setup_logger(verbosity: i32) -> anyhow::Result<()> {
    use tracing::Level;
    let log_level = match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("starkgate={log_level}").parse()?)
        .add_directive(
            format!("{}={log_level}", starkgate_bridge_utils::probe::TARGET)
                .parse()?,
        );
    let logger = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(log_level)
        .with_env_filter(env_filter);
    // if we are not compiling for integration tests, we should use pretty logs
    #[cfg(not(feature = "integration-tests"))]
    let logger = logger.pretty();
    // otherwise, we should use json, which is easy to parse.
    #[cfg(feature = "integration-tests")]
    let logger = logger.json().flatten_event(true).with_current_span(false);

    logger.init();
    Ok(())
}
