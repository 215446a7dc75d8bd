// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use wallet_key_cache::{config::Config, daemon, logging};

#[tokio::main]
async fn main() -> ExitCode {
    // Optional; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_format);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received ctrl-c, stopping after the current cycle");
                shutdown.cancel();
            }
        }
    });

    info!("Wallet key cache starting");
    match daemon::run(config, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Wallet key cache stopped");
            ExitCode::FAILURE
        }
    }
}
