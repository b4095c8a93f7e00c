//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Process entry point: config, components, listener, shutdown

use clap::Parser;
use matrixctl_server::{AppConfig, AppState, router};
use matrixctl_service::{AccessControl, CommandGateway, CredentialStore, MatrixLink};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "matrixctl-server",
    about = "HTTP control server for a telnet-attached video routing matrix"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, path = %cli.config.display(), "failed to load configuration");
            std::process::exit(1);
        }
    };
    let access_config = match config.access_config() {
        Ok(access_config) => access_config,
        Err(err) => {
            error!(error = %err, "invalid security configuration");
            std::process::exit(1);
        }
    };

    let link = Arc::new(MatrixLink::new(config.link_config()));
    let access = Arc::new(AccessControl::new(
        access_config,
        CredentialStore::new(config.users.clone()),
    ));
    let gateway = Arc::new(CommandGateway::new(
        link.clone(),
        access.clone(),
        config.cache_ttl(),
    ));
    let state = AppState { gateway, access };

    info!(
        device = %link.config().address(),
        "starting matrix control server"
    );
    if !link.ensure_connected().await {
        warn!("initial device connection failed, commands will reconnect on demand");
    }

    let bind = cli.bind.unwrap_or(config.server.bind);
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, address = %bind, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };
    info!(address = %bind, "listening");

    let app = router(state);
    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    });
    if let Err(err) = serve.await {
        error!(error = %err, "server error");
    }

    info!("shutting down");
    link.disconnect().await;
}
