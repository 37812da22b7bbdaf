#![allow(missing_docs)]
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use realmgate_server::config::GatewayConfig;
use realmgate_server::run;

const DEFAULT_CONFIG: &str = "configs/config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let AppArgs { config, host, port } = AppArgs::parse().context("parsing arguments")?;
    let GatewayConfig {
        mut server,
        keycloak,
    } = GatewayConfig::load(&config)?;

    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    run(server.addr(), &keycloak).await?;

    info!("Bye!");
    Ok(())
}

#[derive(Debug)]
struct AppArgs {
    config: PathBuf,
    host: Option<IpAddr>,
    port: Option<u16>,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let config = pargs
            .opt_value_from_str("--config")
            .context("parsing config argument")?;

        let host = pargs
            .opt_value_from_str(["-h", "--host"])
            .context("parsing host argument")?;

        let port = pargs
            .opt_value_from_str(["-p", "--port"])
            .context("parsing port argument")?;

        let result = Self {
            config: config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
            host,
            port,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(result)
    }
}
