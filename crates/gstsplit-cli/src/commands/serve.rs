//! Serve command - run the HTTP upload service.

use clap::Args;

use super::config::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory split invoices are written to
    #[arg(short, long)]
    output_dir: Option<std::path::PathBuf>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(output_dir) = args.output_dir {
        config.storage.output_dir = output_dir;
    }

    gstsplit_server::serve(config).await
}
