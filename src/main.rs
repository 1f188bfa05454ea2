use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use home_dispatch::config::{config_path, Config};
use home_dispatch::server;
use home_dispatch::tools::ToolRegistry;

/// home-dispatch - smart-home command tools served over authenticated JSON-RPC
#[derive(Parser)]
#[command(name = "home-dispatch", version, about)]
struct Cli {
    /// Config file (defaults to <config dir>/home-dispatch/config.toml)
    #[arg(short, long, env = "HOME_DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overrides [server] host
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides [server] port
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "info,home_dispatch=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Command::InitConfig { force }) = cli.command {
        let path = cli.config.unwrap_or_else(config_path);
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }
        Config::default().save(Some(path.as_path()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let tools = ToolRegistry::new(&config);
    tracing::info!(tools = tools.tool_defs().len(), "tools registered");
    server::serve(&config.server, tools).await
}
