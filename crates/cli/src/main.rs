use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use gantry_config::GantryConfig;

#[derive(Parser)]
#[command(name = "gantry", about = "Slash-command webhook service for deployment operations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "GANTRY_LOG", default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true, env = "GANTRY_BIND")]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true, env = "GANTRY_PORT")]
    port: Option<u16>,

    /// Config file to load instead of searching the config directory.
    #[arg(long, global = true, env = "GANTRY_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server (default when no subcommand is provided).
    Serve,
    /// Print the effective configuration as TOML and exit.
    Config,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the configuration, then apply command-line overrides on top.
fn load_config(cli: &Cli) -> anyhow::Result<GantryConfig> {
    let mut config = match &cli.config {
        Some(path) => gantry_config::load_config(path)?,
        None => gantry_config::discover_and_load(),
    };
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "gantry starting");

    let config = load_config(&cli)?;
    match cli.command {
        None | Some(Commands::Serve) => gantry_gateway::start_server(config).await,
        Some(Commands::Config) => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        },
    }
}
