mod demo;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "plaza", about = "Plaza — town-scoped chat sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted two-player session against the in-memory provider.
    Demo {
        /// Town id (the town channel's unique name).
        #[arg(long, default_value = "town-demo")]
        town: String,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON.
    Show,
    /// Print the config file path in effect (or the default location).
    Path,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "plaza starting");

    match cli.command {
        Commands::Demo { town } => demo::run(&town).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let cfg = plaza_config::discover_and_load();
                println!("{}", serde_json::to_string_pretty(&cfg)?);
                Ok(())
            },
            ConfigAction::Path => {
                println!("{}", plaza_config::find_or_default_config_path().display());
                Ok(())
            },
        },
    }
}
