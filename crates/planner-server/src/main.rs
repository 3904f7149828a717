use std::path::PathBuf;

use clap::{Parser, Subcommand};
use planner_server::{invoke, logging::init_logging, run_server, AppState, PlannerArgs};

#[derive(Parser, Debug)]
#[command(name = "planner-server")]
#[command(about = "Travel itinerary generation service")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    #[command(flatten)]
    planner: PlannerArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve HTTP (default)
    Serve,

    /// Handle a single event document and print the response
    Invoke {
        /// Event file, or '-' for stdin
        #[arg(default_value = "-")]
        event: PathBuf,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.debug);

    if cli.debug {
        log::debug!("Debug mode enabled");
        log::debug!("Configuration: {:?}", cli.planner);
    }

    let state = AppState::from_args(&cli.planner).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            log::info!("Starting planner server on {}:{}", cli.host, cli.port);
            run_server(&cli.host, cli.port, state).await?;
        }
        Command::Invoke { event } => {
            invoke::run(&state, &event).await?;
        }
    }

    Ok(())
}
