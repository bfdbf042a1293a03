use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routedeck::config::{Config, DEFAULT_PORT};
use routedeck::{api, mcp};

#[derive(Parser)]
#[command(name = "routedeck")]
#[command(about = "Cards on a launcher, kept in sync with the navigation route tree")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, env = "ROUTEDECK_DB")]
    db: Option<PathBuf>,

    /// Port for HTTP API
    #[arg(short, long, global = true, env = "ROUTEDECK_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seed the base routes when the routes table is empty
    #[arg(
        long,
        global = true,
        env = "ROUTEDECK_SEED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    seed: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Start MCP server via stdio
    Mcp,
    /// Print the nested route tree as JSON
    Routes,
    /// Insert the base routes into an empty database
    Seed,
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Starting RouteDeck server on port {}", config.port);

    let db = config.open_database()?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!("RouteDeck server listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "routedeck=debug,routedeck_core=debug,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.db, cli.port, cli.seed)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await?,
        Commands::Mcp => {
            let db = config.open_database()?;
            mcp::run_stdio_server(db).await?;
        }
        Commands::Routes => {
            let db = config.open_database()?;
            let tree = db.get_routes_nested()?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Commands::Seed => {
            let db = Config {
                seed: false,
                ..config
            }
            .open_database()?;
            let created = db.seed_base_routes()?;
            println!("Seeded {created} base routes");
        }
    }

    Ok(())
}
