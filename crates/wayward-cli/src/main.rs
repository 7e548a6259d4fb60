use clap::{Parser, Subcommand};

mod catalog;
mod simulate;

#[derive(Debug, Parser)]
#[command(name = "wayward-cli")]
#[command(about = "Wayward load and latency simulation harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run load simulations against the in-process simulators
    Simulate {
        #[command(subcommand)]
        command: simulate::SimulateCommands,
    },
    /// List the simulator's attraction catalog
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate { command } => simulate::run(command).await,
        Commands::Catalog => catalog::run().await,
    }
}

#[cfg(test)]
mod tests;
