use crate::batch::{run_decide, run_mine, DecideArgs, MineArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_rules::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Rules",
    about = "Mine underwriting rules from manual decisions and replay decision profiles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Mine a candidate decision profile from a file of historical applications
    Mine(MineArgs),
    /// Evaluate applications against one or more decision profiles
    Decide(DecideArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Mine(args) => run_mine(args),
        Command::Decide(args) => run_decide(args),
    }
}
