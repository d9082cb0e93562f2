use crate::console::{
    run_clear, run_lottery, run_register, run_results, run_students, RegisterArgs, ResultsArgs,
    ScopeArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dorm_lottery::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dorm Lottery Front Desk",
    about = "Serve the room lottery front desk or drive a lottery pool from the command line",
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
    /// Print the ranked results board for a pool
    Results(ResultsArgs),
    /// List the students currently registered in a pool
    Students(ScopeArgs),
    /// Register a student through the registration gate
    Register(RegisterArgs),
    /// Ask the backend to run the lottery for a pool
    Run(ScopeArgs),
    /// Remove every student and assignment from a pool
    Clear(ScopeArgs),
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
        Command::Results(args) => run_results(args).await,
        Command::Students(args) => run_students(args).await,
        Command::Register(args) => run_register(args).await,
        Command::Run(args) => run_lottery(args).await,
        Command::Clear(args) => run_clear(args).await,
    }
}
