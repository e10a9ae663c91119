use crate::records::{run_check, run_list, RecordsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use praktijk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "praktijk-site",
    about = "Run the practice website or inspect its record document",
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
    /// Inspect the persisted leave periods and popups
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RecordsCommand {
    /// Print the current document as pretty JSON
    List(RecordsArgs),
    /// Report whether the document is missing, unreadable, or healthy
    Check(RecordsArgs),
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
        Command::Records {
            command: RecordsCommand::List(args),
        } => run_list(args),
        Command::Records {
            command: RecordsCommand::Check(args),
        } => run_check(args),
    }
}
