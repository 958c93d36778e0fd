use crate::commands::{
    run_analytics, run_bulk, run_explain, run_history_clear, run_history_list, run_predict,
    BulkArgs, ExplainArgs, PredictArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hr_insights::config::AppConfig;
use hr_insights::error::AppError;
use hr_insights::telemetry::{self, LogSink};

#[derive(Parser, Debug)]
#[command(
    name = "HR Insights",
    about = "Run workforce predictions, analytics, and explanations from the command line",
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
    /// Predict attrition, performance, and retention for one employee profile
    Predict(PredictArgs),
    /// Upload a CSV of employees and print the bulk summary and watchlists
    Bulk(BulkArgs),
    /// Print chart series and watchlists across the stored history
    Analytics,
    /// Explain existing results without calling the prediction services
    Explain(ExplainArgs),
    /// Inspect or reset the stored prediction history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List stored entries, newest individual runs first
    List,
    /// Remove every stored entry
    Clear,
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

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, command.log_sink())?;

    match command {
        Command::Serve(args) => server::run(args, config).await,
        Command::Predict(args) => run_predict(&config, args).await,
        Command::Bulk(args) => run_bulk(&config, args).await,
        Command::Analytics => run_analytics(&config),
        Command::Explain(args) => run_explain(args),
        Command::History {
            command: HistoryCommand::List,
        } => run_history_list(&config),
        Command::History {
            command: HistoryCommand::Clear,
        } => run_history_clear(&config).await,
    }
}

impl Command {
    fn log_sink(&self) -> LogSink {
        match self {
            Command::Serve(_) => LogSink::Stdout,
            _ => LogSink::Stderr,
        }
    }
}
