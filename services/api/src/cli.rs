use crate::demo::{
    run_audit, run_benchmark, run_demo, run_score, run_som, AuditArgs, BenchmarkArgs, DemoArgs,
    ScoreArgs, SomArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use model_authority::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Model Authority",
    about = "Score, audit and benchmark brand visibility in generative AI answers",
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
    /// Calculate the Model Authority Index for a brand and log it
    Score(ScoreArgs),
    /// Estimate share of model from a JSON array of sampled responses
    Som(SomArgs),
    /// Check a site for llm.txt, ai-plugin.json and mcp.json
    Audit(AuditArgs),
    /// Rank brands of a sector and append the snapshot
    Benchmark(BenchmarkArgs),
    /// Run an offline end-to-end demo of the scoring pipeline
    Demo(DemoArgs),
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
        Command::Score(args) => run_score(args).await,
        Command::Som(args) => run_som(args),
        Command::Audit(args) => run_audit(args).await,
        Command::Benchmark(args) => run_benchmark(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
