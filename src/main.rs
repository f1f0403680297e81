use clap::Parser;

use keygrab::adapter::inbound::cli::command::{CheckCommand, Cli, ColorChoice, Commands};
use keygrab::adapter::inbound::cli::output::{self, OutputConfig};
use keygrab::adapter::inbound::cli::{check, run, search, tasks};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Tasks(args) => tasks::execute(args),
        Commands::Search(args) => search::execute(args).await,
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
