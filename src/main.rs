//! arxscout - arXiv literature research from the command line
//!
//! Parses the command line, builds the application with its API clients and
//! response cache, runs the requested command, and prints the result.

use clap::Parser;
use env_logger::Env;

use arxscout::app::App;
use arxscout::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Progress messages go to stderr so stdout stays pipeable.
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let app = App::from_cli(&cli);
    let output = app.run(cli.command).await?;
    println!("{output}");
    Ok(())
}
