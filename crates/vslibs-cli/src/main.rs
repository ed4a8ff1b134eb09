//! install-vapoursynth-libs CLI

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;

use vslibs_cli::{Cli, Commands, USAGE, cmd, init_tracing};
use vslibs_core::tools;

#[tokio::main]
async fn main() -> Result<()> {
    // Prerequisites come before argument parsing
    if let Err(e) = tools::require_tools() {
        println!("{e}");
        std::process::exit(1);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e.kind());
            println!("{USAGE}");
            std::process::exit(1);
        }
    };

    init_tracing(cli.options.debug)?;

    match &cli.command {
        Commands::Install(target) => cmd::install::install(target, &cli.options).await,
        Commands::Uninstall(target) => cmd::uninstall::uninstall(target),
    }
}
