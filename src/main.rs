use clap::Parser;
use tracing_subscriber::EnvFilter;

use db_check::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Check progress and warnings go to stderr; the report owns stdout
    let filter = if cli.verbose {
        EnvFilter::new("db_check=debug,info")
    } else {
        EnvFilter::new("db_check=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Check(args) => {
            cli::check::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Parse(args) => {
            cli::parse::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
