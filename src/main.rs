use anyhow::Result;
use clap::Parser;
use portxcan::cli::{Cli, Commands};
use portxcan::config::AppSettings;
use portxcan::output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet)?;

    match &cli.command {
        Commands::Scan(cmd) => {
            let settings = AppSettings::load(cli.config.as_deref())?;
            cmd.execute(&settings, cli.quiet).await?;
        }
        Commands::Service(cmd) => cmd.execute()?,
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON and CSV.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects debug and `-q` errors only.
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let default_level = match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    Ok(())
}
