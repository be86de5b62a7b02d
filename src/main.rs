//! ciinabox-services CLI.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ciinabox-services",
    version,
    about = "Compile ciinabox service definitions into a CloudFormation template"
)]
struct Cli {
    #[command(subcommand)]
    command: ciinabox_services::cli::Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = ciinabox_services::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
