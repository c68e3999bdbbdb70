mod cli;
mod setup;

use clap::Parser;
use cli::Arguments;
use snafu::{prelude::*, Whatever};
use tracing::Level;

#[snafu::report]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Whatever> {
    let args = Arguments::parse();

    // Only fallbacks and failures are worth a line next to the output.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Could not setup logger")?;

    let client = setup::bootstrap(&args).whatever_context("Could not bootstrap client")?;
    client
        .run(args.command.into())
        .await
        .whatever_context("Command failed")?;

    Ok(())
}
