mod cli;
mod setup;

use clap::Parser;
use snafu::{prelude::*, Whatever};
use tokio::signal::unix::{signal, SignalKind};

use crate::cli::Arguments;

#[snafu::report]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Whatever> {
    let arg = Arguments::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(arg.verbosity)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Could not setup logger")?;

    let (server, runtime) = setup::bootstrap(arg).await?;

    let res = tokio::select! {
        res = server.serve() => res.whatever_context("Server failed to serve with fatal"),
        res = shutdown() => {
            tracing::info!("Received termination signal, shutting down");
            res.whatever_context("Could not listen for termination signals")
        }
    };

    drop(server);
    runtime.cleanup();
    res
}

/// Wait for either SIGINT or SIGTERM.
async fn shutdown() -> std::io::Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}
