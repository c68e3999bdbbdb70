use std::error::Error as StdError;
use std::sync::Arc;

use snafu::prelude::*;
use snafu::Report;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;
use tracing::{field::Empty, Instrument, Span};

use crate::daemon::app::listener::{ListenError, Listener};
use crate::domain::daemon::ApplicationCore;
use crate::protocol::{Connection, Protocol, ReceiveFrameError, Request, Response, SendFrameError};
use crate::tracing_report;
use crate::utils::stream::Stream;

/// A dedicated server which listens on a UNIX socket and handles requests
/// from observers.
pub struct Server {
    listener: Box<dyn Listener>,
    core: Arc<ApplicationCore>,
}

impl Server {
    /// Creates a new [`Server`].
    pub fn new(listener: Box<dyn Listener>, core: ApplicationCore) -> Self {
        Self {
            listener,
            core: Arc::new(core),
        }
    }

    /// Accept connections and handle each of them on its own task.
    ///
    /// # Errors
    ///
    /// This function will return an error if the server fails to accept
    /// connections.
    #[tracing::instrument(skip(self))]
    pub async fn serve(&self) -> Result<(), ServerError> {
        loop {
            let stream = self.listener.accept().await.context(ListenSnafu)?;
            tracing::debug!("Accepted connection");

            let core = Arc::clone(&self.core);
            let connection = Connection::from(stream);
            let span = tracing::info_span!("handle", req = Empty).or_current();
            tokio::spawn(
                async move {
                    if let Err(err) = Self::handle(core, connection).await {
                        tracing_report!(err, "Could not handle request");
                    }
                }
                .instrument(span),
            );
        }
    }

    /// Handle the single request of an accepted connection. A `Watch` request
    /// keeps the connection open until the observer goes away.
    ///
    /// # Errors
    ///
    /// This function will return an error if handling connection fails.
    async fn handle<S: Stream>(
        core: Arc<ApplicationCore>,
        mut connection: Connection<S>,
    ) -> Result<(), ServerError> {
        let request = match Protocol::from(connection.receive().await.context(ReceiveSnafu)?) {
            Protocol::Request(request) => request,
            protocol => return BadRequestSnafu { protocol }.fail(),
        };

        Span::current().record("req", format!("{request:?}"));
        tracing::info!("Received request");

        let response = match request {
            Request::Start => Response::Start {
                state: core.start.start().await,
            },
            Request::Pause => Response::Pause {
                state: core.pause.pause().await,
            },
            Request::Reset => Response::Reset {
                state: core.reset.reset().await,
            },
            Request::SetPhase {
                phase,
                duration_millis,
            } => Response::SetPhase {
                state: core
                    .set_phase
                    .set_phase(phase, duration_millis.map(Duration::from_millis))
                    .await,
            },
            Request::Query => Response::Query {
                state: core.query.query().await,
            },
            Request::Watch => return Self::stream(core, connection).await,
            Request::Settings => match core.settings.settings().await {
                Ok(settings) => Response::Settings { settings },
                Err(err) => failure(err),
            },
            Request::UpdateSettings { patch } => {
                match core.settings.update_settings(patch).await {
                    Ok(settings) => Response::UpdateSettings { settings },
                    Err(err) => failure(err),
                }
            }
            Request::Stats => match core.stats.stats().await {
                Ok(stats) => Response::Stats { stats },
                Err(err) => failure(err),
            },
        };

        connection
            .send(Protocol::Response(response).into())
            .await
            .context(SendSnafu)
            .inspect(|_| tracing::info!("Sent response"))
    }

    /// Stream the current state followed by every published one.
    async fn stream<S: Stream>(
        core: Arc<ApplicationCore>,
        mut connection: Connection<S>,
    ) -> Result<(), ServerError> {
        // Subscribe first so nothing published after the snapshot is missed.
        let mut states = core.watch.subscribe();
        let mut last = core.watch.snapshot();
        connection
            .send(Protocol::Response(Response::Watch { state: last }).into())
            .await
            .context(SendSnafu)?;

        loop {
            let state = match states.recv().await {
                Ok(state) if state == last => continue,
                Ok(state) => state,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Observer lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => return Ok(()),
            };

            let frame = Protocol::Response(Response::Watch { state }).into();
            if let Err(err) = connection.send(frame).await {
                tracing::debug!(%err, "Observer went away");
                return Ok(());
            }
            last = state;
        }
    }
}

/// Report a failed request to the log and to the observer.
fn failure<E: StdError + 'static>(err: E) -> Response {
    let report = Report::from_error(err);
    tracing::warn!(err = %report, "Request failed");
    Response::Failure {
        message: report.to_string(),
    }
}

/// An error type for server.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ServerError {
    #[snafu(display("Could not accept a connection"))]
    Listen { source: ListenError },
    #[snafu(display("Could not receive a request"))]
    Receive { source: ReceiveFrameError },
    #[snafu(display("Could not handle {protocol:?}"))]
    BadRequest { protocol: Protocol },
    #[snafu(display("Could not send a response"))]
    Send { source: SendFrameError },
}
