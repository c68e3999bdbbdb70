mod init;
mod settings;
mod stats;
mod timer;
mod watch;

pub use init::{InitService, LaunchOptions};
pub use settings::SettingsService;
pub use stats::StatsService;
pub use timer::{PauseService, QueryService, ResetService, SetPhaseService, StartService};
pub use watch::WatchService;

use snafu::prelude::*;

use crate::client::app::connector::{ConnectError, Connector};
use crate::domain::client::outbound::{RejectedSnafu, RequestDaemonError, UnavailableSnafu};
use crate::protocol::{Connection, ExchangeError, Request, Response};
use crate::utils::stream::Stream;

/// Open a connection through `connector`.
async fn connect(
    connector: &dyn Connector,
) -> Result<Connection<Box<dyn Stream>>, RequestDaemonError> {
    match connector.connect().await {
        Ok(stream) => Ok(Connection::from(stream)),
        Err(ConnectError::Unavailable { endpoint }) => UnavailableSnafu { endpoint }.fail(),
        Err(err) => Err(err).whatever_context("Could not connect"),
    }
}

/// Send a single `request` and return the daemon's response. A
/// [`Response::Failure`] is turned into [`RequestDaemonError::Rejected`].
async fn exchange(
    connector: &dyn Connector,
    request: Request,
) -> Result<Response, RequestDaemonError> {
    let mut connection = connect(connector).await?;
    match connection.request(request).await {
        Ok(Response::Failure { message }) => RejectedSnafu { message }.fail(),
        Ok(response) => Ok(response),
        Err(ExchangeError::Unexpected { .. }) => {
            Err(RequestDaemonError::BadResponse)
        }
        Err(err) => Err(err).whatever_context("Could not exchange frames"),
    }
}
