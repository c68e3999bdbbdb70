use std::sync::Arc;

use tokio::sync::mpsc::{self, Receiver};

use crate::client::app::connector::Connector;
use crate::client::outbound::connect;
use crate::domain::client::outbound::{RequestDaemonError, WatchPort};
use crate::domain::entity::TimerState;
use crate::protocol::{ExchangeError, Request, Response};
use crate::tracing_report;

const STATE_BUFFER: usize = 16;

/// A [`WatchPort`] implementation which keeps a connection open and forwards
/// every streamed state into a channel.
pub struct WatchService {
    connector: Arc<dyn Connector>,
}

impl WatchService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl WatchPort for WatchService {
    async fn watch(&self) -> Result<Receiver<TimerState>, RequestDaemonError> {
        let mut connection = connect(self.connector.as_ref()).await?;
        let first = match connection.request(Request::Watch).await {
            Ok(Response::Watch { state }) => state,
            Ok(Response::Failure { message }) => {
                return Err(RequestDaemonError::Rejected { message })
            }
            Ok(_) | Err(ExchangeError::Unexpected { .. }) => {
                return Err(RequestDaemonError::BadResponse)
            }
            Err(err) => {
                return Err(RequestDaemonError::Unknown {
                    message: "Could not open state stream".to_owned(),
                    source: Some(err.into()),
                })
            }
        };

        let (sender, receiver) = mpsc::channel(STATE_BUFFER);
        tokio::spawn(async move {
            if sender.send(first).await.is_err() {
                return;
            }
            loop {
                let state = match connection.receive_response().await {
                    Ok(Response::Watch { state }) => state,
                    Ok(response) => {
                        tracing::warn!(?response, "Unexpected frame in state stream");
                        break;
                    }
                    Err(err) => {
                        tracing_report!(err, "State stream ended");
                        break;
                    }
                };
                if sender.send(state).await.is_err() {
                    break;
                }
            }
        });

        Ok(receiver)
    }
}
