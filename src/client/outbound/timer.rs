use std::sync::Arc;

use tokio::time::Duration;

use crate::client::app::connector::Connector;
use crate::client::outbound::exchange;
use crate::domain::client::outbound::{
    PausePort, QueryPort, RequestDaemonError, ResetPort, SetPhasePort, StartPort,
};
use crate::domain::entity::{TimerPhase, TimerState};
use crate::protocol::{Request, Response};

/// A [`StartPort`] implementation
pub struct StartService {
    connector: Arc<dyn Connector>,
}

impl StartService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl StartPort for StartService {
    async fn start(&self) -> Result<TimerState, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Start).await? {
            Response::Start { state } => Ok(state),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}

/// A [`PausePort`] implementation
pub struct PauseService {
    connector: Arc<dyn Connector>,
}

impl PauseService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl PausePort for PauseService {
    async fn pause(&self) -> Result<TimerState, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Pause).await? {
            Response::Pause { state } => Ok(state),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}

/// A [`ResetPort`] implementation
pub struct ResetService {
    connector: Arc<dyn Connector>,
}

impl ResetService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl ResetPort for ResetService {
    async fn reset(&self) -> Result<TimerState, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Reset).await? {
            Response::Reset { state } => Ok(state),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}

/// A [`SetPhasePort`] implementation
pub struct SetPhaseService {
    connector: Arc<dyn Connector>,
}

impl SetPhaseService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl SetPhasePort for SetPhaseService {
    async fn set_phase(
        &self,
        phase: TimerPhase,
        duration: Option<Duration>,
    ) -> Result<TimerState, RequestDaemonError> {
        let request = Request::SetPhase {
            phase,
            duration_millis: duration.map(|duration| duration.as_millis() as u64),
        };
        match exchange(self.connector.as_ref(), request).await? {
            Response::SetPhase { state } => Ok(state),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}

/// A [`QueryPort`] implementation
pub struct QueryService {
    connector: Arc<dyn Connector>,
}

impl QueryService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl QueryPort for QueryService {
    async fn query(&self) -> Result<TimerState, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Query).await? {
            Response::Query { state } => Ok(state),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}
