use std::sync::Arc;

use crate::client::app::connector::Connector;
use crate::client::outbound::exchange;
use crate::domain::client::outbound::{RequestDaemonError, StatsPort};
use crate::domain::entity::DailyStats;
use crate::protocol::{Request, Response};

/// A [`StatsPort`] implementation
pub struct StatsService {
    connector: Arc<dyn Connector>,
}

impl StatsService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl StatsPort for StatsService {
    async fn stats(&self) -> Result<DailyStats, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Stats).await? {
            Response::Stats { stats } => Ok(stats),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}
