/// End-to-end reservation run: validate the request, log in, submit the
/// search form, then hand over to the polling loop.
use crate::error::{Result, SessionError};
use crate::models::{Credentials, PollReport, SearchCriteria};
use crate::policy::PriorityPolicy;
use crate::services::polling::{Clock, CommitGateway, PollingLoop, SnapshotSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Session establishment and search form population.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> std::result::Result<(), SessionError>;

    /// Fill in and submit the search form so the departure board is showing.
    async fn search(&self, criteria: &SearchCriteria) -> std::result::Result<(), SessionError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub credentials: Credentials,
    pub criteria: SearchCriteria,
}

pub struct AutoReserver<G, S, C, K> {
    session: G,
    poller: PollingLoop<S, C, K>,
}

impl<G, S, C, K> AutoReserver<G, S, C, K>
where
    G: SessionGateway,
    S: SnapshotSource,
    C: CommitGateway<S::Handle>,
    K: Clock,
{
    pub fn new(session: G, poller: PollingLoop<S, C, K>) -> Self {
        Self { session, poller }
    }

    /// `now` for request validation comes from the polling loop's clock.
    pub async fn run(
        &self,
        request: &ReservationRequest,
        policy: &PriorityPolicy,
    ) -> Result<PollReport> {
        request.credentials.validate()?;
        request.criteria.validate(self.poller.clock().now().date())?;

        self.session.login(&request.credentials).await?;
        info!(member_id = %request.credentials.member_id, "Logged in");

        self.session.search(&request.criteria).await?;
        info!(
            departure = %request.criteria.departure,
            destination = %request.criteria.destination,
            slot_hour = request.criteria.search_slot_hour(),
            passengers = request.criteria.passengers.total(),
            "Search submitted"
        );

        Ok(self.poller.run(policy).await)
    }
}
