use crate::config::OperatorConfig;
use crate::core::fact_publisher::{FactPublisher, PublishOutcome};
use crate::core::{Leadership, PeerFact, RelationSubstrate, Result, ServiceStatus, WorkloadControl};

/// Same-pod peers reach the service over loopback.
pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseOutcome {
    NotLeader,
    Deferred,
    Published(PublishOutcome),
}

/// Announces this unit's own endpoint to consumers once the service is running.
pub struct AdvertisementController<'a, W, R, L>
where
    W: WorkloadControl + ?Sized,
    R: RelationSubstrate + ?Sized,
    L: Leadership + ?Sized,
{
    config: &'a OperatorConfig,
    workload: &'a W,
    relations: &'a R,
    leadership: &'a L,
}

impl<'a, W, R, L> AdvertisementController<'a, W, R, L>
where
    W: WorkloadControl + ?Sized,
    R: RelationSubstrate + ?Sized,
    L: Leadership + ?Sized,
{
    pub fn new(config: &'a OperatorConfig, workload: &'a W, relations: &'a R, leadership: &'a L) -> Self {
        Self {
            config,
            workload,
            relations,
            leadership,
        }
    }

    pub fn local_fact(&self) -> PeerFact {
        PeerFact {
            ipv4_address: LOOPBACK_ADDRESS.to_string(),
            fqdn: self.config.service_fqdn(),
            port: self.config.sbi.port.to_string(),
            api_version: self.config.sbi.api_version.clone(),
        }
    }

    /// Reachable and the managed service itself is running.
    pub async fn service_started(&self) -> Result<bool> {
        if !self.workload.reachable().await {
            return Ok(false);
        }
        match self.workload.service_status(&self.config.workload.service).await {
            Ok(status) => Ok(status == ServiceStatus::Running),
            Err(e) if e.is_retryable() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Handles a consumer joining relation instance `relation_id`.
    pub async fn on_consumer_joined(&self, relation_id: u32) -> Result<AdvertiseOutcome> {
        if !self.leadership.is_sole_writer() {
            return Ok(AdvertiseOutcome::NotLeader);
        }
        if !self.service_started().await? {
            tracing::info!("AUSF service not started yet, deferring event");
            return Ok(AdvertiseOutcome::Deferred);
        }

        let capability = self.config.ausf_capability();
        let outcome = FactPublisher::new(self.relations, &capability)
            .publish(relation_id, &self.local_fact())
            .await?;
        Ok(AdvertiseOutcome::Published(outcome))
    }

    /// Re-announces to every consumer; `None` when not leader or the service is down.
    pub async fn advertise_all(&self) -> Result<Option<usize>> {
        if !self.leadership.is_sole_writer() || !self.service_started().await? {
            return Ok(None);
        }
        let capability = self.config.ausf_capability();
        let written = FactPublisher::new(self.relations, &capability)
            .publish_to_all(&self.local_fact())
            .await?;
        Ok(Some(written))
    }
}
