use crate::config::OperatorConfig;
use crate::core::advertise::{AdvertiseOutcome, AdvertisementController};
use crate::core::reconcile::ReconciliationController;
use crate::core::{
    Leadership, QueuedTrigger, RelationSubstrate, Result, TemplateRenderer, Trigger, UnitStatus,
    WorkloadControl,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Completed,
    Deferred,
    Ignored,
}

enum Route {
    Reconcile,
    Advertise(u32),
    Ignore,
}

/// What one delivery pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub completed: Vec<Trigger>,
    pub deferred: Vec<Trigger>,
    pub ignored: Vec<Trigger>,
}

/// The parts of engine state that outlive a single process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub status: UnitStatus,
    pub deferred: Vec<QueuedTrigger>,
}

/// Processes triggers one at a time, to completion, in arrival order.
///
/// Deferred triggers are queued and redelivered ahead of the next new trigger.
pub struct OperatorEngine<W, R, T, L>
where
    W: WorkloadControl,
    R: RelationSubstrate,
    T: TemplateRenderer,
    L: Leadership,
{
    config: OperatorConfig,
    workload: W,
    relations: R,
    renderer: T,
    leadership: L,
    state: EngineState,
}

impl<W, R, T, L> OperatorEngine<W, R, T, L>
where
    W: WorkloadControl,
    R: RelationSubstrate,
    T: TemplateRenderer,
    L: Leadership,
{
    pub fn new(config: OperatorConfig, workload: W, relations: R, renderer: T, leadership: L) -> Self {
        Self {
            config,
            workload,
            relations,
            renderer,
            leadership,
            state: EngineState::default(),
        }
    }

    /// Resume with a status and deferred queue saved by an earlier run.
    pub fn with_state(mut self, state: EngineState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn status(&self) -> &UnitStatus {
        &self.state.status
    }

    pub fn deferred(&self) -> &[QueuedTrigger] {
        &self.state.deferred
    }

    pub fn workload(&self) -> &W {
        &self.workload
    }

    pub fn relations(&self) -> &R {
        &self.relations
    }

    pub fn reconciler(&self) -> ReconciliationController<'_, W, R, T> {
        ReconciliationController::new(&self.config, &self.workload, &self.relations, &self.renderer)
    }

    pub fn advertiser(&self) -> AdvertisementController<'_, W, R, L> {
        AdvertisementController::new(&self.config, &self.workload, &self.relations, &self.leadership)
    }

    /// Redeliver deferred triggers, then handle `trigger`.
    pub async fn deliver(&mut self, trigger: Trigger) -> Result<DispatchReport> {
        tracing::info!("Received {}", trigger);
        let mut pending = std::mem::take(&mut self.state.deferred);
        pending.push(QueuedTrigger::fresh(trigger));
        self.process(pending).await
    }

    /// Redeliver deferred triggers only.
    pub async fn redeliver(&mut self) -> Result<DispatchReport> {
        let pending = std::mem::take(&mut self.state.deferred);
        self.process(pending).await
    }

    async fn process(&mut self, pending: Vec<QueuedTrigger>) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();
        let mut queue = pending.into_iter();

        while let Some(queued) = queue.next() {
            if queued.deferred {
                tracing::debug!(
                    "Redelivering {} (attempt {})",
                    queued.trigger,
                    queued.attempts + 1
                );
            }
            match self.dispatch(&queued.trigger).await {
                Ok(HandlerOutcome::Completed) => report.completed.push(queued.trigger),
                Ok(HandlerOutcome::Ignored) => report.ignored.push(queued.trigger),
                Ok(HandlerOutcome::Deferred) => {
                    tracing::info!("Deferring {}", queued.trigger);
                    report.deferred.push(queued.trigger.clone());
                    self.state.deferred.push(queued.defer());
                }
                Err(e) => {
                    tracing::error!("Handling {} failed: {}", queued.trigger, e);
                    self.state.deferred.extend(queue);
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    fn route(&self, trigger: &Trigger) -> Route {
        let relations = &self.config.relations;
        match trigger {
            Trigger::ConfigChanged => Route::Reconcile,
            Trigger::RelationChanged { relation, .. }
                if *relation == relations.nrf || *relation == relations.udm =>
            {
                Route::Reconcile
            }
            Trigger::RelationJoined { relation, id } if *relation == relations.ausf => {
                Route::Advertise(*id)
            }
            _ => Route::Ignore,
        }
    }

    async fn dispatch(&mut self, trigger: &Trigger) -> Result<HandlerOutcome> {
        match self.route(trigger) {
            Route::Reconcile => self.on_reconcile_trigger().await,
            Route::Advertise(id) => match self.advertiser().on_consumer_joined(id).await? {
                AdvertiseOutcome::Deferred => Ok(HandlerOutcome::Deferred),
                AdvertiseOutcome::NotLeader | AdvertiseOutcome::Published(_) => {
                    Ok(HandlerOutcome::Completed)
                }
            },
            Route::Ignore => {
                tracing::debug!("No handler for {}", trigger);
                Ok(HandlerOutcome::Ignored)
            }
        }
    }

    async fn on_reconcile_trigger(&mut self) -> Result<HandlerOutcome> {
        let outcome = self.reconciler().reconcile().await?;
        tracing::info!("Unit status: {}", outcome.status);
        self.state.status = outcome.status;
        Ok(if outcome.deferred {
            HandlerOutcome::Deferred
        } else {
            HandlerOutcome::Completed
        })
    }
}
