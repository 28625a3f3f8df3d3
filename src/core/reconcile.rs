use crate::config::OperatorConfig;
use crate::core::fact_reader::FactReader;
use crate::core::readiness::{evaluate, Verdict, WORKLOAD_UNREACHABLE};
use crate::core::render::{config_bindings, service_layer, CONFIG_TEMPLATE};
use crate::core::{
    PeerFact, ReadinessSignal, RelationSubstrate, Result, TemplateRenderer, UnitStatus,
    WorkloadControl,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub status: UnitStatus,
    /// The trigger must be redelivered later.
    pub deferred: bool,
}

/// Everything one reconciliation pass looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub signal: ReadinessSignal,
    pub nrf: Option<PeerFact>,
    pub udm: Option<PeerFact>,
}

/// Renders and applies the workload configuration once both upstreams are known.
///
/// Holds no state between passes; every call re-reads the workload and relations.
pub struct ReconciliationController<'a, W, R, T>
where
    W: WorkloadControl + ?Sized,
    R: RelationSubstrate + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    config: &'a OperatorConfig,
    workload: &'a W,
    relations: &'a R,
    renderer: &'a T,
}

impl<'a, W, R, T> ReconciliationController<'a, W, R, T>
where
    W: WorkloadControl + ?Sized,
    R: RelationSubstrate + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    pub fn new(config: &'a OperatorConfig, workload: &'a W, relations: &'a R, renderer: &'a T) -> Self {
        Self {
            config,
            workload,
            relations,
            renderer,
        }
    }

    pub async fn observe(&self) -> Result<Observation> {
        let nrf = self.config.nrf();
        let udm = self.config.udm();

        let nrf_relation_exists = self.relations.get_relation(&nrf.relation, None).await?.is_some();
        let udm_relation_exists = self.relations.get_relation(&udm.relation, None).await?.is_some();
        let nrf_fact = FactReader::new(self.relations, &nrf).read().await?.into_fact();
        let udm_fact = FactReader::new(self.relations, &udm).read().await?.into_fact();

        Ok(Observation {
            signal: ReadinessSignal {
                workload_reachable: self.workload.reachable().await,
                nrf_relation_exists,
                udm_relation_exists,
                nrf_fact_complete: nrf_fact.is_some(),
                udm_fact_complete: udm_fact.is_some(),
            },
            nrf: nrf_fact,
            udm: udm_fact,
        })
    }

    pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
        let observation = self.observe().await?;
        tracing::debug!("Readiness: {:?}", observation.signal);

        let verdict = evaluate(
            &observation.signal,
            &self.config.nrf().label,
            &self.config.udm().label,
        );
        if let Verdict::Hold { status, retry } = verdict {
            tracing::info!("Not reconciling: {}", status);
            return Ok(ReconcileOutcome {
                status,
                deferred: retry,
            });
        }
        let (Some(nrf), Some(udm)) = (observation.nrf, observation.udm) else {
            return Ok(ReconcileOutcome {
                status: UnitStatus::Waiting("Waiting for relation data".to_string()),
                deferred: false,
            });
        };

        match self.render_and_apply(&nrf, &udm).await {
            Ok(()) => Ok(ReconcileOutcome {
                status: UnitStatus::Active,
                deferred: false,
            }),
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    "Container {} went away while applying configuration: {}",
                    self.config.workload.container,
                    e
                );
                Ok(ReconcileOutcome {
                    status: UnitStatus::Waiting(WORKLOAD_UNREACHABLE.to_string()),
                    deferred: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn render_and_apply(&self, nrf: &PeerFact, udm: &PeerFact) -> Result<()> {
        let bindings = config_bindings(self.config, nrf, udm);
        let content = self.renderer.render(CONFIG_TEMPLATE, &bindings)?;

        self.workload
            .push_file(&self.config.config_path(), &content)
            .await?;
        tracing::info!(
            "Wrote {} to container {}",
            self.config.workload.config_file,
            self.config.workload.container
        );

        self.workload.apply(&service_layer(self.config)).await?;
        self.workload.restart(&self.config.workload.service).await?;
        tracing::info!("Restarted service {}", self.config.workload.service);
        Ok(())
    }

    pub async fn config_file_is_pushed(&self) -> Result<bool> {
        let path = self.config.config_path();
        let pushed = self.workload.file_exists(&path).await?;
        if pushed {
            tracing::info!("Config file is pushed");
        } else {
            tracing::info!("Config file is not written: {}", self.config.workload.config_file);
        }
        Ok(pushed)
    }
}
