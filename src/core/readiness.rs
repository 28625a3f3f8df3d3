use crate::core::{ReadinessSignal, UnitStatus};

pub const WORKLOAD_UNREACHABLE: &str = "Waiting for workload management layer to be reachable";

/// What a reconciliation pass should do given the current readiness facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    /// Hold with a status; `retry` asks for the trigger to be deferred.
    Hold { status: UnitStatus, retry: bool },
}

/// Checks run in a fixed order; the first unmet one names the status.
pub fn evaluate(signal: &ReadinessSignal, nrf_label: &str, udm_label: &str) -> Verdict {
    if !signal.workload_reachable {
        return Verdict::Hold {
            status: UnitStatus::Waiting(WORKLOAD_UNREACHABLE.to_string()),
            retry: true,
        };
    }

    let checks = [
        (
            signal.nrf_relation_exists,
            UnitStatus::Blocked(format!("Waiting for relation to {} to be created", nrf_label)),
        ),
        (
            signal.udm_relation_exists,
            UnitStatus::Blocked(format!("Waiting for relation to {} to be created", udm_label)),
        ),
        (
            signal.nrf_fact_complete,
            UnitStatus::Waiting(format!(
                "Waiting for {} data to be available in relation data",
                nrf_label
            )),
        ),
        (
            signal.udm_fact_complete,
            UnitStatus::Waiting(format!(
                "Waiting for {} data to be available in relation data",
                udm_label
            )),
        ),
    ];

    match checks.into_iter().find(|(met, _)| !met) {
        Some((_, status)) => Verdict::Hold {
            status,
            retry: false,
        },
        None => Verdict::Proceed,
    }
}
