pub mod advertise;
pub mod engine;
pub mod fact_publisher;
pub mod fact_reader;
pub mod readiness;
pub mod reconcile;
pub mod render;

pub use crate::domain::model::{
    Capability, PeerFact, QueuedTrigger, ReadinessSignal, Relation, ServiceLayer, ServiceStatus,
    Trigger, UnitStatus,
};
pub use crate::domain::ports::{Leadership, RelationSubstrate, TemplateRenderer, WorkloadControl};
pub use crate::utils::error::{OperatorError, Result};
