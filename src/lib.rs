pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{DirWorkload, JsonRelationStore, PlaceholderRenderer, RelationSnapshot};
pub use config::OperatorConfig;
pub use core::{
    advertise::{AdvertiseOutcome, AdvertisementController},
    engine::{DispatchReport, EngineState, OperatorEngine},
    fact_publisher::{FactPublisher, PublishOutcome},
    fact_reader::{FactRead, FactReader, MissingFact},
    reconcile::{ReconcileOutcome, ReconciliationController},
};
pub use domain::model::{PeerFact, Trigger, UnitStatus};
pub use utils::error::{OperatorError, Result};
