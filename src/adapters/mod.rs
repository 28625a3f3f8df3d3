// Adapters layer: concrete implementations of the domain ports for local runs and tests.

pub mod relations;
pub mod template;
pub mod workload;

pub use relations::{JsonRelationStore, RelationSnapshot};
pub use template::PlaceholderRenderer;
pub use workload::DirWorkload;
