use crate::domain::model::{Relation, RelationData, ServiceLayer, ServiceStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Control plane of the container the managed process runs in.
#[async_trait]
pub trait WorkloadControl: Send + Sync {
    async fn reachable(&self) -> bool;
    async fn service_status(&self, name: &str) -> Result<ServiceStatus>;
    /// Merge `layer` into the current plan, replacing services with the same name.
    async fn apply(&self, layer: &ServiceLayer) -> Result<()>;
    async fn restart(&self, name: &str) -> Result<()>;
    async fn push_file(&self, path: &str, content: &str) -> Result<()>;
    async fn file_exists(&self, path: &str) -> Result<bool>;
}

/// Shared relation data, app-scoped. Only the local application's bag is writable.
#[async_trait]
pub trait RelationSubstrate: Send + Sync {
    fn local_app(&self) -> &str;
    async fn get_relation(&self, name: &str, id: Option<u32>) -> Result<Option<Relation>>;
    async fn list_relations(&self, name: &str) -> Result<Vec<Relation>>;
    async fn read(&self, relation: &Relation, owner: &str) -> Result<RelationData>;
    /// Replaces the given keys of the local application's bag in one update.
    async fn write(&self, relation: &Relation, data: RelationData) -> Result<()>;
}

pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_name: &str, bindings: &BTreeMap<String, String>) -> Result<String>;
}

/// Single-writer designation among redundant units.
pub trait Leadership: Send + Sync {
    fn is_sole_writer(&self) -> bool;
}

impl Leadership for bool {
    fn is_sole_writer(&self) -> bool {
        *self
    }
}
