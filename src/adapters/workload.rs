use crate::domain::model::{ServiceLayer, ServiceStatus};
use crate::domain::ports::WorkloadControl;
use crate::utils::error::{OperatorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

const CONTROL_DIR: &str = ".pebble";
const PLAN_FILE: &str = "plan.json";
const SERVICES_FILE: &str = "services.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub running: bool,
    pub restarts: u32,
}

/// Workload control plane over a directory that mirrors the container filesystem.
///
/// The container counts as reachable while the root directory exists. The merged
/// plan and per-service state live under `.pebble/` inside the root.
#[derive(Debug, Clone)]
pub struct DirWorkload {
    root: PathBuf,
}

impl DirWorkload {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Maps a container path under `root`; paths that would leave it are refused.
    fn container_path(&self, path: &str) -> Result<PathBuf> {
        let mut full_path = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => full_path.push(part),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(OperatorError::WorkloadError {
                        message: format!("path '{}' escapes the container root", path),
                    });
                }
            }
        }
        Ok(full_path)
    }

    fn control_file(&self, name: &str) -> PathBuf {
        self.root.join(CONTROL_DIR).join(name)
    }

    fn ensure_reachable(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(OperatorError::Unreachable {
                message: format!("{} does not exist", self.root.display()),
            })
        }
    }

    fn load<T: Default + for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let path = self.control_file(name);
        if !path.exists() {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    fn store<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.control_file(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(value)?)?;
        Ok(())
    }

    pub fn plan(&self) -> Result<ServiceLayer> {
        self.load(PLAN_FILE)
    }

    pub fn services(&self) -> Result<BTreeMap<String, ServiceState>> {
        self.load(SERVICES_FILE)
    }
}

#[async_trait]
impl WorkloadControl for DirWorkload {
    async fn reachable(&self) -> bool {
        self.root.is_dir()
    }

    async fn service_status(&self, name: &str) -> Result<ServiceStatus> {
        self.ensure_reachable()?;
        if !self.plan()?.services.contains_key(name) {
            return Ok(ServiceStatus::NotFound);
        }
        let running = self
            .services()?
            .get(name)
            .map(|state| state.running)
            .unwrap_or(false);
        Ok(if running {
            ServiceStatus::Running
        } else {
            ServiceStatus::NotRunning
        })
    }

    async fn apply(&self, layer: &ServiceLayer) -> Result<()> {
        self.ensure_reachable()?;
        let mut plan = self.plan()?;
        plan.summary = layer.summary.clone();
        plan.description = layer.description.clone();
        plan.services.extend(layer.services.clone());
        self.store(PLAN_FILE, &plan)?;
        tracing::debug!("Applied layer '{}' to {}", layer.summary, self.root.display());
        Ok(())
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.ensure_reachable()?;
        if !self.plan()?.services.contains_key(name) {
            return Err(OperatorError::WorkloadError {
                message: format!("service '{}' is not in the plan", name),
            });
        }
        let mut services = self.services()?;
        let state = services.entry(name.to_string()).or_default();
        state.running = true;
        state.restarts += 1;
        self.store(SERVICES_FILE, &services)?;
        Ok(())
    }

    async fn push_file(&self, path: &str, content: &str) -> Result<()> {
        self.ensure_reachable()?;
        let full_path = self.container_path(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full_path, content)?;
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        self.ensure_reachable()?;
        Ok(self.container_path(path)?.exists())
    }
}
