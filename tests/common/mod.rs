#![allow(dead_code)]

use async_trait::async_trait;
use ausf_operator::domain::model::{ServiceLayer, ServiceStatus};
use ausf_operator::domain::ports::WorkloadControl;
use ausf_operator::{
    JsonRelationStore, OperatorConfig, OperatorEngine, OperatorError, PlaceholderRenderer,
    RelationSnapshot, Result,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const APP: &str = "oai-5g-ausf";

/// Workload double that records every call the operator makes.
#[derive(Default)]
pub struct MockWorkload {
    unreachable: AtomicBool,
    running: AtomicBool,
    restarts: AtomicUsize,
    files: Mutex<BTreeMap<String, String>>,
    pushes: AtomicUsize,
    layers: Mutex<Vec<ServiceLayer>>,
}

impl MockWorkload {
    pub fn reachable() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        let workload = Self::default();
        workload.set_reachable(false);
        workload
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn layers(&self) -> Vec<ServiceLayer> {
        self.layers.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(OperatorError::Unreachable {
                message: "mock workload offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WorkloadControl for MockWorkload {
    async fn reachable(&self) -> bool {
        !self.unreachable.load(Ordering::SeqCst)
    }

    async fn service_status(&self, _name: &str) -> Result<ServiceStatus> {
        self.check()?;
        Ok(if self.running.load(Ordering::SeqCst) {
            ServiceStatus::Running
        } else {
            ServiceStatus::NotRunning
        })
    }

    async fn apply(&self, layer: &ServiceLayer) -> Result<()> {
        self.check()?;
        self.layers.lock().unwrap().push(layer.clone());
        Ok(())
    }

    async fn restart(&self, _name: &str) -> Result<()> {
        self.check()?;
        self.restarts.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn push_file(&self, path: &str, content: &str) -> Result<()> {
        self.check()?;
        self.pushes.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        self.check()?;
        Ok(self.files.lock().unwrap().contains_key(path))
    }
}

pub type TestEngine = OperatorEngine<MockWorkload, JsonRelationStore, PlaceholderRenderer, bool>;

pub fn test_config() -> OperatorConfig {
    let mut config = OperatorConfig::default();
    config.unit.model_name = "whatever".to_string();
    config.sbi.interface_name = "eth0".to_string();
    config
}

pub fn engine(snapshot: RelationSnapshot, workload: MockWorkload, leader: bool) -> TestEngine {
    OperatorEngine::new(
        test_config(),
        workload,
        JsonRelationStore::in_memory(snapshot),
        PlaceholderRenderer::builtin().unwrap(),
        leader,
    )
}

pub fn fact_data(prefix: &str, address: &str, port: &str, fqdn: &str) -> Vec<(String, String)> {
    vec![
        (format!("{}_ipv4_address", prefix), address.to_string()),
        (format!("{}_port", prefix), port.to_string()),
        (format!("{}_api_version", prefix), "v1".to_string()),
        (format!("{}_fqdn", prefix), fqdn.to_string()),
    ]
}

/// Adds a joined relation carrying `data` from the remote application; returns its id.
pub fn add_related_app(
    snapshot: &mut RelationSnapshot,
    relation: &str,
    remote_app: &str,
    data: &[(String, String)],
) -> u32 {
    let id = snapshot.add_relation(relation, Some(remote_app));
    for (key, value) in data {
        snapshot.set(id, remote_app, key, value);
    }
    id
}

pub fn nrf_data() -> Vec<(String, String)> {
    fact_data("nrf", "1.2.3.4", "81", "a.example.com")
}

pub fn udm_data() -> Vec<(String, String)> {
    fact_data("udm", "5.6.7.8", "82", "b.example.com")
}

pub fn ready_snapshot() -> (RelationSnapshot, u32, u32) {
    let mut snapshot = RelationSnapshot::new(APP);
    let nrf = add_related_app(&mut snapshot, "fiveg-nrf", "nrf", &nrf_data());
    let udm = add_related_app(&mut snapshot, "fiveg-udm", "udm", &udm_data());
    (snapshot, nrf, udm)
}
