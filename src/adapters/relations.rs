use crate::domain::model::{Relation, RelationData};
use crate::domain::ports::RelationSubstrate;
use crate::utils::error::{OperatorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub name: String,
    pub id: u32,
    pub remote_app: Option<String>,
    /// Application name -> that application's bag.
    #[serde(default)]
    pub data: BTreeMap<String, RelationData>,
}

impl RelationRecord {
    fn handle(&self) -> Relation {
        Relation {
            name: self.name.clone(),
            id: self.id,
            remote_app: self.remote_app.clone(),
        }
    }
}

/// Serializable picture of every relation the local application takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSnapshot {
    pub local_app: String,
    #[serde(default)]
    pub next_id: u32,
    #[serde(default)]
    pub relations: Vec<RelationRecord>,
}

impl RelationSnapshot {
    pub fn new(local_app: &str) -> Self {
        Self {
            local_app: local_app.to_string(),
            next_id: 0,
            relations: Vec::new(),
        }
    }

    /// Creates a relation instance and returns its id.
    pub fn add_relation(&mut self, name: &str, remote_app: Option<&str>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.relations.push(RelationRecord {
            name: name.to_string(),
            id,
            remote_app: remote_app.map(str::to_string),
            data: BTreeMap::new(),
        });
        id
    }

    pub fn remove_relation(&mut self, id: u32) -> bool {
        let before = self.relations.len();
        self.relations.retain(|record| record.id != id);
        before != self.relations.len()
    }

    pub fn join(&mut self, id: u32, remote_app: &str) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.remote_app = Some(remote_app.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set(&mut self, id: u32, owner: &str, key: &str, value: &str) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record
                    .data
                    .entry(owner.to_string())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn app_data(&self, id: u32, owner: &str) -> Option<&RelationData> {
        self.relations
            .iter()
            .find(|record| record.id == id)
            .and_then(|record| record.data.get(owner))
    }

    fn record_mut(&mut self, id: u32) -> Option<&mut RelationRecord> {
        self.relations.iter_mut().find(|record| record.id == id)
    }
}

/// Relation substrate backed by a JSON file, or purely in memory.
pub struct JsonRelationStore {
    local_app: String,
    state: Mutex<RelationSnapshot>,
    path: Option<PathBuf>,
    writes: AtomicUsize,
}

impl JsonRelationStore {
    pub fn in_memory(snapshot: RelationSnapshot) -> Self {
        Self {
            local_app: snapshot.local_app.clone(),
            state: Mutex::new(snapshot),
            path: None,
            writes: AtomicUsize::new(0),
        }
    }

    /// Loads `path` if it exists, otherwise starts empty and creates it on first write.
    pub fn open<P: AsRef<Path>>(path: P, local_app: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let snapshot: RelationSnapshot = serde_json::from_slice(&fs::read(&path)?)?;
            if snapshot.local_app != local_app {
                return Err(OperatorError::RelationStoreError {
                    message: format!(
                        "{} belongs to application '{}', not '{}'",
                        path.display(),
                        snapshot.local_app,
                        local_app
                    ),
                });
            }
            snapshot
        } else {
            RelationSnapshot::new(local_app)
        };

        Ok(Self {
            local_app: local_app.to_string(),
            state: Mutex::new(snapshot),
            path: Some(path),
            writes: AtomicUsize::new(0),
        })
    }

    /// Number of writes accepted since the store was opened.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Result<RelationSnapshot> {
        Ok(self.lock()?.clone())
    }

    /// Applies a change made by the substrate itself (remote writes, joins, departures).
    pub fn modify<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut RelationSnapshot),
    {
        let mut state = self.lock()?;
        change(&mut state);
        self.persist(&state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, RelationSnapshot>> {
        self.state
            .lock()
            .map_err(|_| OperatorError::RelationStoreError {
                message: "relation state lock poisoned".to_string(),
            })
    }

    fn persist(&self, snapshot: &RelationSnapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(snapshot)?)?;
        Ok(())
    }
}

#[async_trait]
impl RelationSubstrate for JsonRelationStore {
    fn local_app(&self) -> &str {
        &self.local_app
    }

    async fn get_relation(&self, name: &str, id: Option<u32>) -> Result<Option<Relation>> {
        let state = self.lock()?;
        Ok(state
            .relations
            .iter()
            .filter(|record| record.name == name)
            .filter(|record| id.map_or(true, |id| record.id == id))
            .min_by_key(|record| record.id)
            .map(RelationRecord::handle))
    }

    async fn list_relations(&self, name: &str) -> Result<Vec<Relation>> {
        let state = self.lock()?;
        let mut relations: Vec<Relation> = state
            .relations
            .iter()
            .filter(|record| record.name == name)
            .map(RelationRecord::handle)
            .collect();
        relations.sort_by_key(|relation| relation.id);
        Ok(relations)
    }

    async fn read(&self, relation: &Relation, owner: &str) -> Result<RelationData> {
        let state = self.lock()?;
        Ok(state.app_data(relation.id, owner).cloned().unwrap_or_default())
    }

    async fn write(&self, relation: &Relation, data: RelationData) -> Result<()> {
        let mut state = self.lock()?;
        let local_app = self.local_app.clone();
        let record = state
            .record_mut(relation.id)
            .filter(|record| record.name == relation.name)
            .ok_or_else(|| OperatorError::NotYetEstablished {
                relation: relation.name.clone(),
                id: relation.id,
            })?;
        record.data.entry(local_app).or_default().extend(data);

        self.persist(&state)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Updated local data in relation {}:{}", relation.name, relation.id);
        Ok(())
    }
}
