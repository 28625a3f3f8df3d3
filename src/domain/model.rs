use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque key/value bag one application owns inside a relation.
pub type RelationData = BTreeMap<String, String>;

/// The four fields every 5G network function advertises over its relation.
pub const FACT_FIELDS: [&str; 4] = ["ipv4_address", "fqdn", "port", "api_version"];

/// Connection endpoint advertised by a network function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerFact {
    pub ipv4_address: String,
    pub fqdn: String,
    pub port: String,
    pub api_version: String,
}

impl PeerFact {
    /// Wire keys are `<prefix>_<field>`, e.g. `nrf_ipv4_address`.
    pub fn key(prefix: &str, field: &str) -> String {
        format!("{}_{}", prefix, field)
    }

    pub fn field(&self, field: &str) -> Option<&str> {
        match field {
            "ipv4_address" => Some(&self.ipv4_address),
            "fqdn" => Some(&self.fqdn),
            "port" => Some(&self.port),
            "api_version" => Some(&self.api_version),
            _ => None,
        }
    }

    pub fn to_relation_data(&self, prefix: &str) -> RelationData {
        FACT_FIELDS
            .iter()
            .filter_map(|field| {
                self.field(field)
                    .map(|value| (Self::key(prefix, field), value.to_string()))
            })
            .collect()
    }

    /// All-or-nothing: `None` unless every field is present.
    pub fn from_relation_data(prefix: &str, data: &RelationData) -> Option<Self> {
        let get = |field: &str| data.get(&Self::key(prefix, field)).cloned();
        Some(Self {
            ipv4_address: get("ipv4_address")?,
            fqdn: get("fqdn")?,
            port: get("port")?,
            api_version: get("api_version")?,
        })
    }
}

/// A capability exchanged over a relation kind, e.g. NRF over `fiveg-nrf` with `nrf_*` keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub label: String,
    pub relation: String,
    pub prefix: String,
}

impl Capability {
    pub fn new(label: &str, relation: &str, prefix: &str) -> Self {
        Self {
            label: label.to_string(),
            relation: relation.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

/// One concrete relation instance as seen from the local application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub id: u32,
    /// `None` until the remote application has joined.
    pub remote_app: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    Running,
    NotRunning,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(rename = "override")]
    pub override_mode: String,
    pub summary: String,
    pub command: String,
    pub startup: String,
}

/// Process-manager descriptor pushed to the workload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceLayer {
    pub summary: String,
    pub description: String,
    pub services: BTreeMap<String, ServiceSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    #[default]
    Unknown,
    Active,
    Blocked(String),
    Waiting(String),
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Unknown => write!(f, "unknown"),
            UnitStatus::Active => write!(f, "active"),
            UnitStatus::Blocked(reason) => write!(f, "blocked: {}", reason),
            UnitStatus::Waiting(reason) => write!(f, "waiting: {}", reason),
        }
    }
}

/// Readiness facts gathered fresh for every reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessSignal {
    pub workload_reachable: bool,
    pub nrf_relation_exists: bool,
    pub udm_relation_exists: bool,
    pub nrf_fact_complete: bool,
    pub udm_fact_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Trigger {
    ConfigChanged,
    RelationChanged { relation: String, id: u32 },
    RelationJoined { relation: String, id: u32 },
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::ConfigChanged => write!(f, "config-changed"),
            Trigger::RelationChanged { relation, id } => {
                write!(f, "{}-relation-changed:{}", relation, id)
            }
            Trigger::RelationJoined { relation, id } => {
                write!(f, "{}-relation-joined:{}", relation, id)
            }
        }
    }
}

/// A trigger waiting in the engine queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTrigger {
    pub trigger: Trigger,
    pub deferred: bool,
    pub attempts: u32,
    pub first_deferred_at: Option<DateTime<Utc>>,
}

impl QueuedTrigger {
    pub fn fresh(trigger: Trigger) -> Self {
        Self {
            trigger,
            deferred: false,
            attempts: 0,
            first_deferred_at: None,
        }
    }

    pub fn defer(self) -> Self {
        Self {
            deferred: true,
            attempts: self.attempts + 1,
            first_deferred_at: self.first_deferred_at.or_else(|| Some(Utc::now())),
            trigger: self.trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_fact_wire_keys() {
        let fact = PeerFact {
            ipv4_address: "1.2.3.4".to_string(),
            fqdn: "nrf.example.com".to_string(),
            port: "81".to_string(),
            api_version: "v1".to_string(),
        };

        let data = fact.to_relation_data("nrf");
        assert_eq!(data.len(), 4);
        assert_eq!(data["nrf_ipv4_address"], "1.2.3.4");
        assert_eq!(data["nrf_fqdn"], "nrf.example.com");
        assert_eq!(data["nrf_port"], "81");
        assert_eq!(data["nrf_api_version"], "v1");
    }

    #[test]
    fn test_peer_fact_requires_every_field() {
        let mut data = RelationData::new();
        data.insert("udm_ipv4_address".to_string(), "5.6.7.8".to_string());
        data.insert("udm_fqdn".to_string(), "udm.example.com".to_string());
        data.insert("udm_port".to_string(), "82".to_string());
        assert!(PeerFact::from_relation_data("udm", &data).is_none());

        data.insert("udm_api_version".to_string(), "v1".to_string());
        let fact = PeerFact::from_relation_data("udm", &data).unwrap();
        assert_eq!(fact.port, "82");
    }

    #[test]
    fn test_deferring_keeps_first_timestamp() {
        let queued = QueuedTrigger::fresh(Trigger::ConfigChanged).defer();
        let first = queued.first_deferred_at;
        let again = queued.defer();

        assert!(again.deferred);
        assert_eq!(again.attempts, 2);
        assert_eq!(again.first_deferred_at, first);
    }

    #[test]
    fn test_unit_status_serializes_with_message() {
        let status = UnitStatus::Blocked("Waiting for relation to NRF to be created".to_string());
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "blocked");
        assert_eq!(json["message"], "Waiting for relation to NRF to be created");
    }
}
