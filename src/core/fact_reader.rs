use crate::core::{Capability, PeerFact, RelationSubstrate, Result};
use crate::domain::model::{RelationData, FACT_FIELDS};
use std::fmt;

/// Outcome of parsing a remote application's relation data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactRead {
    Complete(PeerFact),
    Incomplete(MissingFact),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingFact {
    NoRelation,
    NoRemoteApp,
    /// Wire keys not written yet, e.g. `nrf_port`.
    Fields(Vec<String>),
}

impl fmt::Display for MissingFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingFact::NoRelation => write!(f, "relation not created"),
            MissingFact::NoRemoteApp => write!(f, "no remote application"),
            MissingFact::Fields(keys) => write!(f, "missing {}", keys.join(", ")),
        }
    }
}

impl FactRead {
    pub fn is_complete(&self) -> bool {
        matches!(self, FactRead::Complete(_))
    }

    pub fn into_fact(self) -> Option<PeerFact> {
        match self {
            FactRead::Complete(fact) => Some(fact),
            FactRead::Incomplete(_) => None,
        }
    }
}

/// Reads the PeerFact a required upstream advertises.
pub struct FactReader<'a, R: RelationSubstrate + ?Sized> {
    substrate: &'a R,
    capability: &'a Capability,
}

impl<'a, R: RelationSubstrate + ?Sized> FactReader<'a, R> {
    pub fn new(substrate: &'a R, capability: &'a Capability) -> Self {
        Self {
            substrate,
            capability,
        }
    }

    async fn remote_data(&self) -> Result<std::result::Result<RelationData, MissingFact>> {
        let Some(relation) = self
            .substrate
            .get_relation(&self.capability.relation, None)
            .await?
        else {
            return Ok(Err(MissingFact::NoRelation));
        };
        let Some(remote_app) = relation.remote_app.as_deref() else {
            return Ok(Err(MissingFact::NoRemoteApp));
        };
        Ok(Ok(self.substrate.read(&relation, remote_app).await?))
    }

    pub async fn read(&self) -> Result<FactRead> {
        let data = match self.remote_data().await? {
            Ok(data) => data,
            Err(missing) => {
                match &missing {
                    MissingFact::NoRelation => tracing::info!(
                        "No {} relation yet - {} data incomplete",
                        self.capability.relation,
                        self.capability.label
                    ),
                    _ => tracing::info!(
                        "No remote application in relation: {}",
                        self.capability.relation
                    ),
                }
                return Ok(FactRead::Incomplete(missing));
            }
        };

        if let Some(fact) = PeerFact::from_relation_data(&self.capability.prefix, &data) {
            return Ok(FactRead::Complete(fact));
        }

        let missing: Vec<String> = FACT_FIELDS
            .iter()
            .map(|field| PeerFact::key(&self.capability.prefix, field))
            .filter(|key| !data.contains_key(key))
            .collect();
        for key in &missing {
            tracing::info!("No {} in {} relation data", key, self.capability.label);
        }
        Ok(FactRead::Incomplete(MissingFact::Fields(missing)))
    }

    pub async fn value(&self, field: &str) -> Result<Option<String>> {
        let key = PeerFact::key(&self.capability.prefix, field);
        Ok(self
            .remote_data()
            .await?
            .ok()
            .and_then(|mut data| data.remove(&key)))
    }

    pub async fn ipv4_address_available(&self) -> Result<bool> {
        Ok(self.value("ipv4_address").await?.is_some())
    }

    pub async fn fqdn_available(&self) -> Result<bool> {
        Ok(self.value("fqdn").await?.is_some())
    }

    pub async fn port_available(&self) -> Result<bool> {
        Ok(self.value("port").await?.is_some())
    }

    pub async fn api_version_available(&self) -> Result<bool> {
        Ok(self.value("api_version").await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::relations::{JsonRelationStore, RelationSnapshot};

    fn nrf() -> Capability {
        Capability::new("NRF", "fiveg-nrf", "nrf")
    }

    fn store_with(data: &[(&str, &str)], remote: Option<&str>) -> JsonRelationStore {
        let mut snapshot = RelationSnapshot::new("oai-5g-ausf");
        let id = snapshot.add_relation("fiveg-nrf", remote);
        if let Some(remote) = remote {
            for (key, value) in data {
                snapshot.set(id, remote, key, value);
            }
        }
        JsonRelationStore::in_memory(snapshot)
    }

    #[tokio::test]
    async fn test_read_complete_fact() {
        let store = store_with(
            &[
                ("nrf_ipv4_address", "1.2.3.4"),
                ("nrf_fqdn", "nrf.example.com"),
                ("nrf_port", "81"),
                ("nrf_api_version", "v1"),
            ],
            Some("nrf"),
        );
        let capability = nrf();
        let reader = FactReader::new(&store, &capability);

        let fact = reader.read().await.unwrap().into_fact().unwrap();
        assert_eq!(fact.ipv4_address, "1.2.3.4");
        assert_eq!(fact.fqdn, "nrf.example.com");
        assert_eq!(fact.port, "81");
        assert_eq!(fact.api_version, "v1");
    }

    #[tokio::test]
    async fn test_three_of_four_fields_is_incomplete() {
        let store = store_with(
            &[
                ("nrf_ipv4_address", "1.2.3.4"),
                ("nrf_fqdn", "nrf.example.com"),
                ("nrf_api_version", "v1"),
            ],
            Some("nrf"),
        );
        let capability = nrf();
        let reader = FactReader::new(&store, &capability);

        assert_eq!(
            reader.read().await.unwrap(),
            FactRead::Incomplete(MissingFact::Fields(vec!["nrf_port".to_string()]))
        );
        assert!(reader.ipv4_address_available().await.unwrap());
        assert!(reader.fqdn_available().await.unwrap());
        assert!(!reader.port_available().await.unwrap());
        assert!(reader.api_version_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_remote_app_is_incomplete() {
        let store = store_with(&[], None);
        let capability = nrf();
        let reader = FactReader::new(&store, &capability);

        assert_eq!(
            reader.read().await.unwrap(),
            FactRead::Incomplete(MissingFact::NoRemoteApp)
        );
        assert!(!reader.ipv4_address_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_relation_is_incomplete() {
        let store = JsonRelationStore::in_memory(RelationSnapshot::new("oai-5g-ausf"));
        let capability = nrf();
        let reader = FactReader::new(&store, &capability);

        assert_eq!(
            reader.read().await.unwrap(),
            FactRead::Incomplete(MissingFact::NoRelation)
        );
    }
}
