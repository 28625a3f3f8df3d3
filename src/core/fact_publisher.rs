use crate::core::{Capability, OperatorError, PeerFact, Relation, RelationSubstrate, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Written,
    Unchanged,
}

/// Writes this application's own PeerFact into relations of the capability it provides.
pub struct FactPublisher<'a, R: RelationSubstrate + ?Sized> {
    substrate: &'a R,
    capability: &'a Capability,
}

impl<'a, R: RelationSubstrate + ?Sized> FactPublisher<'a, R> {
    pub fn new(substrate: &'a R, capability: &'a Capability) -> Self {
        Self {
            substrate,
            capability,
        }
    }

    /// True when every field already holds the value in `fact`.
    pub async fn is_set(&self, relation: &Relation, fact: &PeerFact) -> Result<bool> {
        let current = self
            .substrate
            .read(relation, self.substrate.local_app())
            .await?;
        Ok(fact
            .to_relation_data(&self.capability.prefix)
            .iter()
            .all(|(key, value)| current.get(key) == Some(value)))
    }

    pub async fn publish(&self, relation_id: u32, fact: &PeerFact) -> Result<PublishOutcome> {
        let relation = self
            .substrate
            .get_relation(&self.capability.relation, Some(relation_id))
            .await?
            .ok_or_else(|| OperatorError::NotYetEstablished {
                relation: self.capability.relation.clone(),
                id: relation_id,
            })?;

        if self.is_set(&relation, fact).await? {
            tracing::debug!(
                "{} data already set in relation {}:{}",
                self.capability.label,
                relation.name,
                relation.id
            );
            return Ok(PublishOutcome::Unchanged);
        }

        self.substrate
            .write(&relation, fact.to_relation_data(&self.capability.prefix))
            .await?;
        tracing::info!(
            "Published {} data to relation {}:{}",
            self.capability.label,
            relation.name,
            relation.id
        );
        Ok(PublishOutcome::Written)
    }

    /// Publishes to every live instance; returns how many were actually written.
    pub async fn publish_to_all(&self, fact: &PeerFact) -> Result<usize> {
        let mut written = 0;
        for relation in self
            .substrate
            .list_relations(&self.capability.relation)
            .await?
        {
            if self.publish(relation.id, fact).await? == PublishOutcome::Written {
                written += 1;
            }
        }
        Ok(written)
    }
}
