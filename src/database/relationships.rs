use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Document, DocumentStore};
use crate::filter::Filter;

/// A reference field in `from` documents holding the id of a `to` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub name: &'static str,
    pub from: &'static str,
    pub field: &'static str,
    pub to: &'static str,
}

/// Scalar references between collections. `programs.stages[].completedBy`
/// is a list inside nested objects and is always left dangling.
pub const RELATIONSHIPS: &[Relationship] = &[
    Relationship { name: "child.group", from: "children", field: "groupId", to: "groups" },
    Relationship { name: "child.parent", from: "children", field: "parentId", to: "users" },
    Relationship { name: "group.program", from: "groups", field: "programId", to: "programs" },
    Relationship { name: "attendance.child", from: "attendance", field: "childId", to: "children" },
    Relationship { name: "attendance.group", from: "attendance", field: "groupId", to: "groups" },
    Relationship { name: "payment.child", from: "payments", field: "childId", to: "children" },
];

/// What happens to dependents when the record they point at is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Dependents keep the now dangling id.
    #[default]
    Leave,
    /// The delete is refused while dependents exist.
    Restrict,
    /// Dependents are deleted too, applying their own policies.
    Cascade,
}

impl std::str::FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "leave" => Ok(DeletePolicy::Leave),
            "restrict" => Ok(DeletePolicy::Restrict),
            "cascade" => Ok(DeletePolicy::Cascade),
            other => Err(format!("unknown delete policy '{}'", other)),
        }
    }
}

/// Per-relationship delete policies; unnamed relationships use `Leave`.
#[derive(Debug, Clone, Default)]
pub struct ReferencePolicies {
    overrides: HashMap<&'static str, DeletePolicy>,
}

impl ReferencePolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy of a relationship from [`RELATIONSHIPS`] by name.
    pub fn with(mut self, relationship: &str, policy: DeletePolicy) -> Result<Self, String> {
        let rel = RELATIONSHIPS
            .iter()
            .find(|r| r.name == relationship)
            .ok_or_else(|| format!("unknown relationship '{}'", relationship))?;
        self.overrides.insert(rel.name, policy);
        Ok(self)
    }

    /// Parses `name=policy` pairs separated by commas, e.g.
    /// `child.group=restrict,attendance.child=cascade`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .try_fold(Self::new(), |policies, pair| {
                let (name, policy) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("expected name=policy, got '{}'", pair))?;
                policies.with(name.trim(), policy.trim().parse()?)
            })
    }

    pub fn policy(&self, relationship: &Relationship) -> DeletePolicy {
        self.overrides
            .get(relationship.name)
            .copied()
            .unwrap_or_default()
    }

    /// Relationships pointing at `collection`, with their policy.
    pub fn inbound(&self, collection: &str) -> Vec<(Relationship, DeletePolicy)> {
        RELATIONSHIPS
            .iter()
            .filter(|r| r.to == collection)
            .map(|r| (*r, self.policy(r)))
            .collect()
    }
}

/// Deletes a document after enforcing the policies of every relationship
/// that points at its collection. Returns `None` if it did not exist.
///
/// Restrict checks happen level by level; a cascade that meets a restricted
/// dependent further down stops there without undoing earlier deletes.
pub fn delete_with_policies<'a>(
    store: &'a dyn DocumentStore,
    policies: &'a ReferencePolicies,
    collection: &'a str,
    id: Uuid,
) -> BoxFuture<'a, Result<Option<Document>, DatabaseError>> {
    async move {
        if store.find_by_id(collection, id).await?.is_none() {
            return Ok(None);
        }

        let inbound = policies.inbound(collection);
        for (rel, policy) in &inbound {
            if *policy != DeletePolicy::Restrict {
                continue;
            }
            let dependents = store.count(rel.from, &Filter::by(rel.field, id.to_string())).await?;
            if dependents > 0 {
                return Err(DatabaseError::Conflict(format!(
                    "Cannot delete: {} record(s) in {} still reference it",
                    dependents, rel.from
                )));
            }
        }

        let deleted = store.delete(collection, id).await?;

        for (rel, policy) in &inbound {
            if *policy != DeletePolicy::Cascade {
                continue;
            }
            let dependents = store.find(rel.from, &Filter::by(rel.field, id.to_string())).await?;
            if !dependents.is_empty() {
                info!(relationship = rel.name, count = dependents.len(), "cascading delete");
            }
            for dependent in dependents {
                delete_with_policies(store, policies, rel.from, dependent.id).await?;
            }
        }

        debug!(collection, %id, "deleted document");
        Ok(deleted)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use serde_json::{json, Map, Value};

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    async fn group_with_child(store: &MemoryDocumentStore) -> (Uuid, Uuid) {
        let group = store.insert("groups", data(json!({"name": "Tigers"}))).await.unwrap();
        let child = store
            .insert("children", data(json!({"name": "Ana", "groupId": group.id.to_string()})))
            .await
            .unwrap();
        (group.id, child.id)
    }

    #[test]
    fn parses_policy_lists() {
        let policies = ReferencePolicies::parse("child.group=restrict, payment.child=cascade").unwrap();
        let child_group = RELATIONSHIPS.iter().find(|r| r.name == "child.group").unwrap();
        let child_parent = RELATIONSHIPS.iter().find(|r| r.name == "child.parent").unwrap();
        assert_eq!(policies.policy(child_group), DeletePolicy::Restrict);
        assert_eq!(policies.policy(child_parent), DeletePolicy::Leave);

        assert!(ReferencePolicies::parse("child.sibling=cascade").is_err());
        assert!(ReferencePolicies::parse("child.group=explode").is_err());
        assert!(ReferencePolicies::parse("child.group").is_err());
    }

    #[tokio::test]
    async fn leave_keeps_dependents() {
        let store = MemoryDocumentStore::new();
        let (group, child) = group_with_child(&store).await;

        let deleted = delete_with_policies(&store, &ReferencePolicies::new(), "groups", group)
            .await
            .unwrap();
        assert_eq!(deleted.map(|d| d.id), Some(group));
        assert!(store.find_by_id("children", child).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn restrict_refuses_while_referenced() {
        let store = MemoryDocumentStore::new();
        let (group, _) = group_with_child(&store).await;
        let policies = ReferencePolicies::new()
            .with("child.group", DeletePolicy::Restrict)
            .unwrap();

        let err = delete_with_policies(&store, &policies, "groups", group).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert!(store.find_by_id("groups", group).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cascade_follows_relationships_transitively() {
        let store = MemoryDocumentStore::new();
        let (group, child) = group_with_child(&store).await;
        store
            .insert("payments", data(json!({"childId": child.to_string(), "amount": 10})))
            .await
            .unwrap();
        let policies = ReferencePolicies::new()
            .with("child.group", DeletePolicy::Cascade)
            .unwrap()
            .with("payment.child", DeletePolicy::Cascade)
            .unwrap();

        delete_with_policies(&store, &policies, "groups", group).await.unwrap();
        assert_eq!(store.count("children", &Filter::new()).await.unwrap(), 0);
        assert_eq!(store.count("payments", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let store = MemoryDocumentStore::new();
        let deleted = delete_with_policies(&store, &ReferencePolicies::new(), "groups", Uuid::new_v4())
            .await
            .unwrap();
        assert!(deleted.is_none());
    }
}
