use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Entity, Reference};
use crate::database::record::{to_document_data, Record};
use crate::database::relationships::{delete_with_policies, ReferencePolicies};
use crate::database::store::{Document, DocumentStore};
use crate::filter::Filter;

/// Typed access to one entity's collection.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    fn not_found() -> DatabaseError {
        DatabaseError::NotFound(format!("{} not found", T::LABEL))
    }

    fn decode_all(documents: Vec<Document>) -> Result<Vec<Record<T>>, DatabaseError> {
        documents.into_iter().map(Record::from_document).collect()
    }

    /// Validates references and uniqueness, then stores the entity.
    pub async fn create(&self, entity: T) -> Result<Record<T>, DatabaseError> {
        self.check_references(&entity, &[]).await?;
        self.check_unique(&entity, None).await?;

        let data = to_document_data(&entity)?;
        let document = self
            .store
            .insert(T::COLLECTION, data)
            .await
            .map_err(|e| Self::conflict_from(e, &entity))?;
        Record::from_document(document)
    }

    pub async fn select_all(&self) -> Result<Vec<Record<T>>, DatabaseError> {
        self.select_any(&Filter::new()).await
    }

    pub async fn select_any(&self, filter: &Filter) -> Result<Vec<Record<T>>, DatabaseError> {
        Self::decode_all(self.store.find(T::COLLECTION, filter).await?)
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<Record<T>>, DatabaseError> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(Record::from_document)
            .transpose()
    }

    pub async fn select_404(&self, id: Uuid) -> Result<Record<T>, DatabaseError> {
        self.select_one(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn select_ids(&self, ids: &[Uuid]) -> Result<Vec<Record<T>>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Self::decode_all(self.store.find_by_ids(T::COLLECTION, ids).await?)
    }

    pub async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.store.count(T::COLLECTION, filter).await
    }

    /// Replaces the stored entity, re-validating uniqueness against every
    /// other record. Only references that differ from `previous` must
    /// exist; ones left dangling by a delete are kept as they are.
    pub async fn replace_404(&self, id: Uuid, previous: &T, entity: T) -> Result<Record<T>, DatabaseError> {
        let unchanged = previous.references();
        self.check_references(&entity, &unchanged).await?;
        self.check_unique(&entity, Some(id)).await?;

        let data = to_document_data(&entity)?;
        let document = self
            .store
            .replace(T::COLLECTION, id, data)
            .await
            .map_err(|e| Self::conflict_from(e, &entity))?
            .ok_or_else(Self::not_found)?;
        Record::from_document(document)
    }

    pub async fn delete_404(&self, id: Uuid, policies: &ReferencePolicies) -> Result<Record<T>, DatabaseError> {
        let document = delete_with_policies(self.store.as_ref(), policies, T::COLLECTION, id)
            .await?
            .ok_or_else(Self::not_found)?;
        Record::from_document(document)
    }

    /// Every referenced record outside `unchanged` must exist. Ids are
    /// looked up once per target collection.
    async fn check_references(&self, entity: &T, unchanged: &[Reference]) -> Result<(), DatabaseError> {
        let mut by_collection: BTreeMap<&'static str, (&'static str, Vec<Uuid>)> = BTreeMap::new();
        for reference in entity.references().into_iter().filter(|r| !unchanged.contains(r)) {
            let (_, ids) = by_collection
                .entry(reference.collection)
                .or_insert_with(|| (reference.label, Vec::new()));
            if !ids.contains(&reference.id) {
                ids.push(reference.id);
            }
        }

        for (collection, (label, ids)) in by_collection {
            let found = self.store.find_by_ids(collection, &ids).await?;
            if found.len() < ids.len() {
                return Err(DatabaseError::NotFound(format!("{} not found", label)));
            }
        }
        Ok(())
    }

    async fn check_unique(&self, entity: &T, except: Option<Uuid>) -> Result<(), DatabaseError> {
        let Some(rule) = entity.unique_rule() else {
            return Ok(());
        };
        let taken = self
            .store
            .find(T::COLLECTION, &rule.filter)
            .await?
            .iter()
            .any(|doc| Some(doc.id) != except);
        if taken {
            return Err(DatabaseError::Conflict(rule.message.to_string()));
        }
        Ok(())
    }

    /// A unique index can still fire when two writers pass `check_unique`
    /// together; report it with the entity's own message.
    fn conflict_from(err: DatabaseError, entity: &T) -> DatabaseError {
        match err {
            DatabaseError::UniqueViolation(_) => match entity.unique_rule() {
                Some(rule) => DatabaseError::Conflict(rule.message.to_string()),
                None => err,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use crate::database::models::{Group, Program, Role, User, UNIQUE_KEYS};

    fn store() -> Arc<dyn DocumentStore> {
        Arc::new(MemoryDocumentStore::with_unique_keys(UNIQUE_KEYS))
    }

    fn program() -> Program {
        Program {
            name: "Robotics".into(),
            duration: "12 weeks".into(),
            stages: vec![],
        }
    }

    fn user(email: &str) -> User {
        User {
            role: Role::Parent,
            name: "Sam".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_references() {
        let store = store();
        let groups = Repository::<Group>::new(store.clone());
        let err = groups
            .create(Group {
                name: "Tigers".into(),
                schedule: "Mon".into(),
                program_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(msg) if msg == "Program not found"));
        assert_eq!(groups.count(&Filter::new()).await.unwrap(), 0);

        let program = Repository::<Program>::new(store).create(program()).await.unwrap();
        let group = groups
            .create(Group {
                name: "Tigers".into(),
                schedule: "Mon".into(),
                program_id: program.id,
            })
            .await
            .unwrap();
        assert_eq!(group.data.program_id, program.id);
    }

    #[tokio::test]
    async fn unique_rule_is_enforced_except_against_self() {
        let users = Repository::<User>::new(store());
        let first = users.create(user("a@example.com")).await.unwrap();

        let err = users.create(user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(msg) if msg == "User already exists."));

        let mut renamed = first.data.clone();
        renamed.name = "Samantha".into();
        let updated = users.replace_404(first.id, &first.data, renamed).await.unwrap();
        assert_eq!(updated.data.name, "Samantha");
        assert!(updated.updated_at >= first.updated_at);
        assert_eq!(users.count(&Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let programs = Repository::<Program>::new(store());
        let id = Uuid::new_v4();
        assert!(matches!(programs.select_404(id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(programs.replace_404(id, &program(), program()).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(
            programs.delete_404(id, &ReferencePolicies::new()).await,
            Err(DatabaseError::NotFound(msg)) if msg == "Program not found"
        ));
    }

    #[tokio::test]
    async fn select_ids_skips_unknown_ids() {
        let programs = Repository::<Program>::new(store());
        let stored = programs.create(program()).await.unwrap();
        let found = programs.select_ids(&[stored.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found, vec![stored]);
    }
}
