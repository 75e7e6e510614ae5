use std::sync::Arc;
use uuid::Uuid;

use crate::api::format::{index, AttendanceView, ChildView, GroupView, Lookup, PaymentView, ProgramView};
use crate::database::models::{Attendance, Child, Entity, Group, Payment, Program, User};
use crate::database::{DatabaseError, DocumentStore, Record, Repository};

/// Expands references for read responses, loading each referenced
/// collection once per call.
pub struct Populator {
    store: Arc<dyn DocumentStore>,
}

fn distinct(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

impl Populator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn lookup<T: Entity>(&self, ids: impl IntoIterator<Item = Uuid>) -> Result<Lookup<T>, DatabaseError> {
        let ids = distinct(ids);
        let records = Repository::<T>::new(self.store.clone()).select_ids(&ids).await?;
        Ok(index(records))
    }

    pub async fn children(&self, records: Vec<Record<Child>>) -> Result<Vec<ChildView>, DatabaseError> {
        let groups = self.lookup::<Group>(records.iter().map(|r| r.data.group_id)).await?;
        let parents = self.lookup::<User>(records.iter().map(|r| r.data.parent_id)).await?;
        Ok(records
            .into_iter()
            .map(|r| ChildView::build(r, &groups, &parents))
            .collect())
    }

    pub async fn groups(&self, records: Vec<Record<Group>>) -> Result<Vec<GroupView>, DatabaseError> {
        let programs = self.lookup::<Program>(records.iter().map(|r| r.data.program_id)).await?;
        Ok(records.into_iter().map(|r| GroupView::build(r, &programs)).collect())
    }

    pub async fn programs(&self, records: Vec<Record<Program>>) -> Result<Vec<ProgramView>, DatabaseError> {
        let children = self
            .lookup::<Child>(records.iter().flat_map(|r| r.data.completed_by_ids()))
            .await?;
        Ok(records.into_iter().map(|r| ProgramView::build(r, &children)).collect())
    }

    pub async fn attendance(&self, records: Vec<Record<Attendance>>) -> Result<Vec<AttendanceView>, DatabaseError> {
        let children = self.lookup::<Child>(records.iter().map(|r| r.data.child_id)).await?;
        let groups = self.lookup::<Group>(records.iter().map(|r| r.data.group_id)).await?;
        Ok(records
            .into_iter()
            .map(|r| AttendanceView::build(r, &children, &groups))
            .collect())
    }

    pub async fn payments(&self, records: Vec<Record<Payment>>) -> Result<Vec<PaymentView>, DatabaseError> {
        let children = self.lookup::<Child>(records.iter().map(|r| r.data.child_id)).await?;
        Ok(records.into_iter().map(|r| PaymentView::build(r, &children)).collect())
    }
}
