use serde::Serialize;

use crate::database::models::{Child, Entity, Group, Program, User};
use crate::database::{DatabaseError, DocumentStore};
use crate::filter::Filter;

/// Collection sizes shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub program_count: i64,
    pub group_count: i64,
    pub child_count: i64,
    pub user_count: i64,
}

pub async fn collect(store: &dyn DocumentStore) -> Result<Statistics, DatabaseError> {
    let all = Filter::new();
    let (program_count, group_count, child_count, user_count) = futures::try_join!(
        store.count(Program::COLLECTION, &all),
        store.count(Group::COLLECTION, &all),
        store.count(Child::COLLECTION, &all),
        store.count(User::COLLECTION, &all),
    )?;

    Ok(Statistics {
        program_count,
        group_count,
        child_count,
        user_count,
    })
}
