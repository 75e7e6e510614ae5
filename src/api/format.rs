//! Wire shapes for records. Every response body is built here, so stored
//! fields that must not leave the service (the password hash) never reach
//! a serializer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{
    Attendance, AttendanceStatus, Child, Group, Payment, PaymentMethod, Program, Role, Sticker, User,
};
use crate::database::record::dates;
use crate::database::Record;

/// Records of one collection keyed by id, for expanding references.
pub type Lookup<T> = HashMap<Uuid, Record<T>>;

pub fn index<T>(records: Vec<Record<T>>) -> Lookup<T> {
    records.into_iter().map(|r| (r.id, r)).collect()
}

/// A reference rendered with display fields of its target, or the bare id
/// when the target no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Expanded(T),
    Dangling(Uuid),
}

impl<T> Ref<T> {
    fn resolve<E>(id: Uuid, lookup: &Lookup<E>, summarize: impl FnOnce(&Record<E>) -> T) -> Self {
        lookup.get(&id).map(summarize).map_or(Ref::Dangling(id), Ref::Expanded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSessionSummary {
    pub id: Uuid,
    pub name: String,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
    pub id: Uuid,
    pub name: String,
}

fn group_summary(r: &Record<Group>) -> GroupSummary {
    GroupSummary {
        id: r.id,
        name: r.data.name.clone(),
    }
}

fn group_session_summary(r: &Record<Group>) -> GroupSessionSummary {
    GroupSessionSummary {
        id: r.id,
        name: r.data.name.clone(),
        schedule: r.data.schedule.clone(),
    }
}

fn parent_summary(r: &Record<User>) -> ParentSummary {
    ParentSummary {
        id: r.id,
        name: r.data.name.clone(),
        email: r.data.email.clone(),
    }
}

fn child_summary(r: &Record<Child>) -> ChildSummary {
    ChildSummary {
        id: r.id,
        name: r.data.name.clone(),
    }
}

fn program_summary(r: &Record<Program>) -> ProgramSummary {
    ProgramSummary {
        id: r.id,
        name: r.data.name.clone(),
    }
}

/// Allow-list of user fields safe to return.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl From<Record<User>> for UserView {
    fn from(r: Record<User>) -> Self {
        UserView {
            id: r.id,
            role: r.data.role,
            name: r.data.name,
            email: r.data.email,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildView {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "dates")]
    pub date_of_birth: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_level: Option<String>,
    pub group_id: Ref<GroupSummary>,
    pub parent_id: Ref<ParentSummary>,
    pub stickers: Vec<Sticker>,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl ChildView {
    pub fn build(r: Record<Child>, groups: &Lookup<Group>, parents: &Lookup<User>) -> Self {
        ChildView {
            id: r.id,
            group_id: Ref::resolve(r.data.group_id, groups, group_summary),
            parent_id: Ref::resolve(r.data.parent_id, parents, parent_summary),
            name: r.data.name,
            date_of_birth: r.data.date_of_birth,
            school_level: r.data.school_level,
            stickers: r.data.stickers,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: Uuid,
    pub name: String,
    pub schedule: String,
    pub program_id: Ref<ProgramSummary>,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl GroupView {
    pub fn build(r: Record<Group>, programs: &Lookup<Program>) -> Self {
        GroupView {
            id: r.id,
            program_id: Ref::resolve(r.data.program_id, programs, program_summary),
            name: r.data.name,
            schedule: r.data.schedule,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub name: String,
    pub description: String,
    pub completed_by: Vec<Ref<ChildSummary>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramView {
    pub id: Uuid,
    pub name: String,
    pub duration: String,
    pub stages: Vec<StageView>,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl ProgramView {
    pub fn build(r: Record<Program>, children: &Lookup<Child>) -> Self {
        let stages = r
            .data
            .stages
            .into_iter()
            .map(|stage| StageView {
                name: stage.name,
                description: stage.description,
                completed_by: stage
                    .completed_by
                    .into_iter()
                    .map(|id| Ref::resolve(id, children, child_summary))
                    .collect(),
            })
            .collect();
        ProgramView {
            id: r.id,
            name: r.data.name,
            duration: r.data.duration,
            stages,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: Uuid,
    pub child_id: Ref<ChildSummary>,
    pub group_id: Ref<GroupSessionSummary>,
    #[serde(with = "dates")]
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceView {
    pub fn build(r: Record<Attendance>, children: &Lookup<Child>, groups: &Lookup<Group>) -> Self {
        AttendanceView {
            id: r.id,
            child_id: Ref::resolve(r.data.child_id, children, child_summary),
            group_id: Ref::resolve(r.data.group_id, groups, group_session_summary),
            date: r.data.date,
            status: r.data.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub id: Uuid,
    pub child_id: Ref<ChildSummary>,
    pub amount: f64,
    #[serde(with = "dates")]
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl PaymentView {
    pub fn build(r: Record<Payment>, children: &Lookup<Child>) -> Self {
        PaymentView {
            id: r.id,
            child_id: Ref::resolve(r.data.child_id, children, child_summary),
            amount: r.data.amount,
            date: r.data.date,
            payment_method: r.data.payment_method,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
