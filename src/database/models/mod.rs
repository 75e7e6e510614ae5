use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::database::record::RecordError;
use crate::database::store::UniqueKey;
use crate::filter::Filter;

pub mod attendance;
pub mod child;
pub mod group;
pub mod payment;
pub mod program;
pub mod user;

pub use attendance::{Attendance, AttendancePatch, AttendanceStatus, NewAttendance};
pub use child::{Child, ChildPatch, NewChild, NewSticker, Sticker};
pub use group::{Group, GroupPatch, NewGroup};
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentPatch};
pub use program::{NewProgram, NewStage, Program, ProgramPatch, Stage};
pub use user::{normalize_email, NewUser, Role, User, ValidRegistration};

/// Every collection the service stores documents in.
pub const COLLECTIONS: &[&str] = &[
    User::COLLECTION,
    Child::COLLECTION,
    Group::COLLECTION,
    Program::COLLECTION,
    Attendance::COLLECTION,
    Payment::COLLECTION,
];

/// Store-level uniqueness, backing the entity rules below.
pub const UNIQUE_KEYS: &[UniqueKey] = &[
    UniqueKey {
        collection: User::COLLECTION,
        name: "users_email_key",
        fields: &["email"],
    },
    UniqueKey {
        collection: Attendance::COLLECTION,
        name: "attendance_session_key",
        fields: &["childId", "groupId", "date"],
    },
];

/// A record type persisted in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Singular name used in messages ("Child not found").
    const LABEL: &'static str;

    /// Records this one points at; each must exist when it is written.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// At most one stored record may match this rule's filter.
    fn unique_rule(&self) -> Option<UniqueRule> {
        None
    }
}

/// Create input for an entity: required fields are optional here so that
/// missing ones can be reported together.
pub trait Draft: DeserializeOwned + Send {
    type Entity: Entity;

    fn validate(self) -> Result<Self::Entity, RecordError>;
}

/// Partial update support: only supplied fields change.
pub trait Patchable: Entity {
    type Patch: DeserializeOwned + Send;

    fn apply(&mut self, patch: Self::Patch) -> Result<(), RecordError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub collection: &'static str,
    pub label: &'static str,
    pub id: Uuid,
}

impl Reference {
    pub fn to<T: Entity>(id: Uuid) -> Self {
        Reference {
            collection: T::COLLECTION,
            label: T::LABEL,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueRule {
    pub filter: Filter,
    pub message: &'static str,
}
