use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Draft, Entity, Patchable, Program, Reference};
use crate::database::record::{non_blank, require_text, RecordError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    /// Free-form description of when the group meets.
    pub schedule: String,
    pub program_id: Uuid,
}

impl Entity for Group {
    const COLLECTION: &'static str = "groups";
    const LABEL: &'static str = "Group";

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Program>(self.program_id)]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: Option<String>,
    pub schedule: Option<String>,
    pub program_id: Option<Uuid>,
}

impl Draft for NewGroup {
    type Entity = Group;

    fn validate(self) -> Result<Group, RecordError> {
        let name = non_blank(self.name);
        let schedule = non_blank(self.schedule);
        let present = [
            ("name", name.is_some()),
            ("schedule", schedule.is_some()),
            ("programId", self.program_id.is_some()),
        ];
        let (Some(name), Some(schedule), Some(program_id)) = (name, schedule, self.program_id) else {
            return Err(RecordError::missing(&present));
        };
        Ok(Group {
            name,
            schedule,
            program_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    pub name: Option<String>,
    pub schedule: Option<String>,
    pub program_id: Option<Uuid>,
}

impl Patchable for Group {
    type Patch = GroupPatch;

    fn apply(&mut self, patch: GroupPatch) -> Result<(), RecordError> {
        if let Some(name) = patch.name {
            self.name = require_text("name", name)?;
        }
        if let Some(schedule) = patch.schedule {
            self.schedule = require_text("schedule", schedule)?;
        }
        if let Some(program_id) = patch.program_id {
            self.program_id = program_id;
        }
        Ok(())
    }
}
