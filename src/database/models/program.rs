use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Child, Draft, Entity, Patchable, Reference};
use crate::database::record::{non_blank, require_text, RecordError};

/// One step of a program, with the children who have finished it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub completed_by: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub name: String,
    pub duration: String,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Program {
    /// Distinct child ids across all stages, in first-seen order.
    pub fn completed_by_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for id in self.stages.iter().flat_map(|s| s.completed_by.iter()) {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

impl Entity for Program {
    const COLLECTION: &'static str = "programs";
    const LABEL: &'static str = "Program";

    fn references(&self) -> Vec<Reference> {
        self.completed_by_ids()
            .into_iter()
            .map(Reference::to::<Child>)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStage {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub completed_by: Vec<Uuid>,
}

fn validate_stages(stages: Vec<NewStage>) -> Result<Vec<Stage>, RecordError> {
    stages
        .into_iter()
        .enumerate()
        .map(|(index, stage)| match (non_blank(stage.name), non_blank(stage.description)) {
            (Some(name), Some(description)) => Ok(Stage {
                name,
                description,
                completed_by: stage.completed_by,
            }),
            (name, description) => {
                let mut fields = Vec::new();
                if name.is_none() {
                    fields.push(format!("stages[{}].name", index));
                }
                if description.is_none() {
                    fields.push(format!("stages[{}].description", index));
                }
                Err(RecordError::MissingRequiredFields(fields))
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgram {
    pub name: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub stages: Vec<NewStage>,
}

impl Draft for NewProgram {
    type Entity = Program;

    fn validate(self) -> Result<Program, RecordError> {
        let name = non_blank(self.name);
        let duration = non_blank(self.duration);
        let present = [("name", name.is_some()), ("duration", duration.is_some())];
        let (Some(name), Some(duration)) = (name, duration) else {
            return Err(RecordError::missing(&present));
        };
        Ok(Program {
            name,
            duration,
            stages: validate_stages(self.stages)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPatch {
    pub name: Option<String>,
    pub duration: Option<String>,
    pub stages: Option<Vec<NewStage>>,
}

impl Patchable for Program {
    type Patch = ProgramPatch;

    fn apply(&mut self, patch: ProgramPatch) -> Result<(), RecordError> {
        if let Some(name) = patch.name {
            self.name = require_text("name", name)?;
        }
        if let Some(duration) = patch.duration {
            self.duration = require_text("duration", duration)?;
        }
        if let Some(stages) = patch.stages {
            self.stages = validate_stages(stages)?;
        }
        Ok(())
    }
}
