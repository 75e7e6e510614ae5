use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Draft, Entity, Group, Patchable, Reference, User};
use crate::database::record::{dates, non_blank, require_text, RecordError};

/// A reward the child earned, named by its sticker model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub model: String,
    #[serde(with = "dates")]
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub name: String,
    #[serde(with = "dates")]
    pub date_of_birth: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_level: Option<String>,
    pub group_id: Uuid,
    pub parent_id: Uuid,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
}

impl Entity for Child {
    const COLLECTION: &'static str = "children";
    const LABEL: &'static str = "Child";

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::to::<Group>(self.group_id),
            Reference::to::<User>(self.parent_id),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSticker {
    pub model: Option<String>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub earned_at: Option<DateTime<Utc>>,
}

impl NewSticker {
    fn validate(self, index: usize) -> Result<Sticker, RecordError> {
        match (non_blank(self.model), self.earned_at) {
            (Some(model), Some(earned_at)) => Ok(Sticker { model, earned_at }),
            (model, earned_at) => {
                let mut fields = Vec::new();
                if model.is_none() {
                    fields.push(format!("stickers[{}].model", index));
                }
                if earned_at.is_none() {
                    fields.push(format!("stickers[{}].earnedAt", index));
                }
                Err(RecordError::MissingRequiredFields(fields))
            }
        }
    }
}

fn validate_stickers(stickers: Vec<NewSticker>) -> Result<Vec<Sticker>, RecordError> {
    stickers
        .into_iter()
        .enumerate()
        .map(|(index, sticker)| sticker.validate(index))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChild {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub date_of_birth: Option<DateTime<Utc>>,
    pub school_level: Option<String>,
    pub group_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub stickers: Vec<NewSticker>,
}

impl Draft for NewChild {
    type Entity = Child;

    fn validate(self) -> Result<Child, RecordError> {
        let name = non_blank(self.name);
        let present = [
            ("name", name.is_some()),
            ("dateOfBirth", self.date_of_birth.is_some()),
            ("groupId", self.group_id.is_some()),
            ("parentId", self.parent_id.is_some()),
        ];
        let (Some(name), Some(date_of_birth), Some(group_id), Some(parent_id)) =
            (name, self.date_of_birth, self.group_id, self.parent_id)
        else {
            return Err(RecordError::missing(&present));
        };

        Ok(Child {
            name,
            date_of_birth,
            school_level: non_blank(self.school_level),
            group_id,
            parent_id,
            stickers: validate_stickers(self.stickers)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub date_of_birth: Option<DateTime<Utc>>,
    pub school_level: Option<String>,
    pub group_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub stickers: Option<Vec<NewSticker>>,
}

impl Patchable for Child {
    type Patch = ChildPatch;

    fn apply(&mut self, patch: ChildPatch) -> Result<(), RecordError> {
        if let Some(name) = patch.name {
            self.name = require_text("name", name)?;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(school_level) = patch.school_level {
            self.school_level = non_blank(Some(school_level));
        }
        if let Some(group_id) = patch.group_id {
            self.group_id = group_id;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(stickers) = patch.stickers {
            self.stickers = validate_stickers(stickers)?;
        }
        Ok(())
    }
}
