use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Child, Draft, Entity, Group, Patchable, Reference, UniqueRule};
use crate::database::record::{dates, RecordError};
use crate::filter::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One child's presence at one group session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub child_id: Uuid,
    pub group_id: Uuid,
    #[serde(with = "dates")]
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
}

impl Entity for Attendance {
    const COLLECTION: &'static str = "attendance";
    const LABEL: &'static str = "Attendance";

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::to::<Child>(self.child_id),
            Reference::to::<Group>(self.group_id),
        ]
    }

    fn unique_rule(&self) -> Option<UniqueRule> {
        Some(UniqueRule {
            filter: Filter::by("childId", self.child_id.to_string())
                .eq("groupId", self.group_id.to_string())
                .eq("date", dates::format(&self.date)),
            message: "Attendance for this session already exists.",
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub child_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub status: Option<AttendanceStatus>,
}

impl Draft for NewAttendance {
    type Entity = Attendance;

    fn validate(self) -> Result<Attendance, RecordError> {
        let present = [
            ("childId", self.child_id.is_some()),
            ("groupId", self.group_id.is_some()),
            ("date", self.date.is_some()),
            ("status", self.status.is_some()),
        ];
        let (Some(child_id), Some(group_id), Some(date), Some(status)) =
            (self.child_id, self.group_id, self.date, self.status)
        else {
            return Err(RecordError::missing(&present));
        };
        Ok(Attendance {
            child_id,
            group_id,
            date,
            status,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    pub child_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub status: Option<AttendanceStatus>,
}

impl Patchable for Attendance {
    type Patch = AttendancePatch;

    fn apply(&mut self, patch: AttendancePatch) -> Result<(), RecordError> {
        if let Some(child_id) = patch.child_id {
            self.child_id = child_id;
        }
        if let Some(group_id) = patch.group_id {
            self.group_id = group_id;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::record::to_document_data;
    use serde_json::json;

    #[test]
    fn unique_rule_matches_the_stored_document() {
        let draft: NewAttendance = serde_json::from_value(json!({
            "childId": Uuid::new_v4(),
            "groupId": Uuid::new_v4(),
            "date": "2024-09-02",
            "status": "present"
        }))
        .unwrap();
        let attendance = draft.validate().unwrap();
        let stored = to_document_data(&attendance).unwrap();

        let rule = attendance.unique_rule().unwrap();
        assert!(rule.filter.matches(&stored));

        let mut other_day = attendance.clone();
        other_day.date = dates::parse("2024-09-03").unwrap();
        assert!(!rule.filter.matches(&to_document_data(&other_day).unwrap()));
    }

    #[test]
    fn status_outside_the_set_is_rejected() {
        let parsed = serde_json::from_value::<NewAttendance>(json!({"status": "late"}));
        assert!(parsed.is_err());
    }
}
