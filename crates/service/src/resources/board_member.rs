use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::resource::require_pair;
use crate::collection::{RecordId, Resource, ResourceLabels};
use crate::errors::ServiceError;

/// Board member as stored. Fields the API does not know about (photos,
/// bios added by hand to the blob) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMember {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardMemberInput {
    pub name: Option<String>,
    pub title: Option<String>,
}

pub struct BoardMemberFields {
    name: String,
    title: String,
}

pub struct BoardMembers;

impl Resource for BoardMembers {
    type Record = BoardMember;
    type Input = BoardMemberInput;
    type Fields = BoardMemberFields;

    const LABELS: ResourceLabels = ResourceLabels {
        name: "board-members",
        fields_required: "Name and title are required",
        id_required: "Member ID is required",
        not_found: "Member not found",
        collection_missing: "No members found",
        deleted: "Member deleted successfully",
        conflict: "Board members were modified concurrently; retry the request",
    };

    const ID_PREFIX: Option<&'static str> = Some("member-");

    fn id(record: &BoardMember) -> &RecordId {
        &record.id
    }

    fn validate(input: BoardMemberInput) -> Result<BoardMemberFields, ServiceError> {
        let (name, title) = require_pair::<Self>(input.name, input.title)?;
        Ok(BoardMemberFields { name, title })
    }

    fn create(id: i64, fields: BoardMemberFields) -> BoardMember {
        BoardMember {
            id: id.into(),
            name: fields.name,
            title: fields.title,
            extra: Map::new(),
        }
    }

    /// Merge: keep the prior record, replace only `name` and `title`.
    fn update(_id: i64, existing: &BoardMember, fields: BoardMemberFields) -> BoardMember {
        BoardMember {
            name: fields.name,
            title: fields.title,
            ..existing.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_requires_both_fields() {
        let err = BoardMembers::validate(BoardMemberInput { name: Some("Ada".into()), title: None });
        match err {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, "Name and title are required"),
            _ => panic!("expected validation error"),
        }
        let ok = BoardMembers::validate(BoardMemberInput {
            name: Some("  Ada ".into()),
            title: Some(" Chair".into()),
        });
        assert!(ok.is_ok());
    }

    #[test]
    fn update_preserves_unknown_fields_and_id() -> Result<(), serde_json::Error> {
        let existing: BoardMember = serde_json::from_value(json!({
            "id": 3, "name": "Old", "title": "Treasurer", "photo": "old.jpg"
        }))?;
        let fields = BoardMemberFields { name: "New".into(), title: "Chair".into() };
        let updated = BoardMembers::update(3, &existing, fields);
        assert_eq!(
            serde_json::to_value(&updated)?,
            json!({"id": 3, "name": "New", "title": "Chair", "photo": "old.jpg"})
        );
        Ok(())
    }
}
