use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::resource::require_pair;
use crate::collection::{RecordId, Resource, ResourceLabels};
use crate::errors::ServiceError;

/// Unknown stored fields (`updatedAt`, ...) survive rewrites of the
/// collection; an update replaces them along with everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactGoal {
    pub id: RecordId,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImpactGoalInput {
    pub number: Option<String>,
    pub label: Option<String>,
}

pub struct ImpactGoalFields {
    number: String,
    label: String,
}

pub struct ImpactGoals;

impl ImpactGoals {
    fn goal(id: i64, number: &str, label: &str) -> ImpactGoal {
        ImpactGoal { id: id.into(), number: number.into(), label: label.into(), extra: Map::new() }
    }
}

impl Resource for ImpactGoals {
    type Record = ImpactGoal;
    type Input = ImpactGoalInput;
    type Fields = ImpactGoalFields;

    const LABELS: ResourceLabels = ResourceLabels {
        name: "impact-goals",
        fields_required: "Number and label are required",
        id_required: "Goal ID is required",
        not_found: "Impact goal not found",
        collection_missing: "No impact goals found",
        deleted: "Impact goal deleted successfully",
        conflict: "Impact goals were modified concurrently; retry the request",
    };

    fn id(record: &ImpactGoal) -> &RecordId {
        &record.id
    }

    fn validate(input: ImpactGoalInput) -> Result<ImpactGoalFields, ServiceError> {
        let (number, label) = require_pair::<Self>(input.number, input.label)?;
        Ok(ImpactGoalFields { number, label })
    }

    fn create(id: i64, fields: ImpactGoalFields) -> ImpactGoal {
        ImpactGoal { id: id.into(), number: fields.number, label: fields.label, extra: Map::new() }
    }

    fn update(id: i64, _existing: &ImpactGoal, fields: ImpactGoalFields) -> ImpactGoal {
        Self::create(id, fields)
    }

    fn seed() -> Option<Vec<ImpactGoal>> {
        Some(vec![
            Self::goal(1, "500+", "Families to Receive Monthly Food Support"),
            Self::goal(2, "$10M", "Campaign Goal"),
            Self::goal(3, "200+", "Youth to Engage in STEAM Learning Annually"),
            Self::goal(4, "500+", "Adults to Gain Career-Ready Skills"),
        ])
    }
}
