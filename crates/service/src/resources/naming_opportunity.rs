use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::resource::require_pair;
use crate::collection::{RecordId, Resource, ResourceLabels};
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingOpportunity {
    pub id: RecordId,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamingOpportunityInput {
    pub amount: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

pub struct NamingOpportunityFields {
    amount: String,
    label: String,
    description: String,
    available: bool,
}

pub struct NamingOpportunities;

impl Resource for NamingOpportunities {
    type Record = NamingOpportunity;
    type Input = NamingOpportunityInput;
    type Fields = NamingOpportunityFields;

    const LABELS: ResourceLabels = ResourceLabels {
        name: "naming-opportunities",
        fields_required: "Amount and label are required",
        id_required: "Opportunity ID is required",
        not_found: "Naming opportunity not found",
        collection_missing: "No naming opportunities found",
        deleted: "Naming opportunity deleted successfully",
        conflict: "Naming opportunities were modified concurrently; retry the request",
    };

    const ID_PREFIX: Option<&'static str> = Some("opportunity-");

    fn id(record: &NamingOpportunity) -> &RecordId {
        &record.id
    }

    fn validate(input: NamingOpportunityInput) -> Result<NamingOpportunityFields, ServiceError> {
        let (amount, label) = require_pair::<Self>(input.amount, input.label)?;
        Ok(NamingOpportunityFields {
            amount,
            label,
            description: input.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            available: input.available.unwrap_or(true),
        })
    }

    fn create(id: i64, fields: NamingOpportunityFields) -> NamingOpportunity {
        NamingOpportunity {
            id: id.into(),
            amount: fields.amount,
            label: fields.label,
            description: fields.description,
            available: fields.available,
            extra: Map::new(),
        }
    }

    fn update(id: i64, _existing: &NamingOpportunity, fields: NamingOpportunityFields) -> NamingOpportunity {
        Self::create(id, fields)
    }

    /// Highest amount first; equal amounts keep their stored order.
    fn order_for_listing(records: &mut [NamingOpportunity]) {
        records.sort_by(|a, b| compare_amounts(amount_value(&b.amount), amount_value(&a.amount)));
    }
}

/// Unparseable amounts (NaN) sort below every real amount.
fn compare_amounts(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Numeric value of an amount label such as `$1.5M` or `$250,000`.
///
/// `$` and `,` are dropped; an `M` anywhere multiplies by 1,000,000, else a
/// `K` multiplies by 1,000. The remainder, with `M`/`K` removed, is read as a
/// leading decimal literal. Returns NaN when no number can be read.
pub fn amount_value(amount: &str) -> f64 {
    let cleaned: String = amount.chars().filter(|c| *c != '$' && *c != ',').collect();
    let multiplier = if cleaned.contains('M') {
        1_000_000.0
    } else if cleaned.contains('K') {
        1_000.0
    } else {
        1.0
    };
    let digits: String = cleaned.chars().filter(|c| *c != 'M' && *c != 'K').collect();
    parse_leading_float(&digits).map_or(f64::NAN, |n| n * multiplier)
}

/// Longest leading prefix of `s` (after whitespace) that is a decimal number.
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let candidate: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        .collect();
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}
