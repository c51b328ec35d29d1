//! Record ids and the next-id policy.
//!
//! New records always get a plain integer id. Older blobs may still carry
//! string ids such as `member-7`; those are only read back for the max-id
//! computation and are never matched by a path id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
    Other(Value),
}

impl RecordId {
    /// Numeric id for lookups; string and other legacy ids never match.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn matches(&self, id: i64) -> bool {
        self.as_number() == Some(id)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Parse the longest leading integer of `s` (optional sign, then digits),
/// ignoring leading whitespace and any trailing characters.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Numeric component of a stored id used for next-id computation.
///
/// Numbers are taken as-is. For resources with a legacy `prefix`, only
/// strings carrying that prefix count, parsed after it; other resources parse
/// any string through [`parse_leading_int`]. Anything else yields `None`,
/// which callers treat as 0.
pub fn parse_record_id(id: &RecordId, prefix: Option<&str>) -> Option<i64> {
    match id {
        RecordId::Number(n) => Some(*n),
        RecordId::Text(s) => match prefix {
            Some(p) => s.strip_prefix(p).and_then(parse_leading_int),
            None => parse_leading_int(s),
        },
        RecordId::Other(_) => None,
    }
}

/// `1 + max(existing ids)`, with unparseable ids counting as 0 and an empty
/// collection yielding 1. `None` once the largest id is `i64::MAX`.
pub fn next_id<'a, I>(ids: I, prefix: Option<&str>) -> Option<i64>
where
    I: IntoIterator<Item = &'a RecordId>,
{
    ids.into_iter()
        .map(|id| parse_record_id(id, prefix).unwrap_or(0))
        .max()
        .unwrap_or(0)
        .checked_add(1)
}

/// Path ids follow the same leading-integer rule; `None` never matches.
pub fn parse_path_id(raw: &str) -> Option<i64> {
    parse_leading_int(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7abc"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn prefixed_and_plain_ids_count_toward_max() {
        let ids = vec![
            RecordId::Text("member-4".into()),
            RecordId::Number(2),
            RecordId::Text("member-x".into()),
            RecordId::Other(Value::Bool(true)),
        ];
        assert_eq!(parse_record_id(&ids[0], Some("member-")), Some(4));
        assert_eq!(parse_record_id(&ids[2], Some("member-")), None);
        assert_eq!(parse_record_id(&ids[3], Some("member-")), None);
        assert_eq!(next_id(&ids, Some("member-")), Some(5));
    }

    #[test]
    fn empty_or_unparseable_collection_starts_at_one() {
        assert_eq!(next_id(&Vec::<RecordId>::new(), None), Some(1));
        let ids = vec![RecordId::Text("opportunity-".into())];
        assert_eq!(next_id(&ids, Some("opportunity-")), Some(1));
    }

    #[test]
    fn unprefixed_strings_count_only_without_a_prefix() {
        let ids = vec![RecordId::Text("7".into())];
        assert_eq!(parse_record_id(&ids[0], Some("member-")), None);
        assert_eq!(next_id(&ids, Some("member-")), Some(1));
        assert_eq!(next_id(&ids, None), Some(8));
    }

    #[test]
    fn exhausted_id_space_has_no_next_id() {
        assert_eq!(next_id(&[RecordId::Number(i64::MAX)], None), None);
        let legacy = vec![RecordId::Text(format!("member-{}", i64::MAX))];
        assert_eq!(next_id(&legacy, Some("member-")), None);
        assert_eq!(next_id(&[RecordId::Number(i64::MAX - 1)], None), Some(i64::MAX));
    }

    #[test]
    fn record_id_serde_shapes() -> Result<(), serde_json::Error> {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[3, "member-1", 2.5]"#)?;
        assert_eq!(ids[0], RecordId::Number(3));
        assert_eq!(ids[1], RecordId::Text("member-1".into()));
        assert!(matches!(ids[2], RecordId::Other(_)));
        assert!(ids[0].matches(3));
        assert!(!ids[1].matches(1));
        assert_eq!(serde_json::to_string(&RecordId::from(9))?, "9");
        Ok(())
    }
}
