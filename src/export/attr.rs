//! Attribute values rendered as OSM tag values.
//!
//! Every dataset field becomes a tag. Strings are written as-is; everything
//! else gets a compact, human-readable rendering that keeps structure
//! visible, so the list `[1, 2]` never reads like the string `"1, 2"` and
//! nested strings stay quoted. The rendering is for people, not parsers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::osm::Tag;

/// A dataset field value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<AttrValue>),
    Mapping(BTreeMap<String, AttrValue>),
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(b),
            Value::Number(n) => AttrValue::Number(n),
            Value::String(s) => AttrValue::String(s),
            Value::Array(items) => {
                AttrValue::Sequence(items.into_iter().map(AttrValue::from).collect())
            }
            Value::Object(map) => AttrValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, AttrValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl AttrValue {
    /// Renders the value for a tag's `v` attribute.
    pub fn format(&self) -> String {
        match self {
            AttrValue::String(s) => s.clone(),
            other => Nested(other).to_string(),
        }
    }
}

/// Rendering of a value that sits inside a container, or of any non-string
/// value at top level.
struct Nested<'a>(&'a AttrValue);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AttrValue::Null => f.write_str("null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::String(s) => write!(f, "{s:?}"),
            AttrValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Nested(item))?;
                }
                f.write_str("]")
            }
            AttrValue::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {}", Nested(value))?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Formats a single value.
pub fn format(value: &AttrValue) -> String {
    value.format()
}

/// Builds the generic tag block for a record: one tag per serialized field.
///
/// Absent optional fields are skipped by the record's `Serialize` impl and
/// therefore produce no tag. Keys come out in sorted order.
pub fn tag_block<T: Serialize>(record: &T) -> Result<Vec<Tag>, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| Tag::new(key, AttrValue::from(value).format()))
            .collect()),
        other => Ok(vec![Tag::new("value", AttrValue::from(other).format())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fmt(value: Value) -> String {
        AttrValue::from(value).format()
    }

    #[test]
    fn strings_pass_through_unquoted() {
        assert_eq!(fmt(json!("lane")), "lane");
        assert_eq!(fmt(json!("None")), "None");
        assert_eq!(fmt(json!("")), "");
    }

    #[test]
    fn scalars_render_readably() {
        assert_eq!(fmt(json!(3)), "3");
        assert_eq!(fmt(json!(-1.5)), "-1.5");
        assert_eq!(fmt(json!(true)), "true");
        assert_eq!(fmt(Value::Null), "null");
    }

    #[test]
    fn sequences_are_distinguishable_from_strings() {
        assert_eq!(fmt(json!([1, 2])), "[1, 2]");
        assert_ne!(fmt(json!([1, 2])), fmt(json!("1, 2")));
        assert_eq!(fmt(json!(["a", "b"])), r#"["a", "b"]"#);
        assert_eq!(fmt(json!([])), "[]");
    }

    #[test]
    fn mappings_render_sorted_with_quoted_keys() {
        assert_eq!(
            fmt(json!({"ty": 2.5, "tx": 1, "name": "x"})),
            r#"{"name": "x", "tx": 1, "ty": 2.5}"#
        );
        assert_eq!(
            fmt(json!({"items": [{"k": null}]})),
            r#"{"items": [{"k": null}]}"#
        );
    }

    #[test]
    fn tag_block_emits_one_tag_per_field() {
        #[derive(Serialize)]
        struct Record {
            token: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            missing: Option<String>,
            node_tokens: Vec<String>,
        }

        let record = Record {
            token: "t1".into(),
            missing: None,
            node_tokens: vec!["n1".into(), "n2".into()],
        };
        let tags = tag_block(&record).expect("serialize record");
        assert_eq!(
            tags,
            vec![
                Tag::new("node_tokens", r#"["n1", "n2"]"#),
                Tag::new("token", "t1"),
            ]
        );
    }
}
