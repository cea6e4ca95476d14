use serde::{
    de::{MapAccess, SeqAccess, Visitor},
    Deserialize, Deserializer,
};
use std::fmt;

use crate::{
    error::{SchemaError, SchemaErrorKind},
    model::toc::KeyPath,
};

/// How many nested arrays and objects `serde_json` will descend into. Every table of contents
/// level takes two, so trees deeper than half of this cannot be read.
pub const JSON_NESTING_LIMIT: usize = 128;

/// A JSON document that keeps every object entry in source order, duplicates included.
///
/// `serde_json::Value` keeps only the last of a repeated key, which would hide duplicate
/// slugs from validation, so the loader reads into this type first.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<RawValue>),
    Object(Vec<(String, RawValue)>),
}

impl RawValue {
    /// Parse JSON text, reporting malformed input as a schema error against the root.
    pub fn parse(source: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(source).map_err(|error| {
            let message = error.to_string();
            let kind = if message.starts_with("recursion limit exceeded") {
                SchemaErrorKind::NestingTooDeep {
                    limit: JSON_NESTING_LIMIT,
                    line: error.line(),
                    column: error.column(),
                }
            } else {
                SchemaErrorKind::Syntax {
                    message,
                    line: error.line(),
                    column: error.column(),
                }
            };

            SchemaError::new(KeyPath::root(), kind)
        })
    }

    /// The JSON type name of the value, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Array(_) => "array",
            RawValue::Object(_) => "object",
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<RawValue, E> {
        Ok(RawValue::Number(value.into()))
    }

    fn visit_u64<E>(self, value: u64) -> Result<RawValue, E> {
        Ok(RawValue::Number(value.into()))
    }

    fn visit_f64<E>(self, value: f64) -> Result<RawValue, E> {
        Ok(serde_json::Number::from_f64(value).map_or(RawValue::Null, RawValue::Number))
    }

    fn visit_str<E>(self, value: &str) -> Result<RawValue, E> {
        Ok(RawValue::String(value.to_owned()))
    }

    fn visit_string<E>(self, value: String) -> Result<RawValue, E> {
        Ok(RawValue::String(value))
    }

    fn visit_unit<E>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_none<E>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<RawValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RawValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));

        while let Some(value) = seq.next_element()? {
            values.push(value);
        }

        Ok(RawValue::Array(values))
    }

    fn visit_map<A>(self, mut map: A) -> Result<RawValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));

        while let Some(entry) = map.next_entry::<String, RawValue>()? {
            entries.push(entry);
        }

        Ok(RawValue::Object(entries))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keeps_duplicate_keys_in_order() {
        let raw = RawValue::parse(r#"{ "a": 1, "b": true, "a": "again" }"#)
            .expect("raw value failed to parse");

        let RawValue::Object(entries) = raw else {
            panic!("expected an object")
        };
        let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();

        assert_eq!(vec!["a", "b", "a"], keys);
        assert_eq!(RawValue::String(String::from("again")), entries[2].1);
    }

    #[test]
    fn names_json_types() {
        let raw = RawValue::parse(r#"[null, false, 1.5, "x", [], {}]"#)
            .expect("raw value failed to parse");

        let RawValue::Array(values) = raw else {
            panic!("expected an array")
        };
        let kinds: Vec<&str> = values.iter().map(RawValue::kind).collect();

        assert_eq!(
            vec!["null", "boolean", "number", "string", "array", "object"],
            kinds
        );
    }

    #[test]
    fn reports_syntax_errors_with_their_position() {
        let error = RawValue::parse("{\n  \"a\": }").expect_err("input should not parse");

        let SchemaErrorKind::Syntax { line, .. } = error.kind else {
            panic!("expected a syntax error, got {:?}", error.kind)
        };

        assert_eq!(2, line);
        assert!(error.path.is_empty());
    }

    #[test]
    fn reports_nesting_past_the_parser_limit_separately_from_syntax() {
        let depth = JSON_NESTING_LIMIT + 1;
        let source = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        let error = RawValue::parse(&source).expect_err("input should be too deep");

        assert!(matches!(
            error.kind,
            SchemaErrorKind::NestingTooDeep {
                limit: JSON_NESTING_LIMIT,
                ..
            }
        ));
    }
}
