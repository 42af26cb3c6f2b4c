//! Built-in accessors, one per shape family.

use std::iter;

use super::{MemberAccessor, Properties};
use crate::segment::ChainSegment;
use crate::value::Value;

/// Objects and hash arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingAccessor;

impl MemberAccessor for MappingAccessor {
    fn properties<'v>(&self, value: &'v Value) -> Properties<'v> {
        match value {
            Value::Object(map) => Box::new(map.keys().map(|key| ChainSegment::verbatim(key))),
            // Snapshot: the hash may be filled while its names are being walked.
            Value::Hash(hash) => Box::new(hash.keys().into_iter()),
            _ => Box::new(iter::empty()),
        }
    }

    fn try_get_member(&self, value: &Value, segment: &ChainSegment) -> Option<Value> {
        match value {
            Value::Object(map) => map.get(segment.name()).cloned(),
            Value::Hash(hash) => hash.get(segment),
            _ => None,
        }
    }
}

/// Arrays: `length` plus one member per position
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedAccessor;

impl MemberAccessor for IndexedAccessor {
    fn properties<'v>(&self, value: &'v Value) -> Properties<'v> {
        match value {
            Value::Array(items) => {
                Box::new((0..items.len()).map(|i| ChainSegment::new(&i.to_string())))
            }
            _ => Box::new(iter::empty()),
        }
    }

    fn try_get_member(&self, value: &Value, segment: &ChainSegment) -> Option<Value> {
        let Value::Array(items) = value else {
            return None;
        };

        if segment.name() == "length" {
            return Some(Value::from(items.len()));
        }
        segment.array_index().and_then(|i| items.get(i).cloned())
    }
}

/// Host records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAccessor;

impl MemberAccessor for RecordAccessor {
    fn properties<'v>(&self, value: &'v Value) -> Properties<'v> {
        match value {
            Value::Record(record) => Box::new(
                record
                    .field_names()
                    .iter()
                    .map(|name| ChainSegment::verbatim(name)),
            ),
            _ => Box::new(iter::empty()),
        }
    }

    fn try_get_member(&self, value: &Value, segment: &ChainSegment) -> Option<Value> {
        match value {
            Value::Record(record) => record.field(segment.name()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{HashParameters, Record};
    use serde_json::json;
    use std::rc::Rc;

    struct Point {
        x: i64,
        y: i64,
    }

    impl Record for Point {
        fn type_name(&self) -> &str {
            "Point"
        }

        fn field_names(&self) -> &[&'static str] {
            &["x", "y"]
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "x" => Some(Value::Int(self.x)),
                "y" => Some(Value::Int(self.y)),
                _ => None,
            }
        }
    }

    fn names(properties: Properties<'_>) -> Vec<String> {
        let mut names: Vec<_> = properties.map(|s| s.as_str().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_mapping_object() {
        let value = Value::from(json!({"a": 1, "b": 2}));
        assert_eq!(names(MappingAccessor.properties(&value)), vec!["a", "b"]);
        assert_eq!(
            MappingAccessor.try_get_member(&value, &ChainSegment::new("b")),
            Some(Value::Int(2))
        );
        assert_eq!(
            MappingAccessor.try_get_member(&value, &ChainSegment::new("c")),
            None
        );
    }

    #[test]
    fn test_mapping_decorated_keys_round_trip() {
        let value = Value::from(json!({"@type": "Person", "[x]": 1, "this": 2}));
        for segment in MappingAccessor.properties(&value) {
            assert!(
                MappingAccessor.try_get_member(&value, &segment).is_some(),
                "{segment} should resolve"
            );
        }
        assert_eq!(
            MappingAccessor.try_get_member(&value, &ChainSegment::new("[@type]")),
            Some(Value::from("Person"))
        );
    }

    #[test]
    fn test_mapping_hash() {
        let value = Value::Hash(HashParameters::from_iter([("title", Value::from("x"))]));
        assert_eq!(names(MappingAccessor.properties(&value)), vec!["title"]);
        assert_eq!(
            MappingAccessor.try_get_member(&value, &ChainSegment::new("title")),
            Some(Value::from("x"))
        );
    }

    #[test]
    fn test_properties_restart() {
        let value = Value::from(json!({"a": 1}));
        assert_eq!(MappingAccessor.properties(&value).count(), 1);
        assert_eq!(MappingAccessor.properties(&value).count(), 1);
    }

    #[test]
    fn test_indexed() {
        let value = Value::from(json!(["x", "y", "z"]));
        assert_eq!(names(IndexedAccessor.properties(&value)), vec!["0", "1", "2"]);
        assert_eq!(
            IndexedAccessor.try_get_member(&value, &ChainSegment::new("1")),
            Some(Value::from("y"))
        );
        assert_eq!(
            IndexedAccessor.try_get_member(&value, &ChainSegment::new("length")),
            Some(Value::Int(3))
        );
        assert_eq!(
            IndexedAccessor.try_get_member(&value, &ChainSegment::new("9")),
            None
        );
    }

    #[test]
    fn test_record() {
        let value = Value::Record(Rc::new(Point { x: 3, y: 4 }));
        assert_eq!(names(RecordAccessor.properties(&value)), vec!["x", "y"]);
        assert_eq!(
            RecordAccessor.try_get_member(&value, &ChainSegment::new("y")),
            Some(Value::Int(4))
        );
        assert_eq!(value.type_name(), "Point");
    }
}
