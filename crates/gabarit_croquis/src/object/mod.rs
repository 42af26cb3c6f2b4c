//! Member access for arbitrary values.
//!
//! Scopes never inspect a value themselves. They ask for an
//! [`ObjectDescriptor`] once per scope and go through its accessor for every
//! property enumeration and member read. Descriptors come from configured
//! [`ObjectDescriptorProvider`]s first, then from the built-in shape
//! classification:
//!
//! - mapping-like: objects and hash arguments
//! - indexed: arrays (`length` and numeric members)
//! - structured record: [`Record`](crate::Record) implementations

mod accessors;

use std::fmt;
use std::sync::Arc;

use gabarit_carton::Lazy;

use crate::config::ScopeConfig;
use crate::segment::ChainSegment;
use crate::value::Value;

pub use accessors::{IndexedAccessor, MappingAccessor, RecordAccessor};

/// Lazy, restartable sequence of property names
pub type Properties<'v> = Box<dyn Iterator<Item = ChainSegment> + 'v>;

/// Enumerates and reads members of values of one shape family
pub trait MemberAccessor: Send + Sync {
    /// Names of the members of `value`
    fn properties<'v>(&self, value: &'v Value) -> Properties<'v>;

    /// Member of `value` named by `segment`
    fn try_get_member(&self, value: &Value, segment: &ChainSegment) -> Option<Value>;
}

/// Supplies descriptors for value shapes the built-in classifier does not know
pub trait ObjectDescriptorProvider: Send + Sync {
    fn describe(&self, value: &Value) -> Option<ObjectDescriptor>;
}

/// Shape family a descriptor was selected for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Mapping,
    Indexed,
    Record,
    /// Supplied by an [`ObjectDescriptorProvider`]
    Custom,
}

/// Member-access capability for one value
#[derive(Clone)]
pub struct ObjectDescriptor {
    shape: Shape,
    accessor: Arc<dyn MemberAccessor>,
}

static MAPPING: Lazy<ObjectDescriptor> =
    Lazy::new(|| ObjectDescriptor::new(Shape::Mapping, Arc::new(MappingAccessor)));
static INDEXED: Lazy<ObjectDescriptor> =
    Lazy::new(|| ObjectDescriptor::new(Shape::Indexed, Arc::new(IndexedAccessor)));
static RECORD: Lazy<ObjectDescriptor> =
    Lazy::new(|| ObjectDescriptor::new(Shape::Record, Arc::new(RecordAccessor)));

impl ObjectDescriptor {
    pub fn new(shape: Shape, accessor: Arc<dyn MemberAccessor>) -> Self {
        Self { shape, accessor }
    }

    /// Descriptor for `value`, or `None` when it has no members
    pub fn create(value: &Value, config: &ScopeConfig) -> Option<Self> {
        config
            .descriptor_providers()
            .iter()
            .find_map(|provider| provider.describe(value))
            .or_else(|| Self::classify(value))
    }

    /// Built-in shape classification
    pub fn classify(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) | Value::Hash(_) => Some(MAPPING.clone()),
            Value::Array(_) => Some(INDEXED.clone()),
            Value::Record(_) => Some(RECORD.clone()),
            _ => None,
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn accessor(&self) -> &dyn MemberAccessor {
        &*self.accessor
    }

    #[inline]
    pub fn properties<'v>(&self, value: &'v Value) -> Properties<'v> {
        self.accessor.properties(value)
    }

    #[inline]
    pub fn try_get_member(&self, value: &Value, segment: &ChainSegment) -> Option<Value> {
        self.accessor.try_get_member(value, segment)
    }
}

impl fmt::Debug for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDescriptor")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    impl MemberAccessor for Upper {
        fn properties<'v>(&self, _value: &'v Value) -> Properties<'v> {
            Box::new(std::iter::once(ChainSegment::new("upper")))
        }

        fn try_get_member(&self, value: &Value, segment: &ChainSegment) -> Option<Value> {
            match (value, segment.name()) {
                (Value::String(s), "upper") => Some(Value::from(s.to_uppercase().as_str())),
                _ => None,
            }
        }
    }

    struct StringProvider;

    impl ObjectDescriptorProvider for StringProvider {
        fn describe(&self, value: &Value) -> Option<ObjectDescriptor> {
            matches!(value, Value::String(_))
                .then(|| ObjectDescriptor::new(Shape::Custom, Arc::new(Upper)))
        }
    }

    #[test]
    fn test_classify_shapes() {
        let object = Value::from(json!({"a": 1}));
        let array = Value::from(json!([1, 2]));

        assert_eq!(ObjectDescriptor::classify(&object).map(|d| d.shape()), Some(Shape::Mapping));
        assert_eq!(ObjectDescriptor::classify(&array).map(|d| d.shape()), Some(Shape::Indexed));
        assert!(ObjectDescriptor::classify(&Value::Int(3)).is_none());
        assert!(ObjectDescriptor::classify(&Value::Null).is_none());
    }

    #[test]
    fn test_provider_takes_precedence() {
        let config = ScopeConfig::default().with_descriptor_provider(Arc::new(StringProvider));
        let value = Value::from("abc");

        let descriptor = ObjectDescriptor::create(&value, &config).unwrap();
        assert_eq!(descriptor.shape(), Shape::Custom);
        assert_eq!(
            descriptor.try_get_member(&value, &ChainSegment::new("upper")),
            Some(Value::from("ABC"))
        );
        assert!(ObjectDescriptor::create(&value, &ScopeConfig::default()).is_none());
    }
}
