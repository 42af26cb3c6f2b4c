//! Values a template is evaluated against.
//!
//! Containers are reference counted so that binding a value into several
//! scopes (`@root`, `@parent`, block parameters) clones a pointer, and so
//! that "the same value as the parent's" can be decided by identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use gabarit_carton::{CompactString, FxHashMap};

use crate::segment::ChainSegment;

/// String-keyed object contents
pub type ObjectMap = FxHashMap<CompactString, Value>;

/// Host value exposing named fields
pub trait Record {
    /// Name used in diagnostics
    fn type_name(&self) -> &str;

    /// Field names in declaration order
    fn field_names(&self) -> &[&'static str];

    /// Value of a field
    fn field(&self, name: &str) -> Option<Value>;
}

/// Marker for a binding that did not resolve, tagged with the missing name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedBinding {
    name: CompactString,
}

impl UndefinedBinding {
    pub fn new(name: &str) -> Self {
        Self {
            name: CompactString::new(name),
        }
    }

    /// The name that failed to resolve
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with `format`, where `{0}` stands for the name.
    /// Without a format the marker renders as empty text.
    pub fn format(&self, format: Option<&str>) -> String {
        format
            .map(|format| format.replace("{0}", &self.name))
            .unwrap_or_default()
    }
}

/// Named arguments passed to a helper or partial.
///
/// Shared and mutable: a scope created for a partial fills in keys the
/// enclosing value provides and the caller did not pass.
#[derive(Clone, Default)]
pub struct HashParameters(Rc<RefCell<FxHashMap<ChainSegment, Value>>>);

impl HashParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an argument
    pub fn insert(&self, key: ChainSegment, value: Value) {
        self.0.borrow_mut().insert(key, value);
    }

    pub fn get(&self, key: &ChainSegment) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &ChainSegment) -> bool {
        self.0.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the argument names
    pub fn keys(&self) -> Vec<ChainSegment> {
        self.0.borrow().keys().cloned().collect()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<K: Into<ChainSegment>> FromIterator<(K, Value)> for HashParameters {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        Self(Rc::new(RefCell::new(map)))
    }
}

impl fmt::Debug for HashParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.borrow().iter()).finish()
    }
}

/// A value in the evaluation model
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Undefined(UndefinedBinding),
    Bool(bool),
    Int(i64),
    Float(f64),
    String(CompactString),
    Array(Rc<[Value]>),
    Object(Rc<ObjectMap>),
    Hash(HashParameters),
    Record(Rc<dyn Record>),
}

impl Value {
    /// Build an object value from key-value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<CompactString>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(Rc::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        ))
    }

    /// Build a hash-argument value from key-value pairs
    pub fn hash<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Value)>,
    {
        Self::Hash(entries.into_iter().collect())
    }

    /// Undefined marker for `name`
    pub fn undefined(name: &str) -> Self {
        Self::Undefined(UndefinedBinding::new(name))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashParameters> {
        match self {
            Self::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    /// Short type name used in diagnostics and tree dumps
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Undefined(_) => "undefined",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Hash(_) => "hash",
            Self::Record(record) => record.type_name(),
        }
    }

    /// Whether both values share one allocation.
    ///
    /// Scalars have no identity and never compare identical.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Hash(a), Self::Hash(b)) => a.ptr_eq(b),
            (Self::Record(a), Self::Record(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Undefined(a), Self::Undefined(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a.ptr_eq(b) || *a.0.borrow() == *b.0.borrow(),
            (Self::Record(a), Self::Record(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Undefined(binding) => write!(f, "Undefined({})", binding.name()),
            Self::Bool(b) => write!(f, "{b:?}"),
            Self::Int(n) => write!(f, "{n:?}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Self::Hash(hash) => write!(f, "Hash({hash:?})"),
            Self::Record(record) => write!(f, "Record({})", record.type_name()),
        }
    }
}

/// Template text of a value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Undefined(_) => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(_) | Self::Hash(_) => f.write_str("[object Object]"),
            Self::Record(record) => write!(f, "[object {}]", record.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for Value {
    /// Counts beyond `i64::MAX` become floats instead of wrapping
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(CompactString::new(value))
    }
}

impl From<CompactString> for Value {
    fn from(value: CompactString) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value.into())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s.into()),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value))),
            ),
        }
    }
}
