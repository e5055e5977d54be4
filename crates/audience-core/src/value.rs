//! Opaque values crossing the host boundary.
//!
//! The delivery stack passes these around without interpreting them; only
//! the host implementation knows what an object or constant stands for.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i32),
    Str(String),
    Enum(EnumConstant),
    Object(ObjectRef),
}

impl HostValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            Self::Object(obj) => Some(obj.as_ref()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

/// A declared constant of a host enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumConstant {
    pub owner: String,
    pub name: String,
    pub ordinal: usize,
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

// ─── Objects ──────────────────────────────────────────────────────

/// A host object: its runtime type, the arguments it was constructed with
/// (in constructor signature order) and any named attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostObject {
    pub id: u64,
    pub type_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<HostValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, HostValue>,
}

impl HostObject {
    pub fn new(id: u64, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            args: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<HostValue>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: HostValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&HostValue> {
        self.attributes.get(name)
    }

    pub fn into_value(self) -> HostValue {
        HostValue::Object(ObjectRef(Arc::new(self)))
    }
}

/// Shared, immutable reference to a [`HostObject`]. Equality is identity.
#[derive(Debug, Clone)]
pub struct ObjectRef(Arc<HostObject>);

impl AsRef<HostObject> for ObjectRef {
    fn as_ref(&self) -> &HostObject {
        &self.0
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
