use super::Value;
use crate::{Error, Result};
use std::fmt;

/// Identity of a persisted entity: an integer or a string key.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Id {
    Int(i64),
    String(String),
}

impl Id {
    /// Reads an identifier out of a database value.
    ///
    /// Strings stay strings: a TEXT key such as `"007"` must be bound back
    /// exactly as it was read. Null, empty strings and non-integral numbers
    /// are rejected.
    pub fn from_value(value: &Value) -> Result<Id> {
        match value {
            Value::I64(v) => Ok(Id::Int(*v)),
            Value::F64(v) if v.fract() == 0.0 && v.is_finite() => Ok(Id::Int(*v as i64)),
            Value::String(v) if v.is_empty() => Err(Error::mapping("id must not be empty")),
            Value::String(v) => Ok(Id::String(v.clone())),
            _ => Err(Error::mapping(format!(
                "cannot use {} as an entity id",
                value.kind_name()
            ))),
        }
    }

    /// Key used to compare identities in caches.
    ///
    /// A string in canonical integer form (`"7"`, `"-3"`) matches the
    /// integer it spells. `"007"` or `" 7"` stay distinct. Never use the
    /// result as a statement parameter.
    pub fn identity_key(&self) -> Id {
        match self {
            Id::String(v) => match v.parse::<i64>() {
                Ok(n) if n.to_string() == *v => Id::Int(n),
                _ => self.clone(),
            },
            Id::Int(_) => self.clone(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Id::Int(v) => Some(*v),
            Id::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Id::String(v) => Some(v),
            Id::Int(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        self.into()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(v) => write!(f, "{v}"),
            Id::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Id {
    fn from(src: i64) -> Self {
        Id::Int(src)
    }
}

impl From<i32> for Id {
    fn from(src: i32) -> Self {
        Id::Int(src.into())
    }
}

impl From<String> for Id {
    fn from(src: String) -> Self {
        Id::String(src)
    }
}

impl From<&str> for Id {
    fn from(src: &str) -> Self {
        Id::String(src.to_string())
    }
}

impl TryFrom<Value> for Id {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Id::from_value(&value)
    }
}
